//! Minimal renderer for bring-up
//!
//! Paints a vertical gradient and a square cursor under the pen. Enough to
//! exercise the touch path, partial redraws and band splitting on real
//! hardware without pulling in a GUI toolkit.

use pendant_core::flush::{rgb565, FrameBuffer};
use pendant_core::render::{InvalidationQueue, Renderer};
use pendant_core::touch::TouchSample;
use pendant_core::{DirtyRect, PanelGeometry};

/// Cursor edge length in pixels
const CURSOR_SIZE: u16 = 16;

const CURSOR_PRESSED: u16 = rgb565(0xFF, 0xC0, 0x00);
const CURSOR_RELEASED: u16 = rgb565(0x60, 0x60, 0x60);

/// Gradient background with a pointer cursor
pub struct DemoRenderer {
    width: u16,
    height: u16,
    cursor: Option<DirtyRect>,
    pressed: bool,
    dirty: InvalidationQueue<4>,
}

impl DemoRenderer {
    /// Starts with the whole screen dirty
    pub fn new(panel: &PanelGeometry) -> Self {
        let mut dirty = InvalidationQueue::new();
        if let Some(bounds) = panel.bounds() {
            dirty.push(bounds);
        }
        Self {
            width: panel.width(),
            height: panel.height(),
            cursor: None,
            pressed: false,
            dirty,
        }
    }

    fn cursor_at(&self, x: u16, y: u16) -> Option<DirtyRect> {
        let half = CURSOR_SIZE / 2;
        let x1 = x.saturating_sub(half).min(self.width.saturating_sub(CURSOR_SIZE));
        let y1 = y.saturating_sub(half).min(self.height.saturating_sub(CURSOR_SIZE));
        let x2 = (x1 + CURSOR_SIZE - 1).min(self.width - 1);
        let y2 = (y1 + CURSOR_SIZE - 1).min(self.height - 1);
        DirtyRect::new(x1, y1, x2, y2)
    }

    fn background(&self, y: u16) -> u16 {
        let level = (y as u32 * 0xFF / self.height.max(1) as u32) as u8;
        rgb565(0, level / 4, level / 2)
    }
}

impl Renderer for DemoRenderer {
    fn pointer(&mut self, sample: TouchSample) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        // Nothing to show until the first contact
        if !sample.pressed && self.cursor.is_none() {
            return;
        }
        let cursor = self.cursor_at(sample.x, sample.y);
        if cursor == self.cursor && sample.pressed == self.pressed {
            return;
        }
        if let Some(old) = self.cursor {
            self.dirty.push(old);
        }
        if let Some(new) = cursor {
            self.dirty.push(new);
        }
        self.cursor = cursor;
        self.pressed = sample.pressed;
    }

    fn next_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.pop()
    }

    fn draw(&mut self, area: &DirtyRect, buffer: &mut FrameBuffer<'_>) {
        let cursor_color = if self.pressed {
            CURSOR_PRESSED
        } else {
            CURSOR_RELEASED
        };
        let mut index = 0;
        for y in area.y1..=area.y2 {
            let background = self.background(y);
            for x in area.x1..=area.x2 {
                let on_cursor = self.cursor.is_some_and(|c| {
                    x >= c.x1 && x <= c.x2 && y >= c.y1 && y <= c.y2
                });
                let color = if on_cursor { cursor_color } else { background };
                buffer.set_pixel(index, color);
                index += 1;
            }
        }
    }
}
