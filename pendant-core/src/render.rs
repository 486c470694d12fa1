//! Renderer boundary
//!
//! The GUI side of the pipeline is a [`Renderer`]: it consumes one pointer
//! sample per input tick, reports the areas it wants redrawn, and paints
//! requested bands into whichever frame buffer the pipeline hands it.
//! [`FrameScheduler`] turns the reported damage into buffer-sized bands.

use heapless::Vec;

use crate::flush::{BandIter, FrameBuffer};
use crate::geometry::{DirtyRect, PanelGeometry};
use crate::touch::TouchSample;

/// Trait for the GUI layer driving the display
pub trait Renderer {
    /// Pointer state for this input tick
    fn pointer(&mut self, sample: TouchSample);

    /// Take the next area that needs redrawing
    ///
    /// Called repeatedly until it returns `None`.
    fn next_dirty(&mut self) -> Option<DirtyRect>;

    /// Paint `area` into `buffer`
    ///
    /// Pixels are written row-major with a stride of `area.width()`. The
    /// buffer is guaranteed to hold at least `area.pixel_count()` pixels.
    fn draw(&mut self, area: &DirtyRect, buffer: &mut FrameBuffer<'_>);
}

/// Pending redraw areas
///
/// Overlapping areas are merged on insert. When the queue is full the new
/// area is folded into the last entry, so damage is never lost, only
/// over-approximated.
#[derive(Debug, Clone, Default)]
pub struct InvalidationQueue<const N: usize> {
    areas: Vec<DirtyRect, N>,
}

impl<const N: usize> InvalidationQueue<N> {
    pub const fn new() -> Self {
        Self { areas: Vec::new() }
    }

    /// Add an area
    pub fn push(&mut self, rect: DirtyRect) {
        let rect = self.absorb(rect);
        if let Err(rect) = self.areas.push(rect) {
            // Full: widen the newest entry, which may now touch others
            if let Some(last) = self.areas.pop() {
                let merged = self.absorb(last.union(&rect));
                // The pop freed a slot
                let _ = self.areas.push(merged);
            }
        }
    }

    /// Remove every queued area `rect` touches and return the union
    fn absorb(&mut self, mut rect: DirtyRect) -> DirtyRect {
        let mut i = 0;
        while i < self.areas.len() {
            if self.areas[i].overlaps(&rect) {
                rect = rect.union(&self.areas.swap_remove(i));
                i = 0;
            } else {
                i += 1;
            }
        }
        rect
    }

    /// Oldest pending area
    pub fn pop(&mut self) -> Option<DirtyRect> {
        if self.areas.is_empty() {
            None
        } else {
            Some(self.areas.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }
}

/// Splits pending damage into bands that fit one frame buffer
#[derive(Debug, Clone)]
pub struct FrameScheduler<const N: usize> {
    bounds: DirtyRect,
    capacity_pixels: usize,
    queue: InvalidationQueue<N>,
    bands: Option<BandIter>,
}

impl<const N: usize> FrameScheduler<N> {
    /// `capacity_pixels` is the size of one frame buffer
    ///
    /// Returns `None` for an empty panel or a buffer narrower than one
    /// logical row.
    pub fn new(panel: &PanelGeometry, capacity_pixels: usize) -> Option<Self> {
        let bounds = panel.bounds()?;
        if capacity_pixels < bounds.width() as usize {
            return None;
        }
        Some(Self {
            bounds,
            capacity_pixels,
            queue: InvalidationQueue::new(),
            bands: None,
        })
    }

    /// Queue an area, clipped to the screen
    pub fn invalidate(&mut self, rect: DirtyRect) {
        if let Some(clipped) = rect.intersection(&self.bounds) {
            self.queue.push(clipped);
        }
    }

    /// Queue the whole screen
    pub fn invalidate_all(&mut self) {
        self.bands = None;
        self.queue.clear();
        self.queue.push(self.bounds);
    }

    /// Pull all pending damage out of the renderer
    pub fn collect<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        while let Some(rect) = renderer.next_dirty() {
            self.invalidate(rect);
        }
    }

    /// Next band to draw and flush
    pub fn next_band(&mut self) -> Option<DirtyRect> {
        loop {
            if let Some(band) = self.bands.as_mut().and_then(Iterator::next) {
                return Some(band);
            }
            let rect = self.queue.pop()?;
            // Clipped rects are never wider than the screen, which fits
            self.bands = BandIter::new(rect, self.capacity_pixels).ok();
        }
    }

    /// Nothing left to draw
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.bands.as_ref().map_or(true, |b| b.len() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;

    fn rect(x1: u16, y1: u16, x2: u16, y2: u16) -> DirtyRect {
        DirtyRect::new(x1, y1, x2, y2).unwrap()
    }

    #[test]
    fn test_queue_merges_overlaps() {
        let mut q: InvalidationQueue<4> = InvalidationQueue::new();
        q.push(rect(0, 0, 10, 10));
        q.push(rect(50, 50, 60, 60));
        q.push(rect(5, 5, 55, 55));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(rect(0, 0, 60, 60)));
        assert!(q.is_empty());
    }

    #[test]
    fn test_queue_overflow_folds_into_last() {
        let mut q: InvalidationQueue<2> = InvalidationQueue::new();
        q.push(rect(0, 0, 1, 1));
        q.push(rect(10, 10, 11, 11));
        q.push(rect(20, 20, 21, 21));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(rect(0, 0, 1, 1)));
        assert_eq!(q.pop(), Some(rect(10, 10, 21, 21)));
    }

    #[test]
    fn test_queue_overflow_fold_absorbs_covered_areas() {
        let mut q: InvalidationQueue<2> = InvalidationQueue::new();
        q.push(rect(10, 10, 12, 12));
        q.push(rect(20, 20, 29, 29));
        // Touches neither entry, but its fold with the last one covers both
        q.push(rect(0, 0, 5, 5));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(rect(0, 0, 29, 29)));
    }

    #[test]
    fn test_scheduler_bands_full_screen() {
        let panel = PanelGeometry::new(240, 320, Orientation::Deg0);
        let mut s: FrameScheduler<4> = FrameScheduler::new(&panel, 240 * 32).unwrap();
        s.invalidate_all();

        let mut count = 0;
        while let Some(band) = s.next_band() {
            assert_eq!(band.pixel_count(), 240 * 32);
            count += 1;
        }
        assert_eq!(count, 10);
        assert!(s.is_idle());
    }

    #[test]
    fn test_scheduler_clips_to_screen() {
        let panel = PanelGeometry::new(240, 320, Orientation::Deg90);
        let mut s: FrameScheduler<4> = FrameScheduler::new(&panel, 320 * 8).unwrap();
        s.invalidate(rect(300, 230, 400, 400));
        assert_eq!(s.next_band(), Some(rect(300, 230, 319, 239)));
        assert_eq!(s.next_band(), None);
    }

    #[test]
    fn test_scheduler_rejects_narrow_buffer() {
        let panel = PanelGeometry::new(240, 320, Orientation::Deg0);
        assert!(FrameScheduler::<4>::new(&panel, 239).is_none());
    }

    struct Recorder {
        pending: Vec<DirtyRect, 4>,
        last: Option<TouchSample>,
    }

    impl Renderer for Recorder {
        fn pointer(&mut self, sample: TouchSample) {
            self.last = Some(sample);
            if sample.pressed {
                let _ = self.pending.push(rect(sample.x, sample.y, sample.x, sample.y));
            }
        }

        fn next_dirty(&mut self) -> Option<DirtyRect> {
            self.pending.pop()
        }

        fn draw(&mut self, area: &DirtyRect, buffer: &mut FrameBuffer<'_>) {
            buffer.fill(0xFFFF, area.pixel_count());
        }
    }

    #[test]
    fn test_collect_from_renderer() {
        let panel = PanelGeometry::new(240, 320, Orientation::Deg0);
        let mut s: FrameScheduler<4> = FrameScheduler::new(&panel, 240).unwrap();
        let mut r = Recorder {
            pending: Vec::new(),
            last: None,
        };
        r.pointer(TouchSample {
            x: 7,
            y: 9,
            pressed: true,
        });
        s.collect(&mut r);
        assert_eq!(r.last.map(|t| t.pressed), Some(true));
        assert_eq!(s.next_band(), Some(rect(7, 9, 7, 9)));
        assert!(s.is_idle());
    }
}
