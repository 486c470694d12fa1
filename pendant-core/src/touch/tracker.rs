//! Last-known-good pointer state

/// Pointer state handed to the renderer once per input tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
}

/// Replays the last good coordinates whenever a read yields no press
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    last: (u16, u16),
    pressed: bool,
}

impl PointerTracker {
    pub const fn new() -> Self {
        Self {
            last: (0, 0),
            pressed: false,
        }
    }

    /// Feed the result of one poll
    ///
    /// `Some(point)` is a valid press; `None` is released, noisy or failed.
    pub fn update(&mut self, point: Option<(u16, u16)>) -> TouchSample {
        match point {
            Some(p) => {
                self.last = p;
                self.pressed = true;
            }
            None => self.pressed = false,
        }
        self.sample()
    }

    /// Current state without a new reading
    pub fn sample(&self) -> TouchSample {
        TouchSample {
            x: self.last.0,
            y: self.last.1,
            pressed: self.pressed,
        }
    }

    /// Release transition since the previous update
    pub fn released(&self, previous: TouchSample) -> bool {
        previous.pressed && !self.pressed
    }
}
