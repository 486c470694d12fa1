//! Touch sampling
//!
//! [`TouchInput`] is polled once per UI tick. It reads the controller only
//! while the pen-down line is asserted and never surfaces a bus error: a
//! failed or rejected read reports "released" at the last good position.

use pendant_core::touch::{PointerTracker, TouchMapper, TouchSample};
use pendant_hal::{InputPin, OutputPin, SpiBus};

use crate::xpt2046::Xpt2046;

/// XPT2046 plus calibration and last-known-good tracking
pub struct TouchInput<SPI, CS, IRQ> {
    controller: Xpt2046<SPI, CS, IRQ>,
    mapper: TouchMapper,
    tracker: PointerTracker,
}

impl<SPI, CS, IRQ> TouchInput<SPI, CS, IRQ>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQ: InputPin,
{
    pub fn new(controller: Xpt2046<SPI, CS, IRQ>, mapper: TouchMapper) -> Self {
        Self {
            controller,
            mapper,
            tracker: PointerTracker::new(),
        }
    }

    /// Current pointer state
    ///
    /// Not touched: last coordinates with `pressed = false`. Touched: reads
    /// X, Y and (with a pressure threshold configured) Z1, then maps them.
    pub fn get_touch_point(&mut self) -> TouchSample {
        if !self.controller.is_touched() {
            return self.tracker.update(None);
        }

        let with_pressure = self.mapper.calibration().pressure_threshold > 0;
        let point = match self.controller.read_point(with_pressure) {
            Ok(raw) => self.mapper.map(raw),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("touch read failed, replaying last point");
                None
            }
        };
        self.tracker.update(point)
    }

    /// Last reported state, without touching the bus
    pub fn last_sample(&self) -> TouchSample {
        self.tracker.sample()
    }
}
