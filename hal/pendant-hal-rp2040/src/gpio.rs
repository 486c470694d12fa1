//! GPIO wrappers
//!
//! Pins are claimed as typed embassy peripherals in firmware, so a wiring
//! conflict is a compile error there; these only adapt the driver traits.

use embassy_rp::gpio::{Input, Output};
use pendant_hal::{InputPin, OutputPin};

/// Push-pull output
pub struct Rp2040Output<'d>(Output<'d>);

impl<'d> Rp2040Output<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl OutputPin for Rp2040Output<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Digital input
pub struct Rp2040Input<'d>(Input<'d>);

impl<'d> Rp2040Input<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self(pin)
    }
}

impl InputPin for Rp2040Input<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
