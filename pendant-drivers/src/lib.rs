//! Display and touch drivers
//!
//! This crate implements the bus protocols for the pendant's front panel on
//! top of the `pendant-hal` traits:
//!
//! - ST7789 command/window protocol and bring-up sequence
//! - XPT2046 resistive touch register reads
//! - DMA flush orchestration with interrupt completion
//! - Touch sampling with calibration and last-known-good replay

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod flush;
pub mod st7789;
pub mod touch;
pub mod xpt2046;

#[cfg(test)]
mod mock;

pub use flush::{DmaFlusher, WindowTarget};
pub use st7789::{St7789, St7789Config, St7789Error};
pub use touch::TouchInput;
pub use xpt2046::{Xpt2046, Xpt2046Error};
