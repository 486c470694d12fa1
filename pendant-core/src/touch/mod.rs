//! Touch coordinate mapping
//!
//! Raw 12-bit ADC readings from the resistive controller go through three
//! steps before the renderer sees them:
//!
//! 1. Per-axis calibration clamps to the measured edge range and scales to
//!    native (portrait) panel pixels, honoring each axis' direction.
//! 2. An axis permutation keyed by [`Orientation`](crate::Orientation)
//!    rotates the native point into logical screen coordinates.
//! 3. [`PointerTracker`] keeps the last good point so a dropout never snaps
//!    the pointer to (0, 0).

pub mod calibration;
pub mod mapper;
pub mod tracker;

pub use calibration::{AxisCalibration, EdgePolicy, TouchCalibration, ADC_MAX};
pub use mapper::{AxisPermutation, RawPoint, TouchMapper};
pub use tracker::{PointerTracker, TouchSample};
