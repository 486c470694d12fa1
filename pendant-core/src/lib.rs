//! Board-agnostic core logic for the pendant front-end
//!
//! This crate contains everything in the display and touch paths that does
//! not touch hardware:
//!
//! - Panel geometry (dirty rectangles, orientation, color order)
//! - Frame buffers and the two-slot buffer pool
//! - Flush state machine (Idle/InFlight) and band splitting
//! - Touch calibration, orientation mapping and pointer tracking
//! - Configuration types and the `panel.toml` parser
//! - The renderer boundary trait

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod flush;
pub mod geometry;
pub mod render;
pub mod touch;

pub use geometry::{ColorOrder, DirtyRect, Orientation, PanelGeometry};
