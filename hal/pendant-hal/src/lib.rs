//! Pendant Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the display and touch
//! drivers are written against. Chip-specific crates implement them, and the
//! driver tests implement them with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pendant-drivers (ST7789, XPT2046, DMA) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pendant-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌───────────────────┐
//!           │ pendant-hal-rp2040│
//!           └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`dma::DmaChannel`] - Memory-to-peripheral transfer engine
//! - [`delay::DelayMs`] - Blocking millisecond delays

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod dma;
pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::DelayMs;
pub use dma::{DmaChannel, DmaStatus};
pub use gpio::{InputPin, OutputPin};
pub use spi::{Mode, SpiBus, SpiConfig};
