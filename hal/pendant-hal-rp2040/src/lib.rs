//! RP2040-specific HAL for the pendant firmware
//!
//! This crate provides RP2040 implementations of the shared `pendant-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - GPIO wrappers
//! - Blocking SPI master wrapper
//! - Raw DMA channel paced by the SPI TX request line, completing on
//!   `DMA_IRQ_1`
//! - Busy-wait millisecond delay

#![no_std]

pub mod delay;
pub mod dma;
pub mod gpio;
pub mod spi;

pub use delay::BlockingDelay;
pub use dma::{DmaError, SpiPort, SpiTxDma};
pub use gpio::{Rp2040Input, Rp2040Output};
pub use spi::{Rp2040Spi, SpiError};

// Re-export shared traits from pendant-hal for convenience
pub use pendant_hal::{DelayMs, DmaChannel, DmaStatus, InputPin, OutputPin, SpiBus, SpiConfig};
