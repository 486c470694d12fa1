//! Blocking SPI master
//!
//! Wraps `embassy_rp::spi::Spi` in blocking mode. The display channel's
//! pixel data does not go through here: it is fed to the TX FIFO by
//! [`crate::dma::SpiTxDma`], and [`SpiBus::flush`] waits for it to drain.

use embassy_rp::spi::{self, Blocking, Instance, Spi};
use pendant_hal::spi::{Phase, Polarity};
use pendant_hal::{Mode, SpiBus, SpiConfig};

/// SPI errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    /// Peripheral reported an error
    Bus,
    /// Requested mode differs from the one the bus was built with
    ModeMismatch,
}

impl From<spi::Error> for SpiError {
    fn from(_: spi::Error) -> Self {
        SpiError::Bus
    }
}

/// Map a HAL mode onto the embassy polarity/phase pair
pub fn embassy_config(config: &SpiConfig) -> spi::Config {
    let (polarity, phase): (Polarity, Phase) = config.mode.into();
    let mut cfg = spi::Config::default();
    cfg.frequency = config.frequency;
    cfg.polarity = match polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    cfg.phase = match phase {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    cfg
}

/// RP2040 SPI master
pub struct Rp2040Spi<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
    mode: Mode,
}

impl<'d, T: Instance> Rp2040Spi<'d, T> {
    /// Wrap a bus built with [`embassy_config`] of `config`
    pub fn new(spi: Spi<'d, T, Blocking>, config: &SpiConfig) -> Self {
        Self {
            spi,
            mode: config.mode,
        }
    }
}

impl<T: Instance> SpiBus for Rp2040Spi<'_, T> {
    type Error = SpiError;

    fn configure(&mut self, config: &SpiConfig) -> Result<(), SpiError> {
        if config.mode != self.mode {
            return Err(SpiError::ModeMismatch);
        }
        self.spi.set_frequency(config.frequency);
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SpiError> {
        self.spi.blocking_transfer(read, write)?;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SpiError> {
        self.spi.blocking_write(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SpiError> {
        embedded_hal::spi::SpiBus::<u8>::flush(&mut self.spi)?;
        Ok(())
    }
}
