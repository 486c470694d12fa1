//! XPT2046 resistive touch controller
//!
//! Each conversion is a 3-byte exchange: the control byte selects the
//! channel, and the 12-bit result comes back MSB-aligned in the following
//! two bytes. PENIRQ is active low while the panel is pressed.

use pendant_core::touch::RawPoint;
use pendant_hal::{InputPin, OutputPin, SpiBus, SpiConfig};

/// Control bytes (start bit, channel, 12-bit, differential, PENIRQ enabled)
pub mod cmd {
    /// X position
    pub const READ_X: u8 = 0xD0;
    /// Y position
    pub const READ_Y: u8 = 0x90;
    /// Pressure Z1
    pub const READ_Z1: u8 = 0xB0;
    /// Pressure Z2
    pub const READ_Z2: u8 = 0xC0;
}

/// Errors from the touch driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Xpt2046Error<E> {
    /// SPI bus error
    Spi(E),
}

/// XPT2046 driver
pub struct Xpt2046<SPI, CS, IRQ> {
    spi: SPI,
    cs: CS,
    irq: IRQ,
}

impl<SPI, CS, IRQ> Xpt2046<SPI, CS, IRQ>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQ: InputPin,
{
    pub fn new(spi: SPI, mut cs: CS, irq: IRQ) -> Self {
        cs.set_high();
        Self { spi, cs, irq }
    }

    /// Configure the bus (SPI mode 0)
    pub fn init(&mut self, spi_frequency_hz: u32) -> Result<(), Xpt2046Error<SPI::Error>> {
        self.cs.set_high();
        self.spi
            .configure(&SpiConfig::mode0(spi_frequency_hz))
            .map_err(Xpt2046Error::Spi)?;

        #[cfg(feature = "defmt")]
        defmt::info!("XPT2046 initialised at {} Hz", spi_frequency_hz);

        Ok(())
    }

    /// Pen-down line asserted (low)
    pub fn is_touched(&self) -> bool {
        self.irq.is_low()
    }

    /// One 12-bit conversion on the channel selected by `command`
    pub fn read_raw(&mut self, command: u8) -> Result<u16, Xpt2046Error<SPI::Error>> {
        let tx = [command, 0x00, 0x00];
        let mut rx = [0u8; 3];

        self.cs.set_low();
        let result = self.spi.transfer(&mut rx, &tx);
        self.cs.set_high();
        result.map_err(Xpt2046Error::Spi)?;

        Ok(u16::from_be_bytes([rx[1], rx[2]]) >> 3)
    }

    /// X then Y, plus Z1 when `with_pressure` is set
    pub fn read_point(
        &mut self,
        with_pressure: bool,
    ) -> Result<RawPoint, Xpt2046Error<SPI::Error>> {
        let x = self.read_raw(cmd::READ_X)?;
        let y = self.read_raw(cmd::READ_Y)?;
        let z = if with_pressure {
            Some(self.read_raw(cmd::READ_Z1)?)
        } else {
            None
        };
        Ok(RawPoint { x, y, z })
    }
}
