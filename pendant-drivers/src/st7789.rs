//! ST7789 TFT controller (4-wire SPI)
//!
//! # Bus Protocol
//!
//! Every transaction is framed by chip-select:
//! - CS low
//! - DC low, one command byte
//! - DC high, zero or more parameter bytes
//! - CS high
//!
//! Pixel data is the exception: after RAMWR the driver leaves CS asserted
//! with DC high so a DMA transfer can stream the frame buffer straight into
//! the SPI FIFO. [`St7789::end_pixels`] drains the FIFO and releases CS.

use pendant_core::config::DisplayConfig;
use pendant_core::{ColorOrder, DirtyRect, Orientation, PanelGeometry};
use pendant_hal::{DelayMs, OutputPin, SpiBus, SpiConfig};

/// ST7789 command bytes
pub mod cmd {
    /// Software reset
    pub const SWRESET: u8 = 0x01;
    /// Sleep out
    pub const SLPOUT: u8 = 0x11;
    /// Display on
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Row address set
    pub const RASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory data access control
    pub const MADCTL: u8 = 0x36;
    /// Interface pixel format
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD parameter for 16 bits per pixel
pub const COLMOD_RGB565: u8 = 0x55;

/// Settle times in milliseconds
mod timing {
    pub const RESET_PULSE: u32 = 100;
    pub const RESET_RECOVERY: u32 = 100;
    pub const SWRESET: u32 = 150;
    pub const SLPOUT: u32 = 120;
    pub const REGISTER: u32 = 10;
    pub const DISPON: u32 = 100;
}

/// Errors from the display driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum St7789Error<E> {
    /// SPI bus error
    Spi(E),
    /// Window outside the panel
    OutOfBounds,
}

/// Bring-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct St7789Config {
    pub orientation: Orientation,
    pub color_order: ColorOrder,
    pub spi_frequency_hz: u32,
    pub backlight: bool,
}

impl Default for St7789Config {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for St7789Config {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            orientation: config.orientation,
            color_order: config.color_order,
            spi_frequency_hz: config.spi_frequency_hz,
            backlight: config.backlight,
        }
    }
}

impl St7789Config {
    /// MADCTL parameter: rotation bits OR-ed with the color order bit
    pub const fn madctl(&self) -> u8 {
        self.orientation.madctl() | self.color_order.madctl()
    }
}

/// ST7789 driver
///
/// Owns the SPI master and the four control lines. The panel's logical
/// size follows the orientation given at init.
pub struct St7789<SPI, DC, CS, RST, BL> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
    bl: BL,
    panel: PanelGeometry,
    streaming: bool,
}

impl<SPI, DC, CS, RST, BL> St7789<SPI, DC, CS, RST, BL>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Create a driver for a panel of the given native size
    pub fn new(
        spi: SPI,
        dc: DC,
        mut cs: CS,
        rst: RST,
        mut bl: BL,
        width: u16,
        height: u16,
    ) -> Self {
        cs.set_high();
        bl.set_low();
        Self {
            spi,
            dc,
            cs,
            rst,
            bl,
            panel: PanelGeometry::new(width, height, Orientation::Deg0),
            streaming: false,
        }
    }

    /// Geometry as configured by the last `init`
    pub fn panel(&self) -> PanelGeometry {
        self.panel
    }

    /// Hardware reset and register bring-up
    ///
    /// Runs once at boot. There is no recovery from a failure here.
    pub fn init<D: DelayMs>(
        &mut self,
        delay: &mut D,
        config: &St7789Config,
    ) -> Result<(), St7789Error<SPI::Error>> {
        self.spi
            .configure(&SpiConfig::mode0(config.spi_frequency_hz))
            .map_err(St7789Error::Spi)?;

        self.rst.set_low();
        delay.delay_ms(timing::RESET_PULSE);
        self.rst.set_high();
        delay.delay_ms(timing::RESET_RECOVERY);

        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(timing::SWRESET);
        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(timing::SLPOUT);
        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        delay.delay_ms(timing::REGISTER);
        self.command(cmd::MADCTL, &[config.madctl()])?;
        delay.delay_ms(timing::REGISTER);
        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(timing::DISPON);

        self.panel.orientation = config.orientation;
        self.set_backlight(config.backlight);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "ST7789 initialised: {}x{}, rotation {}",
            self.panel.width(),
            self.panel.height(),
            config.orientation.degrees()
        );

        Ok(())
    }

    /// Send one command with optional parameters
    pub fn command(&mut self, command: u8, data: &[u8]) -> Result<(), St7789Error<SPI::Error>> {
        self.end_pixels()?;

        self.cs.set_low();
        self.dc.set_low();
        let result = self.spi.write(&[command]).and_then(|()| {
            self.dc.set_high();
            if data.is_empty() {
                Ok(())
            } else {
                self.spi.write(data)
            }
        });
        self.cs.set_high();
        result.map_err(St7789Error::Spi)
    }

    /// Program the address window and issue RAMWR
    ///
    /// Pixel data for the window must follow via [`St7789::begin_pixels`].
    pub fn set_window(&mut self, rect: &DirtyRect) -> Result<(), St7789Error<SPI::Error>> {
        if !self.panel.contains(rect) {
            return Err(St7789Error::OutOfBounds);
        }
        let [x1h, x1l] = rect.x1.to_be_bytes();
        let [x2h, x2l] = rect.x2.to_be_bytes();
        let [y1h, y1l] = rect.y1.to_be_bytes();
        let [y2h, y2l] = rect.y2.to_be_bytes();

        self.command(cmd::CASET, &[x1h, x1l, x2h, x2l])?;
        self.command(cmd::RASET, &[y1h, y1l, y2h, y2l])?;
        self.command(cmd::RAMWR, &[])
    }

    /// Assert CS with DC high for a pixel stream
    pub fn begin_pixels(&mut self) {
        self.cs.set_low();
        self.dc.set_high();
        self.streaming = true;
    }

    /// Drain the SPI FIFO and release CS after a pixel stream
    ///
    /// No-op when no stream is open.
    pub fn end_pixels(&mut self) -> Result<(), St7789Error<SPI::Error>> {
        if !self.streaming {
            return Ok(());
        }
        self.streaming = false;
        let result = self.spi.flush();
        self.cs.set_high();
        result.map_err(St7789Error::Spi)
    }

    /// Whether CS is held for a pixel stream
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Blocking pixel write, for use before the flush pipeline is running
    pub fn write_pixels(
        &mut self,
        rect: &DirtyRect,
        pixels: &[u8],
    ) -> Result<(), St7789Error<SPI::Error>> {
        self.set_window(rect)?;
        self.begin_pixels();
        let result = self.spi.write(pixels);
        let end = self.end_pixels();
        result.map_err(St7789Error::Spi)?;
        end
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.bl.set_state(on);
    }

    pub fn backlight(&self) -> bool {
        self.bl.is_set_high()
    }
}
