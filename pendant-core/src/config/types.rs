//! Configuration types
//!
//! Defaults reproduce the reference board: a 240x320 ST7789 in portrait,
//! 32-line partial buffers and an XPT2046 calibrated 300..3800 (X, inverted)
//! by 200..3700 (Y).

use crate::geometry::{ColorOrder, Orientation, PanelGeometry};
use crate::touch::{AxisCalibration, TouchCalibration, ADC_MAX};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroSize,
    /// `buffer_lines` is zero or taller than the panel
    BufferLines,
    /// Calibration min >= max or above the ADC range
    TouchRange,
    /// SPI frequency is zero
    SpiFrequency,
    /// Touch poll interval is zero
    PollInterval,
}

/// `[display]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Native (portrait) width in pixels
    pub width: u16,
    /// Native (portrait) height in pixels
    pub height: u16,
    pub orientation: Orientation,
    pub color_order: ColorOrder,
    pub spi_frequency_hz: u32,
    /// Rows per partial frame buffer
    pub buffer_lines: u16,
    /// Stuck transfer timeout, 0 disables
    pub flush_timeout_ms: u32,
    /// Backlight state after init
    pub backlight: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 320,
            orientation: Orientation::Deg0,
            color_order: ColorOrder::Rgb,
            spi_frequency_hz: 62_500_000,
            buffer_lines: 32,
            flush_timeout_ms: 100,
            backlight: true,
        }
    }
}

/// `[touch]` section with its `[touch.x]` / `[touch.y]` subsections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchConfig {
    pub spi_frequency_hz: u32,
    pub calibration: TouchCalibration,
    pub poll_interval_ms: u32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            spi_frequency_hz: 2_500_000,
            calibration: TouchCalibration::default(),
            poll_interval_ms: 5,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    pub display: DisplayConfig,
    pub touch: TouchConfig,
}

impl PanelConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        if d.width == 0 || d.height == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if d.buffer_lines == 0 || d.buffer_lines > d.width.max(d.height) {
            return Err(ConfigError::BufferLines);
        }
        if d.spi_frequency_hz == 0 || self.touch.spi_frequency_hz == 0 {
            return Err(ConfigError::SpiFrequency);
        }
        let cal = &self.touch.calibration;
        if !cal.x.is_valid() || !cal.y.is_valid() || cal.pressure_threshold > ADC_MAX {
            return Err(ConfigError::TouchRange);
        }
        if self.touch.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }
        Ok(())
    }

    /// Panel geometry with orientation applied
    pub fn geometry(&self) -> PanelGeometry {
        PanelGeometry::new(
            self.display.width,
            self.display.height,
            self.display.orientation,
        )
    }

    /// Pixels per frame buffer: one logical row times `buffer_lines`
    pub fn buffer_pixels(&self) -> usize {
        self.geometry().width() as usize * self.display.buffer_lines as usize
    }
}
