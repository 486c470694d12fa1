//! Per-axis touch calibration

/// Largest value a 12-bit conversion can produce
pub const ADC_MAX: u16 = 4095;

/// What to do with readings at the ADC rails (0 or 4095)
///
/// Rail readings are common at pen lift. Clamping keeps fast taps,
/// discarding avoids spurious edge touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgePolicy {
    /// Clamp into the calibrated range and use the sample
    #[default]
    Clamp,
    /// Treat the sample as not pressed
    Discard,
}

impl EdgePolicy {
    /// Parse the config spelling ("clamp" / "discard")
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clamp" => Some(Self::Clamp),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

/// Raw range measured at the physical screen edges for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    /// Raw value at one edge
    pub min: u16,
    /// Raw value at the opposite edge
    pub max: u16,
    /// `true` when `min` corresponds to the high pixel edge
    pub invert: bool,
}

impl AxisCalibration {
    pub const fn new(min: u16, max: u16, invert: bool) -> Self {
        Self { min, max, invert }
    }

    /// Whether the range is usable
    pub const fn is_valid(&self) -> bool {
        self.min < self.max && self.max <= ADC_MAX
    }

    /// Map a raw reading onto `0..extent`
    ///
    /// `raw` is clamped into `[min, max]` first; the result is always below
    /// `extent` (or 0 when `extent` is 0).
    pub fn map(&self, raw: u16, extent: u16) -> u16 {
        if extent == 0 {
            return 0;
        }
        let min = self.min as i32;
        let max = (self.max as i32).max(min);
        let raw = (raw as i32).clamp(min, max);
        let offset = if self.invert { max - raw } else { raw - min };
        let span = (max - min).max(1);

        let v = offset * extent as i32 / span;
        v.clamp(0, extent as i32 - 1) as u16
    }
}

/// Calibration for both axes plus sampling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchCalibration {
    /// Native (portrait) X axis
    pub x: AxisCalibration,
    /// Native (portrait) Y axis
    pub y: AxisCalibration,
    pub edge_policy: EdgePolicy,
    /// Minimum Z1 reading counted as a press; 0 disables the check
    pub pressure_threshold: u16,
}

impl Default for TouchCalibration {
    fn default() -> Self {
        Self {
            x: AxisCalibration::new(300, 3800, true),
            y: AxisCalibration::new(200, 3700, false),
            edge_policy: EdgePolicy::Clamp,
            pressure_threshold: 0,
        }
    }
}
