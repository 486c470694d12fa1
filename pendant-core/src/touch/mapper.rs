//! Raw reading to logical screen coordinates

use super::calibration::{EdgePolicy, TouchCalibration, ADC_MAX};
use crate::geometry::{Orientation, PanelGeometry};

/// One conversion cycle from the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawPoint {
    pub x: u16,
    pub y: u16,
    /// Z1 pressure reading, if it was sampled
    pub z: Option<u16>,
}

impl RawPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y, z: None }
    }

    /// Either axis sits on an ADC rail
    pub const fn is_at_extreme(&self) -> bool {
        self.x == 0 || self.x >= ADC_MAX || self.y == 0 || self.y >= ADC_MAX
    }
}

/// Native-to-logical axis permutation
///
/// Flips apply to the native axes first, then `swap` exchanges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisPermutation {
    pub swap: bool,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl AxisPermutation {
    /// Permutation matching the controller's MADCTL rotation
    pub const fn for_orientation(orientation: Orientation) -> Self {
        const fn p(swap: bool, flip_x: bool, flip_y: bool) -> AxisPermutation {
            AxisPermutation {
                swap,
                flip_x,
                flip_y,
            }
        }
        match orientation {
            Orientation::Deg0 => p(false, false, false),
            Orientation::Deg90 => p(true, true, false),
            Orientation::Deg180 => p(false, true, true),
            Orientation::Deg270 => p(true, false, true),
        }
    }

    /// Apply to a native point `(nx, ny)` on a `width` x `height` panel
    pub const fn apply(&self, nx: u16, ny: u16, width: u16, height: u16) -> (u16, u16) {
        let x = if self.flip_x {
            width.saturating_sub(1).saturating_sub(nx)
        } else {
            nx
        };
        let y = if self.flip_y {
            height.saturating_sub(1).saturating_sub(ny)
        } else {
            ny
        };
        if self.swap {
            (y, x)
        } else {
            (x, y)
        }
    }
}

/// Calibration plus orientation for one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchMapper {
    calibration: TouchCalibration,
    panel: PanelGeometry,
    permutation: AxisPermutation,
}

impl TouchMapper {
    pub const fn new(calibration: TouchCalibration, panel: PanelGeometry) -> Self {
        Self {
            calibration,
            panel,
            permutation: AxisPermutation::for_orientation(panel.orientation),
        }
    }

    pub fn calibration(&self) -> &TouchCalibration {
        &self.calibration
    }

    pub fn panel(&self) -> &PanelGeometry {
        &self.panel
    }

    /// Logical screen point for a raw reading
    ///
    /// `None` when the reading does not count as a press: a rail reading
    /// under [`EdgePolicy::Discard`], or pressure below the threshold.
    pub fn map(&self, raw: RawPoint) -> Option<(u16, u16)> {
        if self.calibration.edge_policy == EdgePolicy::Discard && raw.is_at_extreme() {
            return None;
        }
        let threshold = self.calibration.pressure_threshold;
        if threshold > 0 && raw.z.is_some_and(|z| z < threshold) {
            return None;
        }

        let width = self.panel.native_width;
        let height = self.panel.native_height;
        let nx = self.calibration.x.map(raw.x, width);
        let ny = self.calibration.y.map(raw.y, height);
        Some(self.permutation.apply(nx, ny, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(orientation: Orientation) -> TouchMapper {
        TouchMapper::new(
            TouchCalibration::default(),
            PanelGeometry::new(240, 320, orientation),
        )
    }

    #[test]
    fn test_corner_at_zero_degrees() {
        // X calibrated inverted: raw min is the right edge
        assert_eq!(mapper(Orientation::Deg0).map(RawPoint::new(300, 3700)), Some((239, 319)));
        assert_eq!(mapper(Orientation::Deg0).map(RawPoint::new(3800, 200)), Some((0, 0)));
    }

    #[test]
    fn test_rotations_of_one_point() {
        let raw = RawPoint::new(3800, 200);
        // Native (0, 0) is the top-left in portrait
        assert_eq!(mapper(Orientation::Deg90).map(raw), Some((0, 239)));
        assert_eq!(mapper(Orientation::Deg180).map(raw), Some((239, 319)));
        assert_eq!(mapper(Orientation::Deg270).map(raw), Some((319, 0)));
    }

    #[test]
    fn test_rotated_point_stays_in_logical_bounds() {
        for o in [Orientation::Deg90, Orientation::Deg270] {
            let m = mapper(o);
            for raw in [RawPoint::new(0, 0), RawPoint::new(ADC_MAX, ADC_MAX)] {
                let (x, y) = m.map(raw).unwrap();
                assert!(x < 320 && y < 240, "{:?} -> ({}, {})", o, x, y);
            }
        }
    }

    #[test]
    fn test_discard_policy_rejects_rails() {
        let cal = TouchCalibration {
            edge_policy: EdgePolicy::Discard,
            ..TouchCalibration::default()
        };
        let m = TouchMapper::new(cal, PanelGeometry::new(240, 320, Orientation::Deg0));
        assert_eq!(m.map(RawPoint::new(ADC_MAX, 1000)), None);
        assert_eq!(m.map(RawPoint::new(1000, 0)), None);
        assert!(m.map(RawPoint::new(1000, 1000)).is_some());

        // Clamp keeps the same sample
        let clamped = mapper(Orientation::Deg0).map(RawPoint::new(ADC_MAX, 1000));
        assert_eq!(clamped.map(|p| p.0), Some(0));
    }

    #[test]
    fn test_pressure_threshold() {
        let cal = TouchCalibration {
            pressure_threshold: 100,
            ..TouchCalibration::default()
        };
        let m = TouchMapper::new(cal, PanelGeometry::new(240, 320, Orientation::Deg0));
        let light = RawPoint {
            z: Some(99),
            ..RawPoint::new(2000, 2000)
        };
        let firm = RawPoint {
            z: Some(100),
            ..RawPoint::new(2000, 2000)
        };
        assert_eq!(m.map(light), None);
        assert!(m.map(firm).is_some());
        // No pressure reading: threshold not applied
        assert!(m.map(RawPoint::new(2000, 2000)).is_some());
    }
}
