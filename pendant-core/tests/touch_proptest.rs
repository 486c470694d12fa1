//! Property tests for touch calibration and orientation mapping.

use pendant_core::touch::{
    AxisCalibration, EdgePolicy, PointerTracker, RawPoint, TouchCalibration, TouchMapper, ADC_MAX,
};
use pendant_core::{Orientation, PanelGeometry};

fn mapper(orientation: Orientation) -> TouchMapper {
    TouchMapper::new(
        TouchCalibration::default(),
        PanelGeometry::new(240, 320, orientation),
    )
}

#[test]
fn min_x_max_y_maps_to_bottom_right_corner() {
    // Default calibration: X inverted (raw 300 is the right edge), Y not inverted
    let point = mapper(Orientation::Deg0).map(RawPoint::new(300, 3700));
    assert_eq!(point, Some((239, 319)));
}

proptest::proptest! {
    /// Mapping is monotonic in the configured direction and stays on screen.
    #[test]
    fn axis_map_is_monotonic(
        a in 300u16..=3800,
        b in 300u16..=3800,
        invert in proptest::bool::ANY,
        extent in 1u16..=480,
    ) {
        let axis = AxisCalibration::new(300, 3800, invert);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (mlo, mhi) = (axis.map(lo, extent), axis.map(hi, extent));
        assert!(mlo < extent && mhi < extent);
        if invert {
            assert!(mlo >= mhi, "inverted: {} -> {}, {} -> {}", lo, mlo, hi, mhi);
        } else {
            assert!(mlo <= mhi, "{} -> {}, {} -> {}", lo, mlo, hi, mhi);
        }
    }

    /// Any raw value, calibrated or not, lands inside the logical screen.
    #[test]
    fn mapped_point_in_bounds(x in 0u16..=ADC_MAX, y in 0u16..=ADC_MAX, deg in 0u16..4) {
        let orientation = Orientation::from_degrees(deg * 90).unwrap();
        let panel = PanelGeometry::new(240, 320, orientation);
        let (sx, sy) = mapper(orientation).map(RawPoint::new(x, y)).unwrap();
        assert!(sx < panel.width() && sy < panel.height());
    }

    /// Rotated orientations are rotations of the 0° result, not recalibrations.
    #[test]
    fn orientation_is_rotation_of_portrait(x in 0u16..=ADC_MAX, y in 0u16..=ADC_MAX) {
        let raw = RawPoint::new(x, y);
        let (nx, ny) = mapper(Orientation::Deg0).map(raw).unwrap();
        assert_eq!(mapper(Orientation::Deg90).map(raw), Some((ny, 239 - nx)));
        assert_eq!(mapper(Orientation::Deg180).map(raw), Some((239 - nx, 319 - ny)));
        assert_eq!(mapper(Orientation::Deg270).map(raw), Some((319 - ny, nx)));
    }

    /// Under the discard policy rail readings never produce a press.
    #[test]
    fn discard_rejects_rails(v in 0u16..=ADC_MAX, on_x in proptest::bool::ANY) {
        let cal = TouchCalibration {
            edge_policy: EdgePolicy::Discard,
            ..TouchCalibration::default()
        };
        let m = TouchMapper::new(cal, PanelGeometry::new(240, 320, Orientation::Deg0));
        let raw = if on_x { RawPoint::new(ADC_MAX, v) } else { RawPoint::new(v, 0) };
        assert_eq!(m.map(raw), None);
    }

    /// Releases replay the last pressed coordinates, however many there are.
    #[test]
    fn release_replays_last_point(
        x in 0u16..240,
        y in 0u16..320,
        releases in 1usize..32,
    ) {
        let mut tracker = PointerTracker::new();
        tracker.update(Some((x, y)));
        for _ in 0..releases {
            let s = tracker.update(None);
            assert_eq!((s.x, s.y, s.pressed), (x, y, false));
        }
    }
}
