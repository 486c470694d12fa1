//! Panel geometry
//!
//! The ST7789 panel is natively 240x320 portrait. Orientation is applied by
//! the controller (MADCTL), so the renderer sees a logical size whose width
//! and height swap for 90° and 270°.

/// Fixed panel rotation, chosen at init
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Portrait
    #[default]
    Deg0,
    /// Landscape
    Deg90,
    /// Portrait, upside down
    Deg180,
    /// Landscape, reversed
    Deg270,
}

impl Orientation {
    /// Parse a rotation in degrees
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Rotation in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// MADCTL row/column order and exchange bits (MY, MX, MV)
    pub const fn madctl(self) -> u8 {
        match self {
            Self::Deg0 => 0x00,
            Self::Deg90 => 0x60,
            Self::Deg180 => 0xC0,
            Self::Deg270 => 0xA0,
        }
    }

    /// Whether logical X runs along the native Y axis
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Subpixel order of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ColorOrder {
    /// MADCTL RGB/BGR bit
    pub const fn madctl(self) -> u8 {
        match self {
            Self::Rgb => 0x00,
            Self::Bgr => 0x08,
        }
    }
}

/// Region to push to the display, inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyRect {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl DirtyRect {
    /// Create a rectangle; `None` if the corners are out of order
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Option<Self> {
        if x1 > x2 || y1 > y2 {
            return None;
        }
        Some(Self { x1, y1, x2, y2 })
    }

    /// Whole-screen rectangle for a `width` x `height` area
    ///
    /// Returns `None` for an empty area.
    pub const fn full(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x1: 0,
            y1: 0,
            x2: width - 1,
            y2: height - 1,
        })
    }

    /// Width in pixels; a full-range rect is 65536 wide
    pub const fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32 + 1
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32 + 1
    }

    /// Number of pixels covered, saturating on 32-bit targets
    pub const fn pixel_count(&self) -> usize {
        (self.width() as usize).saturating_mul(self.height() as usize)
    }

    /// Whether the rectangle lies inside a `width` x `height` window
    pub const fn fits_within(&self, width: u16, height: u16) -> bool {
        self.x2 < width && self.y2 < height
    }

    /// Whether the two rectangles share at least one pixel
    pub const fn overlaps(&self, other: &DirtyRect) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        DirtyRect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Shared area, if any
    pub fn intersection(&self, other: &DirtyRect) -> Option<DirtyRect> {
        DirtyRect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        )
    }
}

/// Native panel size plus the orientation applied at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    /// Native (portrait) width
    pub native_width: u16,
    /// Native (portrait) height
    pub native_height: u16,
    pub orientation: Orientation,
}

impl PanelGeometry {
    pub const fn new(native_width: u16, native_height: u16, orientation: Orientation) -> Self {
        Self {
            native_width,
            native_height,
            orientation,
        }
    }

    /// Logical width as seen by the renderer
    pub const fn width(&self) -> u16 {
        if self.orientation.swaps_axes() {
            self.native_height
        } else {
            self.native_width
        }
    }

    /// Logical height as seen by the renderer
    pub const fn height(&self) -> u16 {
        if self.orientation.swaps_axes() {
            self.native_width
        } else {
            self.native_height
        }
    }

    /// Whether `rect` is addressable
    pub const fn contains(&self, rect: &DirtyRect) -> bool {
        rect.fits_within(self.width(), self.height())
    }

    /// Whole logical screen
    pub const fn bounds(&self) -> Option<DirtyRect> {
        DirtyRect::full(self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_degrees() {
        for o in [
            Orientation::Deg0,
            Orientation::Deg90,
            Orientation::Deg180,
            Orientation::Deg270,
        ] {
            assert_eq!(Orientation::from_degrees(o.degrees()), Some(o));
        }
        assert_eq!(Orientation::from_degrees(45), None);
    }

    #[test]
    fn test_madctl_values() {
        assert_eq!(Orientation::Deg0.madctl(), 0x00);
        assert_eq!(Orientation::Deg90.madctl(), 0x60);
        assert_eq!(Orientation::Deg180.madctl(), 0xC0);
        assert_eq!(Orientation::Deg270.madctl(), 0xA0);
        assert_eq!(
            Orientation::Deg90.madctl() | ColorOrder::Bgr.madctl(),
            0x68
        );
    }

    #[test]
    fn test_rect_rejects_inverted_corners() {
        assert!(DirtyRect::new(10, 0, 9, 0).is_none());
        assert!(DirtyRect::new(0, 5, 0, 4).is_none());
        let r = DirtyRect::new(3, 4, 3, 4).unwrap();
        assert_eq!(r.pixel_count(), 1);
    }

    #[test]
    fn test_logical_size_follows_orientation() {
        let portrait = PanelGeometry::new(240, 320, Orientation::Deg180);
        assert_eq!((portrait.width(), portrait.height()), (240, 320));

        let landscape = PanelGeometry::new(240, 320, Orientation::Deg270);
        assert_eq!((landscape.width(), landscape.height()), (320, 240));

        let wide = DirtyRect::new(0, 0, 319, 0).unwrap();
        assert!(landscape.contains(&wide));
        assert!(!portrait.contains(&wide));
    }

    #[test]
    fn test_union_and_intersection() {
        let a = DirtyRect::new(0, 0, 9, 9).unwrap();
        let b = DirtyRect::new(5, 5, 20, 12).unwrap();
        let c = DirtyRect::new(11, 0, 12, 1).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.union(&b), DirtyRect::new(0, 0, 20, 12).unwrap());
        assert_eq!(a.intersection(&b), DirtyRect::new(5, 5, 9, 9));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_full_range_rect_size() {
        let r = DirtyRect::new(0, 0, u16::MAX, u16::MAX).unwrap();
        assert_eq!(r.width(), 65536);
        assert_eq!(r.height(), 65536);
        assert!(r.pixel_count() >= u32::MAX as usize);
    }

    #[test]
    fn test_full_rect() {
        let r = DirtyRect::full(240, 320).unwrap();
        assert_eq!((r.x2, r.y2), (239, 319));
        assert_eq!(r.pixel_count(), 240 * 320);
        assert!(DirtyRect::full(0, 320).is_none());
    }
}
