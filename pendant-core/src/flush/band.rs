//! Splitting a dirty rectangle into buffer-sized bands

use super::pipeline::FlushError;
use crate::geometry::DirtyRect;

/// Iterator over horizontal bands of a rectangle
///
/// Each band spans the full width of the rectangle and as many rows as fit
/// in a buffer of `capacity_pixels`. The last band may be shorter.
#[derive(Debug, Clone)]
pub struct BandIter {
    rect: DirtyRect,
    lines_per_band: u16,
    next_row: u32,
}

impl BandIter {
    /// Fails if not even a single row of `rect` fits in the buffer
    pub fn new(rect: DirtyRect, capacity_pixels: usize) -> Result<Self, FlushError> {
        let lines = capacity_pixels / rect.width() as usize;
        if lines == 0 {
            return Err(FlushError::BufferTooSmall);
        }
        Ok(Self {
            rect,
            lines_per_band: lines.min(u16::MAX as usize) as u16,
            next_row: rect.y1 as u32,
        })
    }

    /// Rows per full band
    pub fn lines_per_band(&self) -> u16 {
        self.lines_per_band
    }

    /// Number of bands still to come
    pub fn remaining(&self) -> usize {
        let end = self.rect.y2 as u32 + 1;
        if self.next_row >= end {
            return 0;
        }
        let rows = end - self.next_row;
        rows.div_ceil(self.lines_per_band as u32) as usize
    }
}

impl Iterator for BandIter {
    type Item = DirtyRect;

    fn next(&mut self) -> Option<DirtyRect> {
        let y2_end = self.rect.y2 as u32;
        if self.next_row > y2_end {
            return None;
        }
        let y1 = self.next_row;
        let y2 = (y1 + self.lines_per_band as u32 - 1).min(y2_end);
        self.next_row = y2 + 1;
        DirtyRect::new(self.rect.x1, y1 as u16, self.rect.x2, y2 as u16)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for BandIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flush::buffer::BYTES_PER_PIXEL;

    #[test]
    fn test_full_screen_in_32_line_bands() {
        let screen = DirtyRect::full(240, 320).unwrap();
        let bands = BandIter::new(screen, 240 * 32).unwrap();
        assert_eq!(bands.lines_per_band(), 32);
        assert_eq!(bands.len(), 10);

        for (i, band) in bands.enumerate() {
            assert_eq!(band.y1, i as u16 * 32);
            assert_eq!(band.width(), 240);
            assert_eq!(band.pixel_count() * BYTES_PER_PIXEL, 240 * 32 * 2);
        }
    }

    #[test]
    fn test_last_band_is_short() {
        let rect = DirtyRect::new(10, 5, 19, 14).unwrap();
        let bands: heapless::Vec<DirtyRect, 4> = BandIter::new(rect, 40).unwrap().collect();
        assert_eq!(bands.len(), 3);
        assert_eq!((bands[0].y1, bands[0].y2), (5, 8));
        assert_eq!((bands[1].y1, bands[1].y2), (9, 12));
        assert_eq!((bands[2].y1, bands[2].y2), (13, 14));
        assert!(bands.iter().all(|b| b.x1 == 10 && b.x2 == 19));
    }

    #[test]
    fn test_row_wider_than_buffer() {
        let rect = DirtyRect::new(0, 0, 239, 0).unwrap();
        assert_eq!(
            BandIter::new(rect, 100).unwrap_err(),
            FlushError::BufferTooSmall
        );
    }

    #[test]
    fn test_full_range_row() {
        let rect = DirtyRect::new(0, 0, u16::MAX, 0).unwrap();
        let mut bands = BandIter::new(rect, 1 << 20).unwrap();
        assert_eq!(bands.lines_per_band(), 16);
        assert_eq!(bands.next(), Some(rect));
        assert!(bands.next().is_none());

        assert_eq!(
            BandIter::new(rect, u16::MAX as usize).unwrap_err(),
            FlushError::BufferTooSmall
        );
    }

    #[test]
    fn test_band_at_bottom_edge() {
        let rect = DirtyRect::new(0, u16::MAX - 1, 0, u16::MAX).unwrap();
        let mut bands = BandIter::new(rect, 1).unwrap();
        assert_eq!(bands.next().map(|b| b.y1), Some(u16::MAX - 1));
        assert_eq!(bands.next().map(|b| b.y1), Some(u16::MAX));
        assert!(bands.next().is_none());
    }
}
