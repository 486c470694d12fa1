//! Frame buffers and the two-slot pool

/// Bytes per pixel for RGB565
pub const BYTES_PER_PIXEL: usize = 2;

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Byte range of pixel `index`, `None` past the address space
fn pixel_range(index: usize) -> Option<core::ops::Range<usize>> {
    let start = index.checked_mul(BYTES_PER_PIXEL)?;
    Some(start..start.checked_add(BYTES_PER_PIXEL)?)
}

/// Identity of one of the two pool buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Fixed-capacity pixel buffer
///
/// Pixels are stored big-endian RGB565, the byte order the ST7789 expects
/// on the wire, so the buffer can be streamed to SPI unchanged.
#[derive(Debug)]
pub struct FrameBuffer<'a> {
    slot: BufferSlot,
    bytes: &'a mut [u8],
}

impl<'a> FrameBuffer<'a> {
    /// Wrap backing storage
    ///
    /// A trailing odd byte is not used.
    pub fn new(slot: BufferSlot, bytes: &'a mut [u8]) -> Self {
        let len = bytes.len() - bytes.len() % BYTES_PER_PIXEL;
        let (bytes, _) = bytes.split_at_mut(len);
        Self { slot, bytes }
    }

    pub fn slot(&self) -> BufferSlot {
        self.slot
    }

    /// Capacity in pixels
    pub fn pixel_capacity(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    /// Raw wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// Raw wire bytes, for renderers that write rows directly
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// Give up the wrapper, keeping the backing storage
    pub fn into_bytes(self) -> &'a mut [u8] {
        self.bytes
    }

    /// Write one pixel; returns `false` if `index` is past the capacity
    pub fn set_pixel(&mut self, index: usize, color: u16) -> bool {
        let Some(range) = pixel_range(index) else {
            return false;
        };
        match self.bytes.get_mut(range) {
            Some(px) => {
                px.copy_from_slice(&color.to_be_bytes());
                true
            }
            None => false,
        }
    }

    /// Read one pixel back
    pub fn pixel(&self, index: usize) -> Option<u16> {
        self.bytes
            .get(pixel_range(index)?)
            .map(|px| u16::from_be_bytes([px[0], px[1]]))
    }

    /// Fill the first `pixels` pixels with one color
    pub fn fill(&mut self, color: u16, pixels: usize) {
        let [hi, lo] = color.to_be_bytes();
        let end = pixels.saturating_mul(BYTES_PER_PIXEL).min(self.bytes.len());
        for px in self.bytes[..end].chunks_exact_mut(BYTES_PER_PIXEL) {
            px[0] = hi;
            px[1] = lo;
        }
    }
}

/// The two frame buffers not currently owned by anyone else
///
/// A buffer is either parked here, held by the renderer, or in flight.
#[derive(Debug)]
pub struct FramePool<'a> {
    slots: [Option<FrameBuffer<'a>>; 2],
}

impl<'a> FramePool<'a> {
    /// Create a pool from two backing stores
    pub fn new(a: &'a mut [u8], b: &'a mut [u8]) -> Self {
        Self {
            slots: [
                Some(FrameBuffer::new(BufferSlot::A, a)),
                Some(FrameBuffer::new(BufferSlot::B, b)),
            ],
        }
    }

    /// Take any parked buffer
    pub fn acquire(&mut self) -> Option<FrameBuffer<'a>> {
        self.slots.iter_mut().find_map(Option::take)
    }

    /// Take a specific buffer if it is parked
    pub fn acquire_slot(&mut self, slot: BufferSlot) -> Option<FrameBuffer<'a>> {
        self.slots[slot.index()].take()
    }

    /// Park a buffer
    ///
    /// Hands the buffer back if its slot is already occupied.
    pub fn release(&mut self, buffer: FrameBuffer<'a>) -> Result<(), FrameBuffer<'a>> {
        let slot = &mut self.slots[buffer.slot().index()];
        if slot.is_some() {
            return Err(buffer);
        }
        *slot = Some(buffer);
        Ok(())
    }

    /// Number of parked buffers
    pub fn available(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
