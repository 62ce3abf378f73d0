// RGB frame buffer - Fixed-capacity storage for composed frames
//
// The compositor keeps two of these (current and previous composed frame).
// Capacity is fixed at construction to the largest frame the compositor
// supports; layout inside the buffer is decided by whoever writes it.

/// Fixed-capacity buffer of packed 0xRRGGBB pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrameBuffer {
    pixels: Box<[u32]>,
}

impl RgbFrameBuffer {
    /// Create a zeroed buffer holding `capacity` pixels
    pub fn new(capacity: usize) -> Self {
        Self {
            pixels: vec![0; capacity].into_boxed_slice(),
        }
    }

    /// Number of pixels the buffer holds
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// Reset every pixel to black
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Get the raw pixel data
    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }

    /// Get mutable access to the raw pixel data
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Copy the first `len` pixels from another buffer
    ///
    /// `len` is clamped to the smaller of the two capacities; the rest of
    /// this buffer is left untouched. Returns the number of pixels copied.
    pub fn copy_from(&mut self, other: &RgbFrameBuffer, len: usize) -> usize {
        let len = len.min(self.capacity()).min(other.capacity());
        self.pixels[..len].copy_from_slice(&other.pixels[..len]);
        len
    }
}
