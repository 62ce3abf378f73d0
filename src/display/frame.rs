// Indexed frame - Source image produced by the video chip
//
// Each pixel is a one-byte palette index, stored row-major. The compositor
// reads frames through the `FrameSource` trait so it never depends on the
// chip simulator that produced them.

/// Read-only view of an indexed frame
pub trait FrameSource {
    /// Frame width in source pixels
    fn width(&self) -> u32;

    /// Frame height in rows
    fn height(&self) -> u32;

    /// Indexed pixels, `width * height` bytes, row-major
    fn frame_buffer(&self) -> &[u8];
}

/// Owned indexed frame
///
/// Used by tests, benchmarks and the viewer as a stand-in for the chip's
/// own frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IndexedFrame {
    /// Create a frame filled with index 0
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing pixel data
    ///
    /// # Panics
    /// Panics if `pixels` is not exactly `width * height` bytes
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "indexed frame must be exactly {}x{} pixels",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, index: u8) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[(y * self.width + x) as usize] = index;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[(y * self.width + x) as usize]
    }

    /// Fill the whole frame with one index
    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    /// Hue bars across, luminance steps down
    pub fn test_pattern(&mut self) {
        let (width, height) = (self.width.max(1), self.height.max(1));
        for y in 0..self.height {
            for x in 0..self.width {
                let hue = (x * 16 / width) as u8;
                let luma = (y * 8 / height) as u8;
                self.set_pixel(x, y, (hue << 4) | (luma << 1));
            }
        }
    }

    /// Draw the test pattern with a bright vertical bar at `frame`-dependent position
    ///
    /// The bar moves two pixels per frame, which makes phosphor trails visible.
    pub fn moving_bar_pattern(&mut self, frame: u64) {
        self.test_pattern();
        if self.width == 0 {
            return;
        }

        let bar_x = ((frame * 2) % self.width as u64) as u32;
        for y in 0..self.height {
            for dx in 0..4 {
                let x = (bar_x + dx) % self.width;
                self.set_pixel(x, y, 0x0E);
            }
        }
    }
}

impl FrameSource for IndexedFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_buffer(&self) -> &[u8] {
        &self.pixels
    }
}
