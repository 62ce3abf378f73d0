// Capture module - Snapshot requests, captured images and sinks
//
// The compositor copies the shown part of a surface into a `SnapshotImage`
// and hands it to whatever `SnapshotSink` is installed. `PngSnapshotWriter`
// is the file-backed sink.

mod png_writer;
mod request;

pub use png_writer::PngSnapshotWriter;
pub use request::SnapshotRequest;

use crate::display::{split_channels, Surface};
use std::io;
use thiserror::Error;

/// Errors that can occur while persisting a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("snapshot image is empty")]
    NoImage,
}

/// A captured frame, packed 0xRRGGBB, row-major without padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl SnapshotImage {
    /// Copy the source rectangle of a surface
    pub fn from_surface<S: Surface>(surface: &S) -> Self {
        let src = surface.src_rect();
        let pitch = surface.pitch();
        let data = surface.pixels();

        let mut pixels = Vec::with_capacity(src.width as usize * src.height as usize);
        for y in src.y..src.y + src.height {
            let start = y as usize * pitch + src.x as usize;
            pixels.extend_from_slice(&data[start..start + src.width as usize]);
        }

        Self {
            width: src.width,
            height: src.height,
            pixels,
        }
    }

    /// Pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Image as RGB888 bytes
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for &color in &self.pixels {
            let (r, g, b) = split_channels(color);
            rgb.extend_from_slice(&[r, g, b]);
        }
        rgb
    }
}

/// Receives captured frames
pub trait SnapshotSink {
    /// Persist an image; returns a short description of where it went
    fn save_snapshot(&mut self, image: &SnapshotImage) -> Result<String, SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::SoftwareSurface;

    #[test]
    fn test_from_surface_copies_src_rect() {
        let data: Vec<u32> = (0..12).collect();
        let mut surface = SoftwareSurface::new(4, 3, Some(&data));
        surface.set_src_size(2, 2);

        let image = SnapshotImage::from_surface(&surface);
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.pixels, vec![0, 1, 4, 5]);
        assert_eq!(image.pixel(1, 1), 5);
    }

    #[test]
    fn test_to_rgb_bytes() {
        let image = SnapshotImage {
            width: 2,
            height: 1,
            pixels: vec![0x112233, 0xAABBCC],
        };
        assert_eq!(
            image.to_rgb_bytes(),
            vec![0x11, 0x22, 0x33, 0xAA, 0xBB, 0xCC]
        );
    }
}
