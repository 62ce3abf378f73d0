// Presentation - Scale composed surfaces into an RGBA window buffer
//
// The image surface's source rectangle is stretched (nearest neighbour) onto
// its destination rectangle. The scanline overlay is stretched the same way;
// its opaque rows darken the image by the overlay's blend alpha.

use super::palette::split_channels;
use super::surface::Surface;

/// Draw `image` and an optional scanline `overlay` into an RGBA buffer
///
/// # Arguments
/// * `image` - Composed image surface
/// * `overlay` - Scanline surface, `None` when scanlines are disabled
/// * `frame` - Output RGBA bytes (`width * height * 4`)
/// * `width` - Output width in pixels
/// * `height` - Output height in pixels
///
/// # Panics
/// Panics if `frame` is too small
pub fn present_rgba<S: Surface>(
    image: &S,
    overlay: Option<&S>,
    frame: &mut [u8],
    width: u32,
    height: u32,
) {
    let (width, height) = (width as usize, height as usize);
    assert!(
        frame.len() >= width * height * 4,
        "Output buffer too small for RGBA presentation"
    );

    frame[..width * height * 4].fill(0);
    for alpha in frame[..width * height * 4].iter_mut().skip(3).step_by(4) {
        *alpha = 0xFF;
    }

    let src = image.src_rect();
    let dst = image.dst_rect();
    if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
        return;
    }

    let pixels = image.pixels();
    let pitch = image.pitch();

    let overlay = overlay.map(|surface| {
        let alpha = surface.attributes().blend_alpha.min(100);
        (surface, alpha)
    });

    let x_end = (dst.x + dst.width).min(width as u32);
    let y_end = (dst.y + dst.height).min(height as u32);

    for ty in dst.y..y_end {
        let row_in_dst = (ty - dst.y) as usize;
        let sy = src.y as usize + row_in_dst * src.height as usize / dst.height as usize;

        let darken = overlay
            .map(|(surface, alpha)| scanline_darkening(surface, row_in_dst, dst.height, alpha))
            .unwrap_or(100);

        for tx in dst.x..x_end {
            let sx = src.x as usize
                + (tx - dst.x) as usize * src.width as usize / dst.width as usize;
            let (r, g, b) = split_channels(pixels[sy * pitch + sx]);

            let offset = (ty as usize * width + tx as usize) * 4;
            frame[offset] = scale_channel(r, darken);
            frame[offset + 1] = scale_channel(g, darken);
            frame[offset + 2] = scale_channel(b, darken);
        }
    }
}

/// Remaining brightness in percent for one destination row
fn scanline_darkening<S: Surface>(overlay: &S, row_in_dst: usize, dst_height: u32, alpha: u32) -> u32 {
    let src = overlay.src_rect();
    if src.height == 0 {
        return 100;
    }

    let oy = src.y as usize + row_in_dst * src.height as usize / dst_height as usize;
    let opaque = overlay.pixels()[oy * overlay.pitch()] >> 24 != 0;

    if opaque {
        100 - alpha
    } else {
        100
    }
}

#[inline]
fn scale_channel(value: u8, percent: u32) -> u8 {
    (value as u32 * percent / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::{Rect, SoftwareSurface};

    fn image_2x1() -> SoftwareSurface {
        let mut image = SoftwareSurface::new(2, 1, Some(&[0x102030, 0x405060]));
        image.set_dst_pos(0, 0);
        image.set_dst_size(4, 2);
        image
    }

    #[test]
    fn test_present_scales_nearest() {
        let image = image_2x1();
        let mut frame = vec![0u8; 4 * 2 * 4];
        present_rgba(&image, None, &mut frame, 4, 2);

        assert_eq!(&frame[0..4], &[0x10, 0x20, 0x30, 0xFF]);
        assert_eq!(&frame[4..8], &[0x10, 0x20, 0x30, 0xFF]);
        assert_eq!(&frame[8..12], &[0x40, 0x50, 0x60, 0xFF]);
        // Second row repeats the first
        assert_eq!(&frame[16..20], &[0x10, 0x20, 0x30, 0xFF]);
    }

    #[test]
    fn test_present_overlay_darkens_odd_rows() {
        let image = image_2x1();
        let mut overlay = SoftwareSurface::new(1, 2, Some(&[0x00000000, 0xFF000000]));
        overlay.set_dst_size(4, 2);
        overlay.attributes_mut().blend_alpha = 50;
        assert_eq!(overlay.src_rect(), Rect::new(0, 0, 1, 2));

        let mut frame = vec![0u8; 4 * 2 * 4];
        present_rgba(&image, Some(&overlay), &mut frame, 4, 2);

        assert_eq!(&frame[0..3], &[0x10, 0x20, 0x30]);
        assert_eq!(&frame[16..19], &[0x08, 0x10, 0x18]);
    }

    #[test]
    fn test_present_empty_source_is_black() {
        let mut image = image_2x1();
        image.set_src_size(0, 0);
        let mut frame = vec![0xAAu8; 4 * 2 * 4];
        present_rgba(&image, None, &mut frame, 4, 2);
        assert_eq!(&frame[0..4], &[0, 0, 0, 0xFF]);
    }
}
