// Palette - Indexed-to-RGB lookup tables and channel helpers
//
// The compositor never owns palette tables. The palette manager builds them
// once per console/game and hands out borrowed views; those tables must
// outlive every compositor that references them.
//
// Colors are packed as 0xRRGGBB in the low 24 bits of a u32.

/// Number of entries in a base indexed palette
pub const PALETTE_SIZE: usize = 256;

static BLACK_TABLE: [u32; PALETTE_SIZE] = [0; PALETTE_SIZE];

/// Split a packed 0xRRGGBB color into its channels
#[inline]
pub fn split_channels(rgb: u32) -> (u8, u8, u8) {
    ((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Pack red, green and blue channels into 0xRRGGBB
#[inline]
pub fn pack_channels(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Borrowed view over the palette manager's lookup tables
///
/// `indexed` maps an indexed pixel (optionally OR'd with a shift) to a display
/// color. `raw` is the unprocessed RGB table the composite filter derives its
/// own palette from. Neither table is copied.
#[derive(Debug, Clone, Copy)]
pub struct Palette<'p> {
    indexed: &'p [u32],
    raw: &'p [u32],
}

impl<'p> Palette<'p> {
    /// Create a palette view
    ///
    /// # Panics
    /// Panics if `indexed` has fewer than 256 entries
    pub fn new(indexed: &'p [u32], raw: &'p [u32]) -> Self {
        assert!(
            indexed.len() >= PALETTE_SIZE,
            "indexed palette needs at least {} entries, got {}",
            PALETTE_SIZE,
            indexed.len()
        );
        Self { indexed, raw }
    }

    /// Look up the display color of an indexed pixel
    #[inline]
    pub fn lookup(&self, index: u8) -> u32 {
        self.indexed[index as usize]
    }

    /// Look up an indexed pixel with a palette shift applied
    #[inline]
    pub fn lookup_shifted(&self, index: u8, shift: u8) -> u32 {
        self.indexed[(index | shift) as usize]
    }
}

impl Default for Palette<'_> {
    /// All-black palette used until the palette manager installs real tables
    fn default() -> Self {
        Self {
            indexed: &BLACK_TABLE,
            raw: &BLACK_TABLE,
        }
    }
}

/// Generate a 256-entry hue/luminance palette
///
/// Index layout is `hhhh lll-`: 16 hues (hue 0 is grey) by 8 luminance steps,
/// with the low bit ignored. Colors are produced from YIQ, which is close to
/// what a composite-video console encodes.
pub fn hue_luma_palette() -> Vec<u32> {
    let mut palette = Vec::with_capacity(PALETTE_SIZE);

    for index in 0..PALETTE_SIZE {
        let hue = index >> 4;
        let luma = (index >> 1) & 0x07;

        let y = 0.06 + (luma as f32 / 7.0) * 0.88;
        let (i, q) = if hue == 0 {
            (0.0, 0.0)
        } else {
            let angle = (hue - 1) as f32 * 24.0_f32.to_radians();
            (0.28 * angle.cos(), 0.28 * angle.sin())
        };

        let r = y + 0.956 * i + 0.621 * q;
        let g = y - 0.272 * i - 0.647 * q;
        let b = y - 1.106 * i + 1.703 * q;

        palette.push(pack_channels(
            to_channel(r),
            to_channel(g),
            to_channel(b),
        ));
    }

    palette
}

#[inline]
fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pack_channels() {
        assert_eq!(split_channels(0x112233), (0x11, 0x22, 0x33));
        assert_eq!(pack_channels(0x11, 0x22, 0x33), 0x112233);
        // Bits above the color are ignored
        assert_eq!(split_channels(0xFF_AABBCC), (0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn test_default_palette_is_black() {
        let palette = Palette::default();
        assert_eq!(palette.lookup(0), 0);
        assert_eq!(palette.lookup(255), 0);
    }

    #[test]
    fn test_lookup_shifted() {
        let table: Vec<u32> = (0..256).collect();
        let palette = Palette::new(&table, &table);
        assert_eq!(palette.lookup(0x12), 0x12);
        assert_eq!(palette.lookup_shifted(0x02, 0x10), 0x12);
    }

    #[test]
    #[should_panic]
    fn test_short_palette_rejected() {
        let table = [0u32; 16];
        let _ = Palette::new(&table, &table);
    }

    #[test]
    fn test_hue_luma_palette() {
        let palette = hue_luma_palette();
        assert_eq!(palette.len(), PALETTE_SIZE);

        // Hue 0 is grey and brightens with luminance
        let (r, g, b) = split_channels(palette[0x00]);
        assert_eq!((r, g), (g, b));
        let (bright, _, _) = split_channels(palette[0x0E]);
        assert!(bright > r);

        // Low bit is ignored
        assert_eq!(palette[0x44], palette[0x45]);
    }
}
