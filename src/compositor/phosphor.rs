// Phosphor blend table
//
// Maps every (current, previous) channel pair to the displayed channel:
//
//   blended = round(current * f + previous * (1 - f)),  f = percent / 100
//
// Computed in integer arithmetic so rounding is exact (half rounds up).

use crate::display::{pack_channels, split_channels};

const TABLE_SIZE: usize = 256 * 256;

/// Precomputed 256x256 channel blend table
#[derive(Debug, Clone)]
pub struct PhosphorTable {
    entries: Box<[u8]>,
    percent: u32,
    fresh: bool,
}

impl PhosphorTable {
    /// Create a table that has not been computed yet
    pub fn new() -> Self {
        Self {
            entries: vec![0; TABLE_SIZE].into_boxed_slice(),
            percent: 0,
            fresh: false,
        }
    }

    /// Recompute all entries for a blend percentage (clamped to 100)
    pub fn rebuild(&mut self, percent: u32) {
        let percent = percent.min(100);
        for current in 0..256u32 {
            let row = &mut self.entries[current as usize * 256..][..256];
            for (previous, entry) in row.iter_mut().enumerate() {
                let previous = previous as u32;
                *entry = ((current * percent + previous * (100 - percent) + 50) / 100) as u8;
            }
        }

        self.percent = percent;
        self.fresh = true;
        log::trace!("phosphor table rebuilt at {}%", percent);
    }

    /// Whether `rebuild` has run at least once
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Blend percentage the table was built with
    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Blend one channel
    #[inline]
    pub fn get(&self, current: u8, previous: u8) -> u8 {
        self.entries[((current as usize) << 8) | previous as usize]
    }

    /// Blend two packed colors channel by channel
    #[inline]
    pub fn blend_rgb(&self, current: u32, previous: u32) -> u32 {
        let (rc, gc, bc) = split_channels(current);
        let (rp, gp, bp) = split_channels(previous);
        pack_channels(self.get(rc, rp), self.get(gc, gp), self.get(bc, bp))
    }
}

impl Default for PhosphorTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Unweighted per-channel mean of two colors, rounded toward zero
#[inline]
pub fn average_rgb(current: u32, previous: u32) -> u32 {
    let (rc, gc, bc) = split_channels(current);
    let (rp, gp, bp) = split_channels(previous);
    let mean = |c: u8, p: u8| ((c as u16 + p as u16) / 2) as u8;
    pack_channels(mean(rc, rp), mean(gc, gp), mean(bc, bp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(percent: u32) -> PhosphorTable {
        let mut table = PhosphorTable::new();
        table.rebuild(percent);
        table
    }

    #[test]
    fn test_new_table_is_stale() {
        let table = PhosphorTable::new();
        assert!(!table.is_fresh());
    }

    #[test]
    fn test_identity_diagonal() {
        for percent in [0, 25, 60, 100] {
            let table = table(percent);
            for c in 0..=255u8 {
                assert_eq!(table.get(c, c), c, "percent {}", percent);
            }
        }
    }

    #[test]
    fn test_midpoint() {
        let table = table(50);
        for c in 0..=255u32 {
            for p in 0..=255u32 {
                let expected = ((c + p) as f32 / 2.0).round() as u8;
                assert_eq!(table.get(c as u8, p as u8), expected);
            }
        }
    }

    #[test]
    fn test_full_replace() {
        let table = table(100);
        for c in 0..=255u8 {
            for p in [0u8, 1, 127, 255] {
                assert_eq!(table.get(c, p), c);
            }
        }
    }

    #[test]
    fn test_percent_clamped() {
        let table = table(150);
        assert_eq!(table.percent(), 100);
        assert_eq!(table.get(10, 200), 10);
    }

    #[test]
    fn test_blend_rgb_sixty_percent() {
        let table = table(60);
        // round(0x11 * 0.6), round(0x22 * 0.6), round(0x33 * 0.6)
        assert_eq!(table.blend_rgb(0x112233, 0), pack_channels(10, 20, 31));
    }

    #[test]
    fn test_average_rgb_truncates() {
        assert_eq!(average_rgb(0x030303, 0x000000), 0x010101);
        assert_eq!(average_rgb(0xFF0000, 0xFF00FF), 0xFF007F);
    }
}
