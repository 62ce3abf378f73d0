// Simple composite filter
//
// A lightweight approximation of composite video: every pair of source
// pixels becomes seven output pixels, neighbouring pixels bleed into each
// other, and color fringing shifts red and blue in opposite directions.
// Presets pick bleed, fringing and saturation.

use super::{CompositeFilter, FilterParameters, NtscPreset, PhosphorInput};
use crate::display::{pack_channels, split_channels, PALETTE_SIZE};

/// Source pixels per chunk
const IN_CHUNK: usize = 2;

/// Output pixels per chunk
const OUT_CHUNK: usize = 7;

/// Per-preset signal settings
#[derive(Debug, Clone, Copy, PartialEq)]
struct Signal {
    /// Weight given to each horizontal neighbour (0.0-0.33)
    bleed: f32,
    /// Weight of the red/blue fringe shift (0.0-0.5)
    fringing: f32,
    /// Chroma gain around luma
    saturation: f32,
}

impl Signal {
    fn for_preset(preset: NtscPreset, custom: &FilterParameters) -> Self {
        match preset {
            NtscPreset::Off | NtscPreset::Rgb => Signal {
                bleed: 0.0,
                fringing: 0.0,
                saturation: 1.0,
            },
            NtscPreset::SVideo => Signal {
                bleed: 0.08,
                fringing: 0.0,
                saturation: 1.0,
            },
            NtscPreset::Composite => Signal {
                bleed: 0.18,
                fringing: 0.2,
                saturation: 1.0,
            },
            NtscPreset::Bad => Signal {
                bleed: 0.3,
                fringing: 0.4,
                saturation: 1.2,
            },
            NtscPreset::Custom => {
                let percent = |value: u32| value.min(100) as f32 / 100.0;
                let softness = 1.5 - percent(custom.sharpness) * 0.5 - percent(custom.resolution) * 0.5;
                Signal {
                    bleed: (percent(custom.bleed) * 0.33 * softness).min(0.33),
                    fringing: percent(custom.fringing) * 0.5,
                    saturation: 0.5 + percent(custom.artifacts),
                }
            }
        }
    }
}

/// Reference composite filter used by the viewer
#[derive(Debug, Clone)]
pub struct SimpleComposite {
    preset: NtscPreset,
    custom: FilterParameters,
    signal: Signal,
    raw_palette: Vec<u32>,
    palette: Vec<u32>,
    line: Vec<u32>,
}

impl SimpleComposite {
    /// Create a filter with the RGB preset and a black palette
    pub fn new() -> Self {
        let custom = FilterParameters::default();
        Self {
            preset: NtscPreset::Rgb,
            custom,
            signal: Signal::for_preset(NtscPreset::Rgb, &custom),
            raw_palette: vec![0; PALETTE_SIZE],
            palette: vec![0; PALETTE_SIZE],
            line: Vec::new(),
        }
    }

    /// Filter-derived color for an indexed pixel
    pub fn derived_color(&self, index: u8) -> u32 {
        self.palette[index as usize]
    }

    fn update_signal(&mut self) {
        self.signal = Signal::for_preset(self.preset, &self.custom);
        self.rebuild_palette();
    }

    fn rebuild_palette(&mut self) {
        let saturation = self.signal.saturation;
        for (derived, &raw) in self.palette.iter_mut().zip(self.raw_palette.iter()) {
            let (r, g, b) = split_channels(raw);
            let (r, g, b) = (r as f32, g as f32, b as f32);
            let luma = 0.299 * r + 0.587 * g + 0.114 * b;
            let saturate = |c: f32| (luma + (c - luma) * saturation).round().clamp(0.0, 255.0) as u8;
            *derived = pack_channels(saturate(r), saturate(g), saturate(b));
        }
    }
}

impl Default for SimpleComposite {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeFilter for SimpleComposite {
    fn out_width(&self, in_width: usize) -> usize {
        if in_width == 0 {
            0
        } else {
            ((in_width - 1) / IN_CHUNK + 1) * OUT_CHUNK
        }
    }

    fn set_palette(&mut self, raw: &[u32]) {
        for (index, entry) in self.raw_palette.iter_mut().enumerate() {
            *entry = raw.get(index).copied().unwrap_or(0);
        }
        self.rebuild_palette();
    }

    fn set_preset(&mut self, preset: NtscPreset) -> String {
        self.preset = preset;
        self.update_signal();
        self.preset_name()
    }

    fn preset_name(&self) -> String {
        self.preset.name().to_string()
    }

    fn parameters(&self) -> FilterParameters {
        self.custom
    }

    fn set_parameters(&mut self, parameters: FilterParameters) {
        self.custom = parameters;
        self.update_signal();
    }

    fn render(
        &mut self,
        input: &[u8],
        width: usize,
        height: usize,
        out: &mut [u32],
        out_pitch: usize,
        mut phosphor: Option<PhosphorInput<'_>>,
    ) {
        let out_width = self.out_width(width).min(out_pitch);
        if out_width == 0 {
            return;
        }

        let Signal {
            bleed, fringing, ..
        } = self.signal;
        let mut line = std::mem::take(&mut self.line);

        for y in 0..height {
            let row = &input[y * width..][..width];

            line.clear();
            line.extend((0..out_width).map(|ox| self.palette[row[ox * width / out_width] as usize]));

            let base = y * out_pitch;
            for ox in 0..out_width {
                let (lr, lg, lb) = split_channels(line[ox.saturating_sub(1)]);
                let (cr, cg, cb) = split_channels(line[ox]);
                let (rr, rg, rb) = split_channels(line[(ox + 1).min(out_width - 1)]);

                let smear = |l: u8, c: u8, r: u8| {
                    c as f32 * (1.0 - 2.0 * bleed) + (l as f32 + r as f32) * bleed
                };
                let red = smear(lr, cr, rr) * (1.0 - fringing) + lr as f32 * fringing;
                let green = smear(lg, cg, rg);
                let blue = smear(lb, cb, rb) * (1.0 - fringing) + rb as f32 * fringing;

                let color = pack_channels(
                    red.round().clamp(0.0, 255.0) as u8,
                    green.round().clamp(0.0, 255.0) as u8,
                    blue.round().clamp(0.0, 255.0) as u8,
                );

                out[base + ox] = match phosphor.as_mut() {
                    Some(persist) => {
                        let blended = persist.table.blend_rgb(color, persist.buffer[base + ox]);
                        persist.buffer[base + ox] = blended;
                        blended
                    }
                    None => color,
                };
            }
        }

        self.line = line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::PhosphorTable;

    fn gradient_palette() -> Vec<u32> {
        (0..256u32).map(|i| pack_channels(i as u8, i as u8, i as u8)).collect()
    }

    #[test]
    fn test_out_width() {
        let filter = SimpleComposite::new();
        assert_eq!(filter.out_width(0), 0);
        assert_eq!(filter.out_width(1), 7);
        assert_eq!(filter.out_width(2), 7);
        assert_eq!(filter.out_width(160), 560);
    }

    #[test]
    fn test_set_preset_returns_label() {
        let mut filter = SimpleComposite::new();
        assert_eq!(filter.set_preset(NtscPreset::Composite), "COMPOSITE");
        assert_eq!(filter.preset_name(), "COMPOSITE");
    }

    #[test]
    fn test_rgb_preset_keeps_flat_colors() {
        let mut filter = SimpleComposite::new();
        filter.set_palette(&gradient_palette());
        filter.set_preset(NtscPreset::Rgb);

        let input = [0x40u8; 4];
        let mut out = vec![0u32; 14];
        filter.render(&input, 4, 1, &mut out, 14, None);
        assert!(out.iter().all(|&c| c == 0x404040));
    }

    #[test]
    fn test_zero_frame_renders_black() {
        let mut filter = SimpleComposite::new();
        filter.set_palette(&gradient_palette());
        filter.set_preset(NtscPreset::Bad);

        let input = [0u8; 8];
        let mut out = vec![0xFFFFFFu32; 14 * 2];
        filter.render(&input, 4, 2, &mut out, 14, None);
        assert!(out.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_composite_bleeds_edges() {
        let mut filter = SimpleComposite::new();
        filter.set_palette(&gradient_palette());
        filter.set_preset(NtscPreset::Composite);

        let input = [0x00u8, 0x00, 0xFF, 0xFF];
        let mut out = vec![0u32; 14];
        filter.render(&input, 4, 1, &mut out, 14, None);

        // The pixel just left of the edge picks up some of the bright side
        let (_, g, _) = split_channels(out[6]);
        assert!(g > 0 && g < 0xFF);
    }

    #[test]
    fn test_phosphor_updates_persistence_buffer() {
        let mut filter = SimpleComposite::new();
        filter.set_palette(&gradient_palette());
        filter.set_preset(NtscPreset::Rgb);

        let mut table = PhosphorTable::new();
        table.rebuild(50);
        let mut persist = vec![0u32; 7];
        let mut out = vec![0u32; 7];

        filter.render(
            &[0xC8, 0xC8],
            2,
            1,
            &mut out,
            7,
            Some(PhosphorInput {
                buffer: &mut persist,
                table: &table,
            }),
        );

        // round(200 / 2) per channel
        assert!(out.iter().all(|&c| c == 0x646464));
        assert_eq!(out, persist);
    }

    #[test]
    fn test_saturation_applied_to_derived_palette() {
        let mut filter = SimpleComposite::new();
        let mut raw = vec![0u32; 256];
        raw[1] = 0x804040;
        filter.set_palette(&raw);

        filter.set_preset(NtscPreset::Rgb);
        assert_eq!(filter.derived_color(1), 0x804040);

        filter.set_preset(NtscPreset::Bad);
        let (r, _, b) = split_channels(filter.derived_color(1));
        assert!(r > 0x80);
        assert!(b < 0x40);
    }
}
