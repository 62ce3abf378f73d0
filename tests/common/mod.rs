// Common test utilities for compositor integration tests
//
// This module provides a deterministic composite filter and snapshot sinks
// that record what the compositor hands them.

#![allow(dead_code)]

use crt_compositor::capture::{SnapshotError, SnapshotImage, SnapshotSink};
use crt_compositor::compositor::PhosphorTable;
use crt_compositor::config::CompositorConfig;
use crt_compositor::display::{pack_channels, SoftwareBackend};
use crt_compositor::ntsc::{CompositeFilter, FilterParameters, NtscPreset, PhosphorInput};
use crt_compositor::Compositor;
use std::sync::{Arc, Mutex};

/// Output pixels the test filter writes per source pixel
pub const FILTER_SCALE: usize = 3;

/// Compositor under test
pub type TestCompositor<'p> = Compositor<'p, SoftwareBackend, TripleFilter>;

/// Composite filter that repeats each source pixel three times
///
/// No convolution, so edge behavior is exact and outputs can be predicted.
#[derive(Debug, Default)]
pub struct TripleFilter {
    palette: Vec<u32>,
    preset: Option<NtscPreset>,
    parameters: FilterParameters,
    pub renders: usize,
    pub palette_updates: usize,
}

impl CompositeFilter for TripleFilter {
    fn out_width(&self, in_width: usize) -> usize {
        in_width * FILTER_SCALE
    }

    fn set_palette(&mut self, raw: &[u32]) {
        self.palette = raw.to_vec();
        self.palette_updates += 1;
    }

    fn set_preset(&mut self, preset: NtscPreset) -> String {
        self.preset = Some(preset);
        self.preset_name()
    }

    fn preset_name(&self) -> String {
        self.preset.map(|p| p.name()).unwrap_or("NONE").to_string()
    }

    fn parameters(&self) -> FilterParameters {
        self.parameters
    }

    fn set_parameters(&mut self, parameters: FilterParameters) {
        self.parameters = parameters;
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
        self.renders += 1;
        for y in 0..height {
            for ox in 0..width * FILTER_SCALE {
                let index = input[y * width + ox / FILTER_SCALE] as usize;
                let color = self.palette.get(index).copied().unwrap_or(0);
                let at = y * out_pitch + ox;

                out[at] = match phosphor.as_mut() {
                    Some(persist) => {
                        let blended = persist.table.blend_rgb(color, persist.buffer[at]);
                        persist.buffer[at] = blended;
                        blended
                    }
                    None => color,
                };
            }
        }
    }
}

/// Sink that keeps every image it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    images: Arc<Mutex<Vec<SnapshotImage>>>,
}

impl RecordingSink {
    /// Images saved so far, oldest first
    pub fn images(&self) -> Vec<SnapshotImage> {
        self.images.lock().expect("sink lock").clone()
    }
}

impl SnapshotSink for RecordingSink {
    fn save_snapshot(&mut self, image: &SnapshotImage) -> Result<String, SnapshotError> {
        let mut images = self.images.lock().expect("sink lock");
        images.push(image.clone());
        Ok(format!("memory #{}", images.len()))
    }
}

/// Sink that always fails
pub struct FailingSink;

impl SnapshotSink for FailingSink {
    fn save_snapshot(&mut self, _image: &SnapshotImage) -> Result<String, SnapshotError> {
        Err(SnapshotError::NoImage)
    }
}

/// 256-entry palette: index 0 black, index i = (i, 2i, 255 - i)
pub fn test_palette() -> Vec<u32> {
    (0..256u32)
        .map(|i| {
            if i == 0 {
                0
            } else {
                pack_channels(i as u8, (i * 2) as u8, 255 - i as u8)
            }
        })
        .collect()
}

/// Build a compositor with default settings and `palette` installed
pub fn compositor(palette: &[u32]) -> TestCompositor<'_> {
    compositor_with_config(palette, CompositorConfig::default())
}

/// Build a compositor with explicit settings and `palette` installed
pub fn compositor_with_config(palette: &[u32], config: CompositorConfig) -> TestCompositor<'_> {
    let mut compositor = Compositor::new(SoftwareBackend::new(), TripleFilter::default(), config);
    compositor.set_palette(palette, palette);
    compositor
}

/// Table built at `percent`, for computing expected blends
pub fn table(percent: u32) -> PhosphorTable {
    let mut table = PhosphorTable::new();
    table.rebuild(percent);
    table
}
