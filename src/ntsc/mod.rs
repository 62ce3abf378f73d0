// Composite (NTSC) filter - Contract and presets
//
// The compositor hands whole indexed frames to a composite filter, which
// simulates analog video artifacts and writes RGB rows into the image
// surface. The filter derives its own palette from the raw RGB table.
//
// When phosphor is enabled the filter also receives the persistence buffer
// and the shared blend table, and updates the buffer in place.

mod composite;

pub use composite::SimpleComposite;

use crate::compositor::PhosphorTable;
use serde::{Deserialize, Serialize};

/// Filter preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NtscPreset {
    /// No composite filtering
    #[default]
    Off,
    /// Clean RGB output
    Rgb,
    /// Separate luma and chroma
    SVideo,
    /// Composite video
    Composite,
    /// Badly adjusted composite
    Bad,
    /// User-adjusted parameters
    Custom,
}

impl NtscPreset {
    /// Human-readable label
    pub fn name(&self) -> &'static str {
        match self {
            NtscPreset::Off => "OFF",
            NtscPreset::Rgb => "RGB",
            NtscPreset::SVideo => "S-VIDEO",
            NtscPreset::Composite => "COMPOSITE",
            NtscPreset::Bad => "BAD ADJUST",
            NtscPreset::Custom => "CUSTOM",
        }
    }

    /// Cycle to the next preset
    pub fn next(&self) -> Self {
        match self {
            NtscPreset::Off => NtscPreset::Rgb,
            NtscPreset::Rgb => NtscPreset::SVideo,
            NtscPreset::SVideo => NtscPreset::Composite,
            NtscPreset::Composite => NtscPreset::Bad,
            NtscPreset::Bad => NtscPreset::Custom,
            NtscPreset::Custom => NtscPreset::Off,
        }
    }
}

/// One adjustable parameter of the custom preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterParameter {
    Sharpness,
    Resolution,
    Artifacts,
    Fringing,
    Bleed,
}

impl FilterParameter {
    pub fn name(&self) -> &'static str {
        match self {
            FilterParameter::Sharpness => "Sharpness",
            FilterParameter::Resolution => "Resolution",
            FilterParameter::Artifacts => "Artifacts",
            FilterParameter::Fringing => "Fringing",
            FilterParameter::Bleed => "Bleed",
        }
    }

    /// Cycle to the next parameter
    pub fn next(&self) -> Self {
        match self {
            FilterParameter::Sharpness => FilterParameter::Resolution,
            FilterParameter::Resolution => FilterParameter::Artifacts,
            FilterParameter::Artifacts => FilterParameter::Fringing,
            FilterParameter::Fringing => FilterParameter::Bleed,
            FilterParameter::Bleed => FilterParameter::Sharpness,
        }
    }
}

/// Custom preset parameters, each in percent (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    pub sharpness: u32,
    pub resolution: u32,
    pub artifacts: u32,
    pub fringing: u32,
    pub bleed: u32,
}

impl FilterParameters {
    /// Read one parameter
    pub fn get(&self, parameter: FilterParameter) -> u32 {
        match parameter {
            FilterParameter::Sharpness => self.sharpness,
            FilterParameter::Resolution => self.resolution,
            FilterParameter::Artifacts => self.artifacts,
            FilterParameter::Fringing => self.fringing,
            FilterParameter::Bleed => self.bleed,
        }
    }

    /// Write one parameter, clamped to 0-100
    pub fn set(&mut self, parameter: FilterParameter, value: u32) {
        let value = value.min(100);
        match parameter {
            FilterParameter::Sharpness => self.sharpness = value,
            FilterParameter::Resolution => self.resolution = value,
            FilterParameter::Artifacts => self.artifacts = value,
            FilterParameter::Fringing => self.fringing = value,
            FilterParameter::Bleed => self.bleed = value,
        }
    }
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            sharpness: 50,
            resolution: 50,
            artifacts: 50,
            fringing: 50,
            bleed: 50,
        }
    }
}

/// Persistence state passed to the filter in phosphor mode
///
/// `buffer` uses the same row stride as the output surface.
pub struct PhosphorInput<'a> {
    pub buffer: &'a mut [u32],
    pub table: &'a PhosphorTable,
}

/// Composite video filter
pub trait CompositeFilter {
    /// Output width in pixels for an input row of `in_width` source pixels
    fn out_width(&self, in_width: usize) -> usize;

    /// Install the raw RGB palette the filter derives its own colors from
    fn set_palette(&mut self, raw: &[u32]);

    /// Select a preset; returns the label to show the user
    fn set_preset(&mut self, preset: NtscPreset) -> String;

    /// Label of the active preset
    fn preset_name(&self) -> String;

    /// Parameters used by the custom preset
    fn parameters(&self) -> FilterParameters;

    fn set_parameters(&mut self, parameters: FilterParameters);

    /// Convert one indexed frame into RGB rows of `out_pitch` pixels
    fn render(
        &mut self,
        input: &[u8],
        width: usize,
        height: usize,
        out: &mut [u32],
        out_pitch: usize,
        phosphor: Option<PhosphorInput<'_>>,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_cycle_returns_to_off() {
        let mut preset = NtscPreset::Off;
        for _ in 0..6 {
            preset = preset.next();
        }
        assert_eq!(preset, NtscPreset::Off);
        assert_eq!(NtscPreset::Off.next(), NtscPreset::Rgb);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(NtscPreset::Composite.name(), "COMPOSITE");
        assert_eq!(NtscPreset::Bad.name(), "BAD ADJUST");
    }

    #[test]
    fn test_parameters_set_clamps() {
        let mut parameters = FilterParameters::default();
        parameters.set(FilterParameter::Bleed, 250);
        assert_eq!(parameters.get(FilterParameter::Bleed), 100);
        parameters.set(FilterParameter::Sharpness, 10);
        assert_eq!(parameters.sharpness, 10);
    }

    #[test]
    fn test_parameter_cycle() {
        assert_eq!(FilterParameter::Bleed.next(), FilterParameter::Sharpness);
        assert_eq!(FilterParameter::Sharpness.next(), FilterParameter::Resolution);
    }
}
