// Configuration management
//
// Persisted TV-effect and snapshot settings. The compositor owns the live
// copy and updates it as settings change; the application saves it.

use crate::ntsc::{FilterParameters, NtscPreset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file path
pub const CONFIG_FILE: &str = "crt_config.toml";

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Compositor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// TV effects
    pub tv: TvSettings,

    /// Snapshot settings
    pub snapshot: SnapshotSettings,
}

/// When phosphor persistence is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhosphorMode {
    /// Always on, using the global blend
    Always,
    /// Decided per game
    #[default]
    ByRom,
}

/// TV effect settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvSettings {
    /// Composite filter preset
    pub filter: NtscPreset,

    /// Phosphor policy
    pub phosphor: PhosphorMode,

    /// Global phosphor blend in percent
    pub phosphor_blend: u32,

    /// Scanline intensity in percent (0 disables the overlay)
    pub scanlines: u32,

    /// Interpolate the image when scaling
    pub smoothing: bool,

    /// Custom preset parameters
    pub custom: FilterParameters,
}

impl Default for TvSettings {
    fn default() -> Self {
        Self {
            filter: NtscPreset::Off,
            phosphor: PhosphorMode::ByRom,
            phosphor_blend: 50,
            scanlines: 25,
            smoothing: true,
            custom: FilterParameters::default(),
        }
    }
}

/// Snapshot settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// Snapshot directory
    pub directory: PathBuf,

    /// Save the fixed 2x-wide view instead of the on-screen image
    pub native_size: bool,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("snapshots"),
            native_size: false,
            include_timestamp: true,
        }
    }
}

impl CompositorConfig {
    /// Load configuration from `path`, or fall back to defaults
    ///
    /// When loading fails the defaults are written back to `path`; a failure
    /// to write is logged and otherwise ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::debug!("using default configuration ({}): {}", path.display(), err);
                let config = Self::default();
                if let Err(err) = config.save(path) {
                    log::warn!("could not write {}: {}", path.display(), err);
                }
                config
            }
        }
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
