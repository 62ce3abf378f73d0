// CRT Compositor Library
// Video post-processing for indexed framebuffers: palette lookup, phosphor
// persistence, composite filtering, scanlines and snapshots

// Public modules
pub mod capture;
pub mod compositor;
pub mod config;
pub mod display;
pub mod ntsc;

// Re-export main types for convenience
pub use capture::{PngSnapshotWriter, SnapshotError, SnapshotImage, SnapshotRequest, SnapshotSink};
pub use compositor::{
    Compositor, DisplayProperties, FilterMode, PhosphorTable, MAX_FRAME_HEIGHT, MAX_FRAME_WIDTH,
};
pub use config::{CompositorConfig, ConfigError, PhosphorMode};
pub use display::{
    DisplayBackend, FrameSource, IndexedFrame, Palette, Rect, SoftwareBackend, Surface,
    ViewerConfig,
};
pub use ntsc::{CompositeFilter, FilterParameter, FilterParameters, NtscPreset, SimpleComposite};
