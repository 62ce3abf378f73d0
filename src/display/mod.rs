// Display module - Pixel data, surfaces and presentation
//
// This module provides:
// - Palette views and packed-color helpers
// - Indexed source frames and RGB frame buffers
// - The surface/backend contract plus an in-memory backend
// - Window presentation using winit + pixels

pub mod frame;
pub mod framebuffer;
pub mod palette;
pub mod present;
pub mod surface;
pub mod window;

pub use frame::{FrameSource, IndexedFrame};
pub use framebuffer::RgbFrameBuffer;
pub use palette::{
    hue_luma_palette, pack_channels, split_channels, Palette, PALETTE_SIZE,
};
pub use present::present_rgba;
pub use surface::{
    DisplayBackend, Rect, SoftwareBackend, SoftwareSurface, Surface, SurfaceAttributes,
};
pub use window::{run_viewer, CompositorWindow, ViewerCompositor, ViewerConfig};
