// Viewer window - Shows composed frames with winit + pixels
//
// Drives a compositor from a synthetic indexed frame so every effect can be
// tried interactively:
// - F1 cycles filter presets, F2 toggles phosphor
// - F3/F4 lower/raise scanline intensity
// - F5 selects a custom parameter, F6/F7 lower/raise it
// - F9 takes a snapshot, F10 logs the active effects

use super::frame::IndexedFrame;
use super::present::present_rgba;
use super::surface::{DisplayBackend, Rect, SoftwareBackend};
use crate::compositor::{Compositor, DisplayProperties};
use crate::config::CompositorConfig;
use crate::ntsc::{CompositeFilter, FilterParameter, SimpleComposite};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Compositor driven by the viewer
pub type ViewerCompositor<'p> = Compositor<'p, SoftwareBackend, SimpleComposite>;

/// Scanline intensity change per key press
const SCANLINE_STEP: i32 = 5;

/// Custom parameter change per key press
const PARAMETER_STEP: i32 = 5;

/// Viewer window configuration
#[derive(Debug, Clone, Copy)]
pub struct ViewerConfig {
    /// Indexed frame width in source pixels
    pub frame_width: u32,
    /// Indexed frame height in rows
    pub frame_height: u32,
    /// Scale factor applied to the 2x-wide image
    pub scale: u32,
    /// Target frame rate in Hz
    pub target_fps: u32,
    /// Whether to enable VSync
    pub vsync: bool,
}

impl ViewerConfig {
    /// Create a configuration with default values
    ///
    /// Default: 160x200 frame, 3x scale, 60 FPS, VSync enabled
    pub fn new() -> Self {
        Self {
            frame_width: 160,
            frame_height: 200,
            scale: 3,
            target_fps: 60,
            vsync: true,
        }
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.clamp(1, 8);
        self
    }

    /// Set the target frame rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Set VSync enabled or disabled
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Window width in pixels
    pub fn window_width(&self) -> u32 {
        2 * self.frame_width * self.scale
    }

    /// Window height in pixels
    pub fn window_height(&self) -> u32 {
        self.frame_height * self.scale
    }

    /// Get the frame duration for the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps as u64)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Window that renders a compositor's output
pub struct CompositorWindow<'p> {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    config: ViewerConfig,
    compositor: ViewerCompositor<'p>,
    frame: IndexedFrame,
    frame_count: u64,
    parameter: FilterParameter,
    shown_messages: usize,
    last_frame_time: Instant,
}

impl<'p> CompositorWindow<'p> {
    /// Create a viewer; the compositor is bound to the window geometry
    pub fn new(config: ViewerConfig, mut compositor: ViewerCompositor<'p>) -> Self {
        compositor.initialize(
            config.frame_width,
            config.frame_height,
            Rect::new(0, 0, config.window_width(), config.window_height()),
            &DisplayProperties::default(),
        );

        Self {
            window: None,
            pixels: None,
            config,
            compositor,
            frame: IndexedFrame::new(config.frame_width, config.frame_height),
            frame_count: 0,
            parameter: FilterParameter::Sharpness,
            shown_messages: 0,
            last_frame_time: Instant::now(),
        }
    }

    pub fn compositor(&self) -> &ViewerCompositor<'p> {
        &self.compositor
    }

    /// Give back the compositor, e.g. to persist its settings
    pub fn into_compositor(self) -> ViewerCompositor<'p> {
        self.compositor
    }

    /// Apply one control key
    ///
    /// # Returns
    /// `true` if the key is bound
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::F1 => {
                let next = self.compositor.config().tv.filter.next();
                self.compositor.set_filter_mode(next, true);
            }
            KeyCode::F2 => {
                let enable = !self.compositor.phosphor_enabled();
                self.compositor.set_phosphor(enable, -1);
                let state = if enable { "enabled" } else { "disabled" };
                self.compositor
                    .backend_mut()
                    .show_message(&format!("Phosphor effect {}", state));
            }
            KeyCode::F3 => {
                self.compositor.set_scanline_intensity(-SCANLINE_STEP, 0);
            }
            KeyCode::F4 => {
                self.compositor.set_scanline_intensity(SCANLINE_STEP, 0);
            }
            KeyCode::F5 => {
                self.parameter = self.parameter.next();
                let value = self.compositor.filter().parameters().get(self.parameter);
                self.compositor
                    .backend_mut()
                    .show_message(&format!("{} at {}%", self.parameter.name(), value));
            }
            KeyCode::F6 => {
                self.compositor
                    .adjust_filter_parameter(self.parameter, -PARAMETER_STEP);
            }
            KeyCode::F7 => {
                self.compositor
                    .adjust_filter_parameter(self.parameter, PARAMETER_STEP);
            }
            KeyCode::F9 => self.compositor.snapshot_requester().request(),
            KeyCode::F10 => log::info!("effects: {}", self.compositor.effects_info()),
            _ => return false,
        }
        true
    }

    /// Advance the synthetic frame and compose it
    fn step_frame(&mut self) {
        self.frame.moving_bar_pattern(self.frame_count);
        self.frame_count = self.frame_count.wrapping_add(1);
        self.compositor.render(&self.frame);
    }

    /// Present the composed surfaces to the window
    fn render(&mut self) -> Result<(), pixels::Error> {
        if let Some(pixels) = &mut self.pixels {
            let overlay = self
                .compositor
                .scanlines_enabled()
                .then(|| self.compositor.scanline_surface());

            present_rgba(
                self.compositor.image_surface(),
                overlay,
                pixels.frame_mut(),
                self.config.window_width(),
                self.config.window_height(),
            );

            pixels.render()?;
        }
        Ok(())
    }

    /// Put the newest status message into the title bar
    fn update_title(&mut self) {
        let backend = self.compositor.backend();
        if backend.message_count() == self.shown_messages {
            return;
        }
        self.shown_messages = backend.message_count();

        if let (Some(window), Some(message)) = (&self.window, backend.last_message()) {
            window.set_title(&format!("CRT Compositor - {}", message));
        }
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();

        if elapsed >= self.config.frame_duration() {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }
}

impl ApplicationHandler for CompositorWindow<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = (self.config.window_width(), self.config.window_height());
        let window_attributes = Window::default_attributes()
            .with_title(format!("CRT Compositor - {}x{}", width, height))
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());

        match Pixels::new(width, height, surface_texture) {
            Ok(pixels) => {
                self.window = Some(window);
                self.pixels = Some(pixels);
            }
            Err(err) => {
                log::error!("failed to create pixel buffer: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if self.handle_key(code) {
                    self.update_title();
                }
            }
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    self.step_frame();
                    self.update_title();
                    if let Err(err) = self.render() {
                        log::error!("render error: {}", err);
                        event_loop.exit();
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the viewer until the window is closed
///
/// # Arguments
/// * `config` - Viewer configuration
/// * `compositor` - Compositor with palette and snapshot sink installed
///
/// # Returns
/// The compositor's settings as they were when the window closed
pub fn run_viewer(
    config: ViewerConfig,
    compositor: ViewerCompositor<'_>,
) -> Result<CompositorConfig, Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    if config.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    let mut viewer = CompositorWindow::new(config, compositor);

    log::info!(
        "viewer: {}x{} frame in a {}x{} window at {} FPS (vsync {})",
        config.frame_width,
        config.frame_height,
        config.window_width(),
        config.window_height(),
        config.target_fps,
        config.vsync
    );
    log::info!("effects: {}", viewer.compositor().effects_info());

    event_loop.run_app(&mut viewer)?;

    Ok(viewer.into_compositor().config().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{hue_luma_palette, Surface};
    use crate::ntsc::NtscPreset;

    fn viewer(palette: &[u32]) -> CompositorWindow<'_> {
        let mut compositor = Compositor::new(
            SoftwareBackend::new(),
            SimpleComposite::new(),
            CompositorConfig::default(),
        );
        compositor.set_palette(palette, palette);
        CompositorWindow::new(ViewerConfig::new().with_scale(2), compositor)
    }

    #[test]
    fn test_viewer_config_defaults() {
        let config = ViewerConfig::new();
        assert_eq!(config.scale, 3);
        assert_eq!(config.target_fps, 60);
        assert!(config.vsync);
    }

    #[test]
    fn test_viewer_config_builder() {
        let config = ViewerConfig::new().with_scale(2).with_fps(30).with_vsync(false);

        assert_eq!(config.scale, 2);
        assert_eq!(config.target_fps, 30);
        assert!(!config.vsync);
        assert_eq!(config.window_width(), 640);
        assert_eq!(config.window_height(), 400);
    }

    #[test]
    fn test_scale_clamping() {
        assert_eq!(ViewerConfig::new().with_scale(100).scale, 8);
        assert_eq!(ViewerConfig::new().with_scale(0).scale, 1);
    }

    #[test]
    fn test_frame_duration() {
        let duration = ViewerConfig::new().with_fps(60).frame_duration();
        assert_eq!(duration.as_micros(), 16666);
    }

    #[test]
    fn test_viewer_initializes_compositor() {
        let palette = hue_luma_palette();
        let viewer = viewer(&palette);
        let image = viewer.compositor().image_surface();
        assert_eq!(image.dst_rect(), Rect::new(0, 0, 640, 400));
        assert_eq!(image.src_rect().width, 320);
    }

    #[test]
    fn test_keys_drive_compositor() {
        let palette = hue_luma_palette();
        let mut viewer = viewer(&palette);

        assert!(viewer.handle_key(KeyCode::F1));
        assert_eq!(viewer.compositor().config().tv.filter, NtscPreset::Rgb);
        assert!(viewer.compositor().mode().is_ntsc());

        assert!(viewer.handle_key(KeyCode::F4));
        assert_eq!(viewer.compositor().scanline_intensity(), 30);

        assert!(viewer.handle_key(KeyCode::F2));
        assert!(viewer.compositor().phosphor_enabled());
        assert_eq!(
            viewer.compositor().backend().last_message(),
            Some("Phosphor effect enabled")
        );

        assert!(viewer.handle_key(KeyCode::F7));
        assert_eq!(viewer.compositor().config().tv.filter, NtscPreset::Custom);
        assert_eq!(viewer.compositor().config().tv.custom.sharpness, 55);

        let count = viewer.compositor().backend().message_count();
        assert!(viewer.handle_key(KeyCode::F5));
        assert_eq!(viewer.compositor().backend().message_count(), count + 1);
        assert_eq!(
            viewer.compositor().backend().last_message(),
            Some("Resolution at 50%")
        );

        assert!(!viewer.handle_key(KeyCode::KeyA));
    }

    #[test]
    fn test_step_frame_renders() {
        let palette = hue_luma_palette();
        let mut viewer = viewer(&palette);
        viewer.step_frame();
        viewer.step_frame();
        assert_eq!(viewer.compositor().image_surface().render_count(), 2);
    }
}
