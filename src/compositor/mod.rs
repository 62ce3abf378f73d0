// Compositor - Indexed frames to displayable RGB
//
// This module provides:
// - Four rendering modes (normal, phosphor, NTSC, NTSC + phosphor)
// - Phosphor persistence through a precomputed blend table
// - A scanline overlay surface blended over the image
// - Snapshot rendering that matches what is on screen
//
// All state is owned by the render thread. Only the snapshot request flag
// is shared with other threads.

mod mode;
mod phosphor;
mod render;

pub use mode::FilterMode;
pub use phosphor::{average_rgb, PhosphorTable};

use crate::capture::{SnapshotRequest, SnapshotSink};
use crate::config::{CompositorConfig, PhosphorMode};
use crate::display::{DisplayBackend, Palette, Rect, RgbFrameBuffer, Surface};
use crate::ntsc::{CompositeFilter, FilterParameter, NtscPreset};

/// Widest indexed frame the compositor accepts
pub const MAX_FRAME_WIDTH: u32 = 160;

/// Tallest indexed frame the compositor accepts
pub const MAX_FRAME_HEIGHT: u32 = 320;

/// Phosphor blend used until one is configured
pub const DEFAULT_PHOSPHOR_BLEND: u32 = 60;

/// Per-game display properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayProperties {
    /// Enable phosphor for this game
    pub phosphor: bool,
    /// Blend percentage; negative keeps the current value
    pub phosphor_blend: i32,
}

impl Default for DisplayProperties {
    fn default() -> Self {
        Self {
            phosphor: false,
            phosphor_blend: DEFAULT_PHOSPHOR_BLEND as i32,
        }
    }
}

/// Number of scanline overlay rows to show for an output height
///
/// Each source row should get one transparent and one opaque overlay row.
/// The scale factor is rounded to an integer first, so under non-integral
/// scaling the stripes only approximately follow the source rows.
pub fn scanline_rows(output_height: u32, source_height: u32) -> u32 {
    if output_height == 0 || source_height == 0 {
        return 0;
    }

    let scale = (output_height as f32 / source_height as f32 + 0.5)
        .floor()
        .max(1.0);
    2 * (output_height as f32 / scale) as u32
}

/// Video compositor
///
/// Borrows the palette manager's tables for `'p`; owns its surfaces, the
/// composed-frame buffers and the phosphor blend table.
pub struct Compositor<'p, B: DisplayBackend, F: CompositeFilter> {
    backend: B,
    filter: F,
    config: CompositorConfig,

    /// Main image
    image: B::Surface,
    /// 1-pixel-wide alternating transparent/opaque rows
    scanlines: B::Surface,
    /// Fixed 2x-wide view used for native-size snapshots
    base: B::Surface,

    palette: Palette<'p>,
    mode: FilterMode,
    phosphor_blend: u32,
    table: PhosphorTable,
    scanlines_enabled: bool,

    /// Most recent composed frame
    current: RgbFrameBuffer,
    /// Copy of `current` taken just before a snapshot frame overwrites it
    previous: RgbFrameBuffer,

    frame_width: u32,
    frame_height: u32,

    snapshot: SnapshotRequest,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl<'p, B, F> Compositor<'p, B, F>
where
    B: DisplayBackend,
    F: CompositeFilter,
{
    /// Create a compositor
    ///
    /// Surfaces and buffers are sized for the largest supported frame,
    /// including the composite filter's wider output.
    pub fn new(mut backend: B, mut filter: F, config: CompositorConfig) -> Self {
        let ntsc_width = filter.out_width(MAX_FRAME_WIDTH as usize) as u32;
        let surface_width = ntsc_width.max(2 * MAX_FRAME_WIDTH);

        let image = backend.allocate_surface(surface_width, MAX_FRAME_HEIGHT, None);

        let scan_height = MAX_FRAME_HEIGHT * 2;
        let scan_data: Vec<u32> = (0..scan_height)
            .map(|row| if row % 2 == 0 { 0x0000_0000 } else { 0xFF00_0000 })
            .collect();
        let scanlines = backend.allocate_surface(1, scan_height, Some(&scan_data));

        let base = backend.allocate_surface(2 * MAX_FRAME_WIDTH, MAX_FRAME_HEIGHT, None);

        let capacity = surface_width as usize * MAX_FRAME_HEIGHT as usize;
        filter.set_parameters(config.tv.custom);

        Self {
            backend,
            filter,
            config,
            image,
            scanlines,
            base,
            palette: Palette::default(),
            mode: FilterMode::Normal,
            phosphor_blend: DEFAULT_PHOSPHOR_BLEND,
            table: PhosphorTable::new(),
            scanlines_enabled: false,
            current: RgbFrameBuffer::new(capacity),
            previous: RgbFrameBuffer::new(capacity),
            frame_width: MAX_FRAME_WIDTH,
            frame_height: MAX_FRAME_HEIGHT,
            snapshot: SnapshotRequest::new(),
            sink: None,
        }
    }

    /// Bind the surfaces to the output rectangle and apply persisted settings
    ///
    /// # Arguments
    /// * `frame_width` - Source frame width in indexed pixels
    /// * `frame_height` - Source frame height in rows
    /// * `image` - Where the image lands on screen
    /// * `properties` - Per-game phosphor settings
    pub fn initialize(
        &mut self,
        frame_width: u32,
        frame_height: u32,
        image: Rect,
        properties: &DisplayProperties,
    ) {
        self.frame_width = frame_width.min(MAX_FRAME_WIDTH);
        self.frame_height = frame_height.min(MAX_FRAME_HEIGHT);

        for surface in [&mut self.image, &mut self.scanlines] {
            surface.set_dst_pos(image.x, image.y);
            surface.set_dst_size(image.width, image.height);
        }

        let (enable, blend) = match self.config.tv.phosphor {
            PhosphorMode::Always => (true, self.config.tv.phosphor_blend as i32),
            PhosphorMode::ByRom => (properties.phosphor, properties.phosphor_blend),
        };
        self.set_phosphor(enable, blend);

        self.set_filter_mode(self.config.tv.filter, false);

        self.scanlines
            .set_src_size(1, scanline_rows(image.height, self.frame_height));

        log::debug!(
            "compositor initialized: {}x{} frame into {:?}, {:?}",
            self.frame_width,
            self.frame_height,
            image,
            self.mode
        );
    }

    /// Install the palette manager's tables
    ///
    /// Both composed buffers are cleared; colors from the old palette must
    /// not persist.
    pub fn set_palette(&mut self, indexed: &'p [u32], raw: &'p [u32]) {
        self.palette = Palette::new(indexed, raw);
        self.filter.set_palette(raw);
        self.clear_buffers();
    }

    /// Select a composite filter preset (`Off` disables NTSC filtering)
    ///
    /// The choice is persisted. With `announce` set, a status message is
    /// shown.
    pub fn set_filter_mode(&mut self, preset: NtscPreset, announce: bool) {
        let message = if preset == NtscPreset::Off {
            self.enable_ntsc(false);
            "TV filtering disabled".to_string()
        } else {
            self.enable_ntsc(true);
            let label = self.filter.set_preset(preset);
            format!("TV filtering ({} mode)", label)
        };
        self.config.tv.filter = preset;
        log::debug!("filter preset {:?}, mode {:?}", preset, self.mode);

        if announce {
            self.backend.show_message(&message);
        }
    }

    /// Enable or disable phosphor persistence
    ///
    /// A negative `blend` keeps the current percentage. Nothing happens if
    /// neither the switch nor the effective percentage changes; otherwise the
    /// composed buffers are cleared and, when enabling, the blend table is
    /// rebuilt.
    pub fn set_phosphor(&mut self, enable: bool, blend: i32) {
        let percent = if blend >= 0 {
            (blend as u32).min(100)
        } else {
            self.phosphor_blend
        };

        if self.mode.is_phosphor() == enable && self.phosphor_blend == percent {
            return;
        }

        self.phosphor_blend = percent;
        self.mode = self.mode.with_phosphor(enable);
        self.clear_buffers();

        if enable {
            self.table.rebuild(percent);
        }
        log::debug!("phosphor {} at {}%", if enable { "on" } else { "off" }, percent);
    }

    /// Change the scanline intensity
    ///
    /// A zero `relative` sets the intensity to `absolute`; anything else
    /// adjusts the current value. The result is clamped to 0-100, applied,
    /// persisted and announced.
    ///
    /// # Returns
    /// The new intensity, or `None` when NTSC filtering is off (scanlines
    /// are unavailable and nothing changes)
    pub fn set_scanline_intensity(&mut self, relative: i32, absolute: u32) -> Option<u32> {
        if !self.mode.is_ntsc() {
            self.backend
                .show_message("Scanlines only available in TV filtering mode");
            return None;
        }

        let intensity = self.enable_scanlines(relative, absolute);
        self.config.tv.scanlines = intensity;
        self.backend
            .show_message(&format!("Scanline intensity at {}%", intensity));

        Some(intensity)
    }

    /// Adjust one custom-preset parameter and switch to the custom preset
    ///
    /// # Returns
    /// The new parameter value, or `None` when NTSC filtering is off
    pub fn adjust_filter_parameter(&mut self, parameter: FilterParameter, delta: i32) -> Option<u32> {
        if !self.mode.is_ntsc() {
            self.backend
                .show_message("Adjustments only available in TV filtering mode");
            return None;
        }

        let mut parameters = self.filter.parameters();
        let value = (parameters.get(parameter) as i64 + delta as i64).clamp(0, 100) as u32;
        parameters.set(parameter, value);

        self.filter.set_parameters(parameters);
        self.config.tv.custom = parameters;
        if self.config.tv.filter != NtscPreset::Custom {
            self.set_filter_mode(NtscPreset::Custom, false);
        }

        self.backend
            .show_message(&format!("{} at {}%", parameter.name(), value));
        Some(value)
    }

    /// One-line summary of the active effects
    pub fn effects_info(&self) -> String {
        let alpha = self.scanlines.attributes().blend_alpha;
        let inter = if self.image.attributes().smoothing {
            "inter"
        } else {
            "nointer"
        };

        match self.mode {
            FilterMode::Normal => "Disabled, normal mode".to_string(),
            FilterMode::Phosphor => "Disabled, phosphor mode".to_string(),
            FilterMode::NtscNormal => format!(
                "{}, scanlines={}/{}",
                self.filter.preset_name(),
                alpha,
                inter
            ),
            FilterMode::NtscPhosphor => format!(
                "{}, phosphor, scanlines={}/{}",
                self.filter.preset_name(),
                alpha,
                inter
            ),
        }
    }

    /// Display color of an indexed pixel with a palette shift
    pub fn map_indexed_pixel(&self, index: u8, shift: u8) -> u32 {
        self.palette.lookup_shifted(index, shift)
    }

    /// Handle other threads use to request a snapshot
    pub fn snapshot_requester(&self) -> SnapshotRequest {
        self.snapshot.clone()
    }

    /// Install the sink captured snapshots are handed to
    pub fn set_snapshot_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sink = Some(sink);
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn phosphor_enabled(&self) -> bool {
        self.mode.is_phosphor()
    }

    pub fn phosphor_blend(&self) -> u32 {
        self.phosphor_blend
    }

    /// Blend table, once it has been computed
    pub fn phosphor_table(&self) -> Option<&PhosphorTable> {
        self.table.is_fresh().then_some(&self.table)
    }

    pub fn scanlines_enabled(&self) -> bool {
        self.scanlines_enabled
    }

    pub fn scanline_intensity(&self) -> u32 {
        self.scanlines.attributes().blend_alpha
    }

    pub fn image_surface(&self) -> &B::Surface {
        &self.image
    }

    pub fn scanline_surface(&self) -> &B::Surface {
        &self.scanlines
    }

    /// Composed frame written by the last phosphor render
    pub fn composed_frame(&self) -> &[u32] {
        self.current.as_slice()
    }

    /// Composed frame preceding the last snapshot frame
    pub fn previous_frame(&self) -> &[u32] {
        self.previous.as_slice()
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Frame geometry as of the last `initialize` or `render`
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    fn enable_ntsc(&mut self, enable: bool) {
        self.mode = self.mode.with_ntsc(enable);
        self.update_image_src_size();

        self.image.attributes_mut().smoothing = self.config.tv.smoothing;
        self.image.apply_attributes();

        let intensity = self.config.tv.scanlines.min(100);
        self.scanlines_enabled = enable && intensity > 0;
        let attributes = self.scanlines.attributes_mut();
        attributes.smoothing = true;
        attributes.blending = self.scanlines_enabled;
        attributes.blend_alpha = intensity;
        self.scanlines.apply_attributes();

        self.clear_buffers();
    }

    fn enable_scanlines(&mut self, relative: i32, absolute: u32) -> u32 {
        let attributes = self.scanlines.attributes_mut();
        let intensity = if relative == 0 {
            absolute as i64
        } else {
            attributes.blend_alpha as i64 + relative as i64
        };
        let intensity = intensity.clamp(0, 100) as u32;

        attributes.blend_alpha = intensity;
        attributes.blending = intensity > 0;
        self.scanlines.apply_attributes();
        self.scanlines_enabled = intensity > 0;

        log::debug!("scanline intensity {}%", intensity);
        intensity
    }

    /// Image width in surface pixels for the current mode and geometry
    fn image_width(&self) -> u32 {
        if self.mode.is_ntsc() {
            self.filter.out_width(self.frame_width as usize) as u32
        } else {
            2 * self.frame_width
        }
    }

    fn update_image_src_size(&mut self) {
        let width = self.image_width();
        self.image.set_src_size(width, self.frame_height);
    }

    /// Track frame geometry changes between renders
    ///
    /// Persistence history laid out for the old geometry is dropped.
    fn update_geometry(&mut self, width: u32, height: u32) {
        if width != self.frame_width || height != self.frame_height {
            log::debug!("frame geometry changed to {}x{}", width, height);
            self.frame_width = width;
            self.frame_height = height;
            self.update_image_src_size();
            self.clear_buffers();
        }
    }

    fn clear_buffers(&mut self) {
        self.current.clear();
        self.previous.clear();
    }
}
