// Display surfaces - Contract with the display backend
//
// A surface is a block of 0xRRGGBB pixels with a source rectangle (the part
// of the pixel data that is shown) and a destination rectangle (where it is
// drawn on screen). The compositor writes pixels directly, then asks the
// surface to render.
//
// `SoftwareBackend` keeps everything in memory. It backs the tests and the
// viewer, which scales the surfaces into the window with `present_rgba`.

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Drawing attributes of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceAttributes {
    /// Interpolate when scaling
    pub smoothing: bool,
    /// Alpha-blend over whatever was drawn before
    pub blending: bool,
    /// Blend strength in percent (0-100)
    pub blend_alpha: u32,
}

/// A drawable pixel surface owned by the display backend
pub trait Surface {
    /// Pixel data, `pitch` pixels per row
    fn pixels(&self) -> &[u32];

    /// Mutable pixel data, `pitch` pixels per row
    fn pixels_mut(&mut self) -> &mut [u32];

    /// Row stride in pixels
    fn pitch(&self) -> usize;

    /// Allocated height in rows
    fn height(&self) -> usize;

    /// Part of the pixel data that is shown
    fn src_rect(&self) -> Rect;

    /// Where the source rectangle lands on screen
    fn dst_rect(&self) -> Rect;

    fn set_src_size(&mut self, width: u32, height: u32);

    fn set_dst_pos(&mut self, x: u32, y: u32);

    fn set_dst_size(&mut self, width: u32, height: u32);

    fn attributes(&self) -> &SurfaceAttributes;

    fn attributes_mut(&mut self) -> &mut SurfaceAttributes;

    /// Push changed attributes to the backend
    fn apply_attributes(&mut self);

    /// Draw the surface; returns false if nothing was drawn
    fn render(&mut self) -> bool;
}

/// Allocates surfaces and shows on-screen messages
pub trait DisplayBackend {
    type Surface: Surface;

    /// Allocate a `width * height` surface, optionally initialised from `data`
    fn allocate_surface(&mut self, width: u32, height: u32, data: Option<&[u32]>)
        -> Self::Surface;

    /// Show a short status message to the user
    fn show_message(&mut self, message: &str);
}

/// In-memory surface
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    src: Rect,
    dst: Rect,
    attributes: SurfaceAttributes,
    applied: SurfaceAttributes,
    render_count: u64,
}

impl SoftwareSurface {
    /// Create a surface; source and destination start out covering it all
    pub fn new(width: u32, height: u32, data: Option<&[u32]>) -> Self {
        let mut pixels = vec![0; width as usize * height as usize];
        if let Some(data) = data {
            let len = data.len().min(pixels.len());
            pixels[..len].copy_from_slice(&data[..len]);
        }

        let full = Rect::new(0, 0, width, height);
        Self {
            pixels,
            width,
            height,
            src: full,
            dst: full,
            attributes: SurfaceAttributes::default(),
            applied: SurfaceAttributes::default(),
            render_count: 0,
        }
    }

    /// Allocated width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Attributes as of the last `apply_attributes`
    pub fn applied_attributes(&self) -> &SurfaceAttributes {
        &self.applied
    }

    /// Number of times `render` has been called
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Pixel at (x, y) of the allocated area
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

impl Surface for SoftwareSurface {
    fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    fn pitch(&self) -> usize {
        self.width as usize
    }

    fn height(&self) -> usize {
        self.height as usize
    }

    fn src_rect(&self) -> Rect {
        self.src
    }

    fn dst_rect(&self) -> Rect {
        self.dst
    }

    fn set_src_size(&mut self, width: u32, height: u32) {
        self.src.width = width.min(self.width);
        self.src.height = height.min(self.height);
    }

    fn set_dst_pos(&mut self, x: u32, y: u32) {
        self.dst.x = x;
        self.dst.y = y;
    }

    fn set_dst_size(&mut self, width: u32, height: u32) {
        self.dst.width = width;
        self.dst.height = height;
    }

    fn attributes(&self) -> &SurfaceAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut SurfaceAttributes {
        &mut self.attributes
    }

    fn apply_attributes(&mut self) {
        self.applied = self.attributes;
    }

    fn render(&mut self) -> bool {
        self.render_count += 1;
        true
    }
}

/// Backend that keeps surfaces in memory and records messages
///
/// Only the newest message is kept, alongside a count of every message
/// shown, so a long-running viewer holds a fixed amount of text.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    last_message: Option<String>,
    message_count: usize,
}

impl SoftwareBackend {
    /// Create a backend with no messages
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages shown so far
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Most recent message
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

impl DisplayBackend for SoftwareBackend {
    type Surface = SoftwareSurface;

    fn allocate_surface(
        &mut self,
        width: u32,
        height: u32,
        data: Option<&[u32]>,
    ) -> SoftwareSurface {
        SoftwareSurface::new(width, height, data)
    }

    fn show_message(&mut self, message: &str) {
        log::info!("{}", message);
        self.message_count += 1;
        match &mut self.last_message {
            Some(last) => {
                last.clear();
                last.push_str(message);
            }
            None => self.last_message = Some(message.to_string()),
        }
    }
}
