// Compositor rendering - Per-frame composition and snapshots
//
// Layouts written per mode:
// - Normal / Phosphor: each source pixel fills two adjacent image columns
// - NtscNormal / NtscPhosphor: the composite filter writes `out_width` columns
//
// In phosphor mode the current composed buffer holds the last blended frame.
// Phosphor keeps it one entry per source pixel (`y * width + x`); the NTSC
// variant uses the image pitch as row stride.

use super::{average_rgb, Compositor, FilterMode};
use crate::capture::SnapshotImage;
use crate::display::{DisplayBackend, FrameSource, Surface};
use crate::ntsc::{CompositeFilter, PhosphorInput};

impl<'p, B, F> Compositor<'p, B, F>
where
    B: DisplayBackend,
    F: CompositeFilter,
{
    /// Compose one frame and draw the surfaces
    ///
    /// A pending snapshot request is consumed here; the snapshot is taken
    /// after the frame has been composed.
    ///
    /// # Panics
    /// Panics if the frame is larger than `MAX_FRAME_WIDTH` x
    /// `MAX_FRAME_HEIGHT` or its buffer is shorter than `width * height`
    pub fn render<S: FrameSource + ?Sized>(&mut self, frame: &S) {
        let save_snapshot = self.snapshot.take();
        self.render_frame(frame, save_snapshot);

        if save_snapshot {
            self.take_snapshot(frame);
        }
    }

    /// Fill the image surface with a snapshot-quality version of the frame
    ///
    /// Non-phosphor modes simply re-render. Phosphor modes show the plain
    /// average of the last two composed frames, which reads better in a
    /// still image than the weighted on-screen blend.
    pub fn render_for_snapshot<S: FrameSource + ?Sized>(&mut self, frame: &S) {
        self.snapshot.clear();

        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let pitch = self.image.pitch();

        match self.mode {
            FilterMode::Normal | FilterMode::NtscNormal => {
                self.render_frame(frame, false);
                return;
            }
            FilterMode::Phosphor => {
                let out = self.image.pixels_mut();
                let current = self.current.as_slice();
                let previous = self.previous.as_slice();

                for y in 0..height {
                    let composed = y * width;
                    let out_row = &mut out[y * pitch..][..2 * width];
                    for (x, pair) in out_row.chunks_exact_mut(2).enumerate() {
                        let color = average_rgb(current[composed + x], previous[composed + x]);
                        pair[0] = color;
                        pair[1] = color;
                    }
                }
            }
            FilterMode::NtscPhosphor => {
                let out = self.image.pixels_mut();
                let len = (height * pitch)
                    .min(out.len())
                    .min(self.current.capacity());
                let current = self.current.as_slice();
                let previous = self.previous.as_slice();

                for (i, pixel) in out[..len].iter_mut().enumerate() {
                    *pixel = average_rgb(current[i], previous[i]);
                }
            }
        }

        self.image.render();
        if self.scanlines_enabled {
            self.scanlines.render();
        }
    }

    /// Build a fixed 2x-wide view of the current frame
    ///
    /// With NTSC on, the filtered image is sampled (nearest neighbour) down
    /// to `2 * width` columns; otherwise every source pixel is looked up
    /// through the palette and doubled horizontally.
    pub fn base_surface<S: FrameSource + ?Sized>(&mut self, frame: &S) -> &B::Surface {
        let source_width = frame.width() as usize;
        let height = frame.height() as usize;
        let width = 2 * source_width;

        self.base.set_src_size(width as u32, height as u32);
        if width == 0 || height == 0 {
            return &self.base;
        }

        let base_pitch = self.base.pitch();
        let palette = self.palette;
        let out = self.base.pixels_mut();

        if self.mode.is_ntsc() {
            let pitch = self.image.pitch();
            let ntsc_width = self.filter.out_width(source_width).min(pitch);
            let source = self.image.pixels();
            let x_factor = ntsc_width as f64 / width as f64;

            // Nothing filtered to sample from
            if ntsc_width == 0 {
                for y in 0..height {
                    out[y * base_pitch..][..width].fill(0);
                }
                return &self.base;
            }

            for y in 0..height {
                let row = &source[y * pitch..][..ntsc_width];
                let out_row = &mut out[y * base_pitch..][..width];
                for (x, pixel) in out_row.iter_mut().enumerate() {
                    let sx = ((x as f64 * x_factor).round() as usize).min(ntsc_width - 1);
                    *pixel = row[sx];
                }
            }
        } else {
            let input = frame.frame_buffer();
            for y in 0..height {
                let row = &input[y * source_width..][..source_width];
                let out_row = &mut out[y * base_pitch..][..width];
                for (x, pixel) in out_row.iter_mut().enumerate() {
                    *pixel = palette.lookup(row[x / 2]);
                }
            }
        }

        &self.base
    }

    fn render_frame<S: FrameSource + ?Sized>(&mut self, frame: &S, save_snapshot: bool) {
        self.update_geometry(frame.width(), frame.height());

        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let input = frame.frame_buffer();
        let pitch = self.image.pitch();
        let palette = self.palette;

        debug_assert!(input.len() >= width * height);
        debug_assert!(height <= self.image.height());

        match self.mode {
            FilterMode::Normal => {
                let out = self.image.pixels_mut();
                for y in 0..height {
                    let row = &input[y * width..][..width];
                    let out_row = &mut out[y * pitch..][..2 * width];
                    for (pair, &index) in out_row.chunks_exact_mut(2).zip(row) {
                        let color = palette.lookup(index);
                        pair[0] = color;
                        pair[1] = color;
                    }
                }
            }
            FilterMode::Phosphor => {
                if save_snapshot {
                    self.previous.copy_from(&self.current, width * height);
                }

                let out = self.image.pixels_mut();
                let composed = self.current.as_mut_slice();
                let table = &self.table;

                for y in 0..height {
                    let row = &input[y * width..][..width];
                    let composed_row = &mut composed[y * width..][..width];
                    let out_row = &mut out[y * pitch..][..2 * width];

                    for ((pair, &index), persisted) in out_row
                        .chunks_exact_mut(2)
                        .zip(row)
                        .zip(composed_row.iter_mut())
                    {
                        let color = table.blend_rgb(palette.lookup(index), *persisted);
                        *persisted = color;
                        pair[0] = color;
                        pair[1] = color;
                    }
                }
            }
            FilterMode::NtscNormal => {
                self.filter
                    .render(input, width, height, self.image.pixels_mut(), pitch, None);
            }
            FilterMode::NtscPhosphor => {
                if save_snapshot {
                    self.previous.copy_from(&self.current, height * pitch);
                }

                let phosphor = PhosphorInput {
                    buffer: self.current.as_mut_slice(),
                    table: &self.table,
                };
                self.filter.render(
                    input,
                    width,
                    height,
                    self.image.pixels_mut(),
                    pitch,
                    Some(phosphor),
                );
            }
        }

        self.image.render();
        if self.scanlines_enabled {
            self.scanlines.render();
        }
    }

    /// Capture the frame just composed and hand it to the sink
    ///
    /// Sink failures are logged and announced; rendering carries on.
    fn take_snapshot<S: FrameSource + ?Sized>(&mut self, frame: &S) {
        let Some(mut sink) = self.sink.take() else {
            log::warn!("snapshot requested but no snapshot sink is installed");
            return;
        };

        let image = if self.config.snapshot.native_size {
            SnapshotImage::from_surface(self.base_surface(frame))
        } else {
            self.render_for_snapshot(frame);
            SnapshotImage::from_surface(&self.image)
        };

        match sink.save_snapshot(&image) {
            Ok(location) => {
                self.backend
                    .show_message(&format!("Snapshot saved to {}", location));
            }
            Err(err) => {
                log::warn!("snapshot failed: {}", err);
                self.backend.show_message("Snapshot failed");
            }
        }

        self.sink = Some(sink);
    }
}
