// CRT Compositor - Main Entry Point
//
// Opens a viewer window that composes a synthetic indexed frame, so the TV
// effects can be tried with the function keys. Settings are loaded from and
// saved back to the configuration file.

use crt_compositor::capture::PngSnapshotWriter;
use crt_compositor::config::{CompositorConfig, CONFIG_FILE};
use crt_compositor::display::{hue_luma_palette, run_viewer, ViewerConfig};
use crt_compositor::{Compositor, SimpleComposite, SoftwareBackend};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("CRT Compositor v{}", env!("CARGO_PKG_VERSION"));

    let config = CompositorConfig::load_or_default(CONFIG_FILE);
    log::info!("configuration loaded from '{}'", CONFIG_FILE);

    let snapshots = PngSnapshotWriter::new(
        &config.snapshot.directory,
        "test_pattern",
        config.snapshot.include_timestamp,
    );

    let palette = hue_luma_palette();
    let mut compositor = Compositor::new(SoftwareBackend::new(), SimpleComposite::new(), config);
    compositor.set_palette(&palette, &palette);
    compositor.set_snapshot_sink(Box::new(snapshots));

    log::info!("F1 preset, F2 phosphor, F3/F4 scanlines, F5-F7 custom, F9 snapshot, F10 info");

    let viewer = ViewerConfig::new().with_scale(3).with_fps(60).with_vsync(true);
    let config = run_viewer(viewer, compositor)?;

    config.save(CONFIG_FILE)?;
    log::info!("configuration saved to '{}'", CONFIG_FILE);

    Ok(())
}
