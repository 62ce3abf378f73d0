// PNG snapshot writer
//
// Saves captured frames as RGB PNG files, named after the running game.

use super::{SnapshotError, SnapshotImage, SnapshotSink};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes snapshots into a directory as PNG files
#[derive(Debug, Clone)]
pub struct PngSnapshotWriter {
    directory: PathBuf,
    name: String,
    include_timestamp: bool,
}

impl PngSnapshotWriter {
    /// Create a writer
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory the files go into (created on first save)
    /// * `name` - Base file name, usually the game name
    /// * `include_timestamp` - Append the local time to each file name
    pub fn new<P: AsRef<Path>>(directory: P, name: &str, include_timestamp: bool) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            name: sanitize_name(name),
            include_timestamp,
        }
    }

    /// Pick a file name that does not overwrite an earlier snapshot
    fn next_path(&self) -> PathBuf {
        let stem = if self.include_timestamp {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            format!("{}_{}", self.name, timestamp)
        } else {
            self.name.clone()
        };

        let path = self.directory.join(format!("{}.png", stem));
        if !path.exists() {
            return path;
        }

        (1..)
            .map(|n| self.directory.join(format!("{}_{}.png", stem, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }
}

impl SnapshotSink for PngSnapshotWriter {
    fn save_snapshot(&mut self, image: &SnapshotImage) -> Result<String, SnapshotError> {
        if image.width == 0 || image.height == 0 {
            return Err(SnapshotError::NoImage);
        }

        fs::create_dir_all(&self.directory)?;
        let path = self.next_path();
        save_png(&path, &image.to_rgb_bytes(), image.width, image.height)?;

        log::info!("snapshot written to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// Replace characters that are awkward in file names
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    if cleaned.trim().is_empty() {
        "snapshot".to_string()
    } else {
        cleaned
    }
}

/// Save RGB data as a PNG file
///
/// # Arguments
///
/// * `path` - Path to save the PNG file
/// * `data` - RGB data (width × height × 3 bytes)
/// * `width` - Image width
/// * `height` - Image height
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), SnapshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> SnapshotImage {
        SnapshotImage {
            width: 2,
            height: 2,
            pixels: vec![0x112233, 0x112233, 0x000000, 0xFFFFFF],
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Space: Invaders?"), "Space_ Invaders_");
        assert_eq!(sanitize_name("  "), "snapshot");
    }

    #[test]
    fn test_writes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = PngSnapshotWriter::new(dir.path().join("snaps"), "game", false);

        let location = writer.save_snapshot(&image()).expect("save failed");
        let path = PathBuf::from(&location);
        assert!(path.ends_with("game.png"));

        let decoder = png::Decoder::new(io::BufReader::new(fs::File::open(&path).expect("open")));
        let reader = decoder.read_info().expect("png header");
        let info = reader.info();
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
    }

    #[test]
    fn test_does_not_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = PngSnapshotWriter::new(dir.path(), "game", false);

        let first = writer.save_snapshot(&image()).expect("first save");
        let second = writer.save_snapshot(&image()).expect("second save");
        assert_ne!(first, second);
        assert!(second.ends_with("game_1.png"));
    }

    #[test]
    fn test_empty_image_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = PngSnapshotWriter::new(dir.path(), "game", true);
        let empty = SnapshotImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        assert!(matches!(
            writer.save_snapshot(&empty),
            Err(SnapshotError::NoImage)
        ));
    }
}
