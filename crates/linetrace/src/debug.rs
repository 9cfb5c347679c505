use std::path::{Path as FsPath, PathBuf};

use image::GrayImage;
use tracing::warn;

/// Writes intermediate pipeline images to a directory for inspection.
///
/// Failures to write are logged and swallowed: debug output must never fail
/// an otherwise healthy run.
#[derive(Debug, Clone)]
pub struct DebugSink {
    dir: PathBuf,
}

impl DebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &FsPath {
        &self.dir
    }

    pub fn save_image(&self, name: &str, image: &GrayImage) {
        let path = self.dir.join(name);
        if let Err(err) = image.save(&path) {
            warn!(path = %path.display(), %err, "failed to write debug image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn writes_image_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::new(dir.path());
        let img = GrayImage::from_pixel(4, 4, Luma([128u8]));
        sink.save_image("mask.png", &img);
        assert!(dir.path().join("mask.png").exists());
    }

    #[test]
    fn missing_directory_does_not_panic() {
        let sink = DebugSink::new("/nonexistent/debug/dir");
        sink.save_image("mask.png", &GrayImage::new(2, 2));
    }
}
