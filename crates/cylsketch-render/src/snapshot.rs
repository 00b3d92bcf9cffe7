//! Numbered PNG snapshots: `render0.png`, `render1.png`, ...
//!
//! The directory is scanned once when the writer is created; numbering
//! continues after the highest existing index, so earlier renders are
//! never overwritten.

use std::path::{Path, PathBuf};

use image::buffer::ConvertBuffer;
use image::{ImageEncoder, RgbImage, RgbaImage};

/// File name prefix of every snapshot.
pub const SNAPSHOT_PREFIX: &str = "render";

/// File extension of every snapshot.
pub const SNAPSHOT_EXTENSION: &str = "png";

/// Errors that can occur while saving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Creating the directory or writing the file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

impl From<image::ImageError> for SnapshotError {
    fn from(err: image::ImageError) -> Self {
        Self::PngEncode(err.to_string())
    }
}

/// Index encoded in a snapshot file name, if `name` is one.
#[must_use]
pub fn snapshot_index(name: &str) -> Option<u64> {
    let stem = name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_EXTENSION)?
        .strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Index the next snapshot in `dir` should take: one past the highest
/// existing index, or 0 if there is none or the directory is unreadable.
#[must_use]
pub fn next_snapshot_index(dir: &Path) -> u64 {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot scan {}: {e}; starting at 0", dir.display());
            return 0;
        }
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| snapshot_index(&entry.file_name().to_string_lossy()))
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Writes frames to consecutively numbered PNG files.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    next: u64,
}

impl SnapshotWriter {
    /// Writer for `dir`, numbering after any snapshots already there.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let next = next_snapshot_index(&dir);
        Self { dir, next }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next snapshot will be written to.
    #[must_use]
    pub fn next_path(&self) -> PathBuf {
        self.dir
            .join(format!("{SNAPSHOT_PREFIX}{}.{SNAPSHOT_EXTENSION}", self.next))
    }

    /// Save `image` as the next snapshot and return its path.
    ///
    /// The index only advances on success. Alpha is dropped; snapshots
    /// are opaque RGB.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::PngEncode`] if encoding fails and
    /// [`SnapshotError::Io`] if the directory or file cannot be written.
    pub fn write(&mut self, image: &RgbaImage) -> Result<PathBuf, SnapshotError> {
        let rgb: RgbImage = image.convert();
        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        let path = self.next_path();
        std::fs::create_dir_all(&self.dir).map_err(|source| SnapshotError::Io {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(&path, png_bytes).map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;
        self.next += 1;
        tracing::info!("saved snapshot {}", path.display());
        Ok(path)
    }
}
