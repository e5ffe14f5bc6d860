//! Image and font lookup

use crate::{DocError, Result};
use pdf_core::decode_dimensions;
use std::path::{Path, PathBuf};

/// An image found on disk, with its pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Answers "is this asset present, and how large is it"
///
/// Lookups are made fresh on every render; implementations must not cache
/// results between renders.
pub trait AssetSource {
    /// Decode an image asset
    ///
    /// Fails with [`DocError::AssetMissing`] when the file is absent or is
    /// not a fully decodable JPEG/PNG.
    fn probe(&self, path: &Path) -> Result<RenderedAsset>;

    /// Raw bytes of a font file
    fn read_font(&self, path: &Path) -> Result<Vec<u8>>;

    /// [`AssetSource::probe`], turning a missing asset into `None`
    fn resolve(&self, path: &Path) -> Option<RenderedAsset> {
        match self.probe(path) {
            Ok(asset) => Some(asset),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "asset unavailable, leaving blank");
                None
            }
        }
    }
}

/// Assets below a base directory
#[derive(Debug, Clone)]
pub struct FsAssets {
    base_dir: PathBuf,
}

impl FsAssets {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

impl AssetSource for FsAssets {
    fn probe(&self, path: &Path) -> Result<RenderedAsset> {
        let full = self.full_path(path);
        let data = std::fs::read(&full)
            .map_err(|e| DocError::AssetMissing(format!("{}: {}", full.display(), e)))?;
        let dims = decode_dimensions(&data)
            .map_err(|e| DocError::AssetMissing(format!("{}: {}", full.display(), e)))?;

        Ok(RenderedAsset {
            path: full,
            width: dims.width,
            height: dims.height,
            data,
        })
    }

    fn read_font(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.full_path(path);
        std::fs::read(&full).map_err(|e| DocError::FontMissing(format!("{}: {}", full.display(), e)))
    }
}

/// Size of a signature drawn `target_width` wide, at most `max_height` tall
///
/// Keeps the aspect ratio of the `width` x `height` pixel image. Degenerate
/// images yield `(0.0, 0.0)`.
pub fn scale_signature(width: u32, height: u32, target_width: f64, max_height: f64) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }

    let ratio = height as f64 / width as f64;
    let scaled_height = target_width * ratio;
    if scaled_height > max_height {
        (max_height / ratio, max_height)
    } else {
        (target_width, scaled_height)
    }
}
