use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};

use super::FrameSource;
use crate::error::AssetError;

/// Loads state animations from disk. GIFs are decoded frame by frame; any
/// other format the `image` crate understands becomes a single frame.
#[derive(Debug, Clone)]
pub struct GifFrames {
    root: PathBuf,
}

impl GifFrames {
    /// Asset references in the catalog are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, asset: &Path) -> PathBuf {
        if asset.is_absolute() {
            asset.to_path_buf()
        } else {
            self.root.join(asset)
        }
    }
}

impl FrameSource for GifFrames {
    fn load(&self, asset: &Path) -> Result<Vec<RgbaImage>, AssetError> {
        let path = self.resolve(asset);
        let is_gif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));

        if !is_gif {
            let img = image::open(&path).map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?;
            return Ok(vec![img.into_rgba8()]);
        }

        let file = File::open(&path).map_err(|source| AssetError::Open {
            path: path.clone(),
            source,
        })?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|source| AssetError::Decode {
            path: path.clone(),
            source,
        })?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?;

        if frames.is_empty() {
            return Err(AssetError::Empty { path });
        }
        log::debug!("Decoded {} frames from {}", frames.len(), path.display());
        Ok(frames.into_iter().map(|f| f.into_buffer()).collect())
    }
}
