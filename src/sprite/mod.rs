//! Frame Sets: per-state bitmap sequences scaled to one of six size buckets.

pub mod gif;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

pub use gif::GifFrames;

/// Target display height frames are pre-scaled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SizeBucket {
    VerySmall,
    Small,
    /// Native asset height, no scaling.
    Original,
    #[default]
    Medium,
    Big,
    ReallyBig,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 6] = [
        Self::VerySmall,
        Self::Small,
        Self::Original,
        Self::Medium,
        Self::Big,
        Self::ReallyBig,
    ];

    /// Height in pixels, or `None` to keep the asset's own height.
    pub fn target_height(self) -> Option<u32> {
        match self {
            Self::VerySmall => Some(20),
            Self::Small => Some(40),
            Self::Original => None,
            Self::Medium => Some(125),
            Self::Big => Some(150),
            Self::ReallyBig => Some(200),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VerySmall => "very small",
            Self::Small => "small",
            Self::Original => "original",
            Self::Medium => "medium",
            Self::Big => "big",
            Self::ReallyBig => "really big",
        }
    }

    /// Accepts the settings-tab spellings ("really big") as well as
    /// snake/kebab case.
    pub fn parse(s: &str) -> Option<Self> {
        let norm = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL.into_iter().find(|b| b.label() == norm)
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SizeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown size bucket '{s}'"))
    }
}

impl TryFrom<String> for SizeBucket {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Supplies raw, unscaled frames for an asset reference.
pub trait FrameSource: Send + Sync {
    fn load(&self, asset: &Path) -> Result<Vec<RgbaImage>, AssetError>;
}

/// Aspect-preserving dimensions for a frame of `width`x`height` in `bucket`.
pub fn scaled_dimensions(width: u32, height: u32, bucket: SizeBucket) -> (u32, u32) {
    let target_h = bucket.target_height().unwrap_or(height);
    let target_w = (width as u64 * target_h as u64 / height.max(1) as u64) as u32;
    (target_w.max(1), target_h)
}

/// Ordered frames for one state, scaled to one bucket, in both facings.
#[derive(Debug)]
pub struct FrameSet {
    frames: Vec<Arc<RgbaImage>>,
    mirrored: Vec<Arc<RgbaImage>>,
    width: u32,
    height: u32,
}

impl FrameSet {
    /// Scale raw frames into `bucket`. Source art faces right; the mirrored
    /// copies are used while the agent faces left.
    pub fn scale(raw: Vec<RgbaImage>, bucket: SizeBucket, asset: &Path) -> Result<Self, AssetError> {
        if raw.is_empty() {
            return Err(AssetError::Empty {
                path: asset.to_path_buf(),
            });
        }

        let mut frames = Vec::with_capacity(raw.len());
        let mut mirrored = Vec::with_capacity(raw.len());
        for img in raw {
            let (w, h) = img.dimensions();
            if w == 0 || h == 0 {
                return Err(AssetError::ZeroSized {
                    path: asset.to_path_buf(),
                });
            }
            let (nw, nh) = scaled_dimensions(w, h, bucket);
            let scaled = if (nw, nh) == (w, h) {
                img
            } else {
                imageops::resize(&img, nw, nh, imageops::FilterType::Lanczos3)
            };
            mirrored.push(Arc::new(imageops::flip_horizontal(&scaled)));
            frames.push(Arc::new(scaled));
        }

        let (width, height) = frames[0].dimensions();
        Ok(Self {
            frames,
            mirrored,
            width,
            height,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First-frame width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// First-frame height.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame(&self, index: usize, mirrored: bool) -> Option<&Arc<RgbaImage>> {
        if mirrored {
            self.mirrored.get(index)
        } else {
            self.frames.get(index)
        }
    }
}
