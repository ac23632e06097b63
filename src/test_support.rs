use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};

use crate::error::AssetError;
use crate::sprite::FrameSource;

/// Synthetic frames of a fixed size; counts loads.
pub struct MemoryFrames {
    count: usize,
    width: u32,
    height: u32,
    loads: AtomicUsize,
}

impl MemoryFrames {
    pub fn new(count: usize, width: u32, height: u32) -> Self {
        Self {
            count,
            width,
            height,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl FrameSource for MemoryFrames {
    fn load(&self, _asset: &Path) -> Result<Vec<RgbaImage>, AssetError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok((0..self.count)
            .map(|i| RgbaImage::from_pixel(self.width, self.height, Rgba([i as u8, 0, 0, 255])))
            .collect())
    }
}
