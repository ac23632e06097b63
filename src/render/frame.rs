use std::sync::Arc;

use image::RgbaImage;

use crate::ecs::components::{Animation, Behavior, Extent, Position};

/// One agent's output for one tick: the bitmap to show and where.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub agent: hecs::Entity,
    /// `None` when the current state has no frames to draw.
    pub bitmap: Option<Arc<RgbaImage>>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RenderFrame {
    /// Snapshot the agent's current frame. Left-facing agents get the
    /// mirrored bitmap.
    pub fn from_components(
        agent: hecs::Entity,
        pos: &Position,
        extent: &Extent,
        anim: &Animation,
        behavior: &Behavior,
    ) -> Self {
        let bitmap = anim
            .frames
            .as_ref()
            .and_then(|set| set.frame(anim.cursor, behavior.facing.mirrored()))
            .cloned();

        Self {
            agent,
            bitmap,
            x: pos.0.x.round() as i32,
            y: pos.0.y.round() as i32,
            width: extent.0.x as u32,
            height: extent.0.y as u32,
        }
    }
}
