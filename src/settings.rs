//! Engine settings and tuning.
//!
//! Loaded from an optional JSON file; every field has a default so an empty
//! document is valid. CLI flags are applied on top in `main`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sprite::SizeBucket;

/// One pet to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSpec {
    pub species: String,
    pub color: String,
}

impl PetSpec {
    pub fn new(species: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            color: color.into(),
        }
    }

    /// Parse `species:color`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.split_once(':') {
            Some((species, color)) if !species.is_empty() && !color.is_empty() => {
                Ok(Self::new(species.trim(), color.trim()))
            }
            _ => Err(format!("expected species:color, got '{s}'")),
        }
    }
}

/// Screen geometry used when the platform cannot be queried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    pub width: u32,
    pub height: u32,
    pub taskbar_height: u32,
    pub taskbar_autohide: bool,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            taskbar_height: 40,
            taskbar_autohide: false,
        }
    }
}

/// Heuristic thresholds. The values are the ones the pets have always used;
/// they are exposed so they can be tuned without touching the systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Last drag delta is scaled by this on release.
    pub release_multiplier: f32,
    /// Per-tick throw velocity multiplier.
    pub damping: f32,
    /// Velocity multiplier on boundary contact (sign included).
    pub bounce: f32,
    /// Throw ends once both axes drop below this.
    pub rest_threshold: f32,
    /// Pets roam the right-most `partition_fraction` of the screen.
    pub partition_fraction: f32,
    /// Name of the calming state forced by pointer proximity.
    pub reactive_state: String,
    /// Hold, in ticks, of the forced calming state.
    pub reactive_hold: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            release_multiplier: 1.5,
            damping: 0.85,
            bounce: -0.6,
            rest_threshold: 0.2,
            partition_fraction: 0.25,
            reactive_state: "lie".into(),
            reactive_hold: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base animation rate; per-state multipliers scale it.
    pub base_fps: u32,
    pub size: SizeBucket,
    /// Scheduler cadence.
    pub tick_rate_hz: f64,
    /// Frames buffered for the compositor before new ones are dropped.
    pub frame_queue_depth: usize,
    pub pets: Vec<PetSpec>,
    pub screen: ScreenSettings,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_fps: 10,
            size: SizeBucket::Medium,
            tick_rate_hz: 30.0,
            frame_queue_depth: 64,
            pets: Vec::new(),
            screen: ScreenSettings::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_fps == 0 {
            return Err(ConfigError::invalid("base_fps must be at least 1"));
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::invalid("tick_rate_hz must be positive"));
        }
        if self.frame_queue_depth == 0 {
            return Err(ConfigError::invalid("frame_queue_depth must be at least 1"));
        }
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(ConfigError::invalid("screen size must be non-zero"));
        }
        let t = &self.tuning;
        if !(0.0..1.0).contains(&t.damping) {
            return Err(ConfigError::invalid("damping must be in [0, 1)"));
        }
        if t.rest_threshold.is_nan() || t.rest_threshold <= 0.0 {
            return Err(ConfigError::invalid("rest_threshold must be positive"));
        }
        if !(0.0..=1.0).contains(&t.partition_fraction) {
            return Err(ConfigError::invalid("partition_fraction must be in [0, 1]"));
        }
        Ok(())
    }

    /// Seconds per scheduler tick.
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}
