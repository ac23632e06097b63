//! Error taxonomy for the pet engine.
//!
//! Catalog and settings problems surface as [`ConfigError`] when an agent is
//! created. Broken sprite data surfaces as [`AssetError`] and is absorbed by
//! the animation pipeline. Anything that goes wrong inside one agent's tick
//! is a [`TickError`], caught by the scheduler at the per-agent boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Catalog or settings problem. Fatal to the agent being created, never to
/// the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("species '{species}' is not in the catalog")]
    UnknownSpecies { species: String },

    #[error("colour '{color}' is not defined for species '{species}'")]
    UnknownColor { species: String, color: String },

    #[error("species '{species}' colour '{color}' has no states")]
    NoStates { species: String, color: String },

    #[error("bad defaults for '{species}/{state}': {reason}")]
    BadDefaults {
        species: String,
        state: String,
        reason: String,
    },

    #[error("climber '{species}/{color}' is missing chain state '{state}'")]
    IncompleteClimbChain {
        species: String,
        color: String,
        state: String,
    },

    #[error("invalid setting: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Empty or corrupt frame sequence.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open asset '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode asset '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("asset '{path}' has no frames")]
    Empty { path: PathBuf },

    #[error("asset '{path}' has a zero-sized frame")]
    ZeroSized { path: PathBuf },
}

/// Failure inside a single agent's tick. The agent is skipped for that tick.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("agent {entity:?} is missing components")]
    MissingComponents { entity: hecs::Entity },

    #[error("state '{state}' is not in the table for '{species}/{color}'")]
    MissingState {
        species: String,
        color: String,
        state: String,
    },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn scheduler thread: {0}")]
    Thread(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
