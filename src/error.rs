//! Error types
//!
//! Only construction and configuration can fail. The per-frame simulation is total.

use thiserror::Error;

/// Required scene content is missing or malformed; the session refuses to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("car not found: scene has no transform named \"Car\"")]
    MissingCar,

    #[error("failed to capture all tiles: expected {expected}, found {found}")]
    TileCount { found: usize, expected: usize },

    #[error("expecting scene to have exactly one camera, but it has {found}")]
    CameraCount { found: usize },

    #[error("failed to find light source")]
    MissingLight,

    #[error("scene has no obstacle boxes")]
    NoObstacles,
}

/// Settings or tuning could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Invalid(String),
}
