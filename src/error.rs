//! Error types.

use std::io;

use thiserror::Error;

/// Errors raised while setting up or presenting frames.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("The drawing surface could not provide a drawing context: {0}")]
    SurfaceUnavailable(String),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Errors raised while loading palette files.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("Palette '{palette}' is missing color key '{key}'.")]
    MissingKey { palette: String, key: &'static str },
    #[error("Palette '{palette}' defines unknown color key '{key}'.")]
    UnknownKey { palette: String, key: String },
    #[error("Palette '{palette}' has an invalid color '{value}' for key '{key}', expected #rrggbb.")]
    InvalidColor { palette: String, key: String, value: String },
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Errors raised while loading or validating the renderer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
}
