// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinifydError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error processing {family}: {message}")]
    Transform {
        family: &'static str,
        message: String,
    },

    #[error("runtime not installed: {0}")]
    RuntimeNotInstalled(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MinifydError {
    /// Shorthand for a per-file transform failure.
    pub fn transform(family: &'static str, message: impl Into<String>) -> Self {
        MinifydError::Transform {
            family,
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MinifydError>;
