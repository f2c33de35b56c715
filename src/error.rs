use std::path::PathBuf;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to save image {}: {source}", path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Pipeline error: {0}")]
    Pipeline(String),
    #[error("Result store error: {0}")]
    Store(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// True when the error comes from decoding the input image.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(self, AppError::ImageLoad { .. })
    }
}
