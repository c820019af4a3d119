//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, encoding or delivering an image
#[derive(Error, Debug)]
pub enum Error {
    /// The editor surface is not mounted or could not be captured
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Failed to encode a still or animated image
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Failed to read or write persisted state
    #[error("Storage error: {0}")]
    Storage(String),

    /// Licence validation could not be completed
    #[error("Licence validation failed: {0}")]
    License(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Platform sink (download, share sheet, link opener) failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Unknown template key
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("invalid JSON: {}", err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}
