//! Error types for the quote composer

use thiserror::Error;

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching, composing or exporting
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to build a client or other long-lived resource
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Transport failure or non-success status from a remote service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A response body could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The displayed (or duplicated) image never produced pixel data
    #[error("Image failed to load: {0}")]
    ImageLoadError(String),

    /// Layout, rasterization or PNG encoding failed
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// A category outside the fixed registry was requested
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem failure while delivering an export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::ParseError(err.to_string())
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}
