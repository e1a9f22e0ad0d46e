//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The base contract was invoked without a concrete implementation.
    #[error("converter '{converter}' does not implement convert")]
    NotImplemented { converter: String },

    /// A required backend binary was not found.
    #[error("backend binary not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Input file not found.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The converter cannot produce the requested target format.
    #[error("converter '{converter}' cannot produce '{to}'")]
    UnsupportedTarget { converter: String, to: String },

    /// The converter's worker is not ready to accept jobs.
    #[error("converter '{converter}' is not ready")]
    NotReady { converter: String },

    /// Conversion process failed.
    #[error("conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion timed out.
    #[error("conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The remote service rejected the request.
    #[error("remote service rejected the request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// HTTP transport error while talking to a remote service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to parse backend output.
    #[error("failed to parse backend output: {reason}")]
    ParseError { reason: String },
}

impl ConverterError {
    /// Creates a new conversion failed error with optional stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new parse error.
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }
}
