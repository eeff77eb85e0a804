//! Domain Errors
//!
//! Error types for archive client operations.

use thiserror::Error;

/// Archive client errors
///
/// Non-image file selections and pastes are not errors; the preview widgets
/// report them as [`crate::services::PreviewOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The server could not be reached (connect failure, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The search controller task is gone
    #[error("Search controller stopped: {0}")]
    ControllerStopped(String),
}

impl ArchiveError {
    pub fn http<T: Into<String>>(status: u16, body: T) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// HTTP status for `Http` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
