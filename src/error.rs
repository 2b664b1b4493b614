//! Error types for the flexgen client orchestrator.

use thiserror::Error;

/// Errors raised while turning a submission into an outcome.
///
/// `Display` is the message shown to the user; a `Failed` state carries it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Blank requirement, raised before any network activity
    #[error("{0}")]
    Validation(String),

    /// The request could not be completed (connection refused, timeout, body read)
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-success status; message already extracted from the body
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Success status but the payload does not match the expected shape
    #[error("{0}")]
    Format(String),
}

/// Clipboard port errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),

    #[error("Copy command failed: {0}")]
    CommandFailed(String),
}

/// File-save port errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to stage download: {0}")]
    Stage(String),

    #[error("Failed to save {filename}: {reason}")]
    Activate { filename: String, reason: String },

    #[error("Save I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Process-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum FlexgenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Download error: {0}")]
    Save(#[from] SaveError),

    /// Submission resolved to `Failed`; carries the user-facing message
    #[error("{0}")]
    SubmissionFailed(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for FlexgenError {
    fn from(err: config::ConfigError) -> Self {
        FlexgenError::ConfigError(err.to_string())
    }
}
