//! Store error types for `iifactor-store`.

use iifactor_otp::OtpError;
use thiserror::Error;

/// Errors produced by storage, import and export operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credential parsing or generation failed (delegated from the core).
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be read or written.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No credential with this id.
    #[error("credential not found: {0}")]
    NotFound(String),

    /// Bulk import failure.
    #[error("import error: {0}")]
    Import(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
