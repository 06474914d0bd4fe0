//! Command error type for the `iifactor` binary.

use iifactor_otp::OtpError;
use iifactor_store::StoreError;
use thiserror::Error;

/// Anything a command can fail with. Printed to stderr by [`crate::run`].
#[derive(Debug, Error)]
pub enum CliError {
    /// Storage, import or export failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Parsing or code generation failure.
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Filesystem failure outside the store (data directory, input files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be rendered.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// No credential matches the selector.
    #[error("no credential matches '{0}'")]
    NoMatch(String),

    /// More than one credential matches the selector.
    #[error("'{selector}' matches {count} credentials; use a longer id")]
    Ambiguous {
        /// Selector as typed.
        selector: String,
        /// Number of matches.
        count: usize,
    },

    /// Arguments are valid to the parser but not to the command.
    #[error("{0}")]
    Usage(String),
}
