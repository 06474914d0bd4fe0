//! Error types for `iifactor-otp`.

use thiserror::Error;

use crate::credential::OtpType;

/// Errors produced while decoding Base32 text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base32Error {
    /// A character outside `A–Z2–7` (and not padding) was found.
    #[error("invalid Base32 character {character:?} at position {position}")]
    InvalidCharacter {
        /// The offending character as it appeared in the input.
        character: char,
        /// Byte offset of the character in the caller's input.
        position: usize,
    },

    /// The underlying codec rejected the normalized input.
    #[error("Base32 decoding failed: {0}")]
    Encoding(String),
}

/// Errors produced by credential parsing and OTP generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    /// Input is not a URI or its scheme is not `otpauth`.
    #[error("malformed key URI: {0}")]
    MalformedUri(String),

    /// URI host is neither `totp` nor `hotp`.
    #[error("unsupported OTP type: {0:?}")]
    UnsupportedType(String),

    /// Key URI has no `secret` parameter.
    #[error("key URI is missing the secret parameter")]
    MissingSecret,

    /// Secret is not valid Base32 or decodes to nothing.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    /// Algorithm name outside SHA1/SHA256/SHA512 (strict parsing only).
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A TOTP period of zero seconds.
    #[error("period must be > 0")]
    InvalidPeriod,

    /// A TOTP operation was asked of an HOTP credential or vice versa.
    #[error("expected a {expected} credential, got {actual}")]
    WrongType {
        /// Type the operation requires.
        expected: OtpType,
        /// Type of the credential supplied.
        actual: OtpType,
    },
}

impl From<Base32Error> for OtpError {
    fn from(err: Base32Error) -> Self {
        Self::InvalidSecret(err.to_string())
    }
}
