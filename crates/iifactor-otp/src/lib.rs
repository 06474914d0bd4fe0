//! `iifactor-otp`: the portable OTP engine of IIFactor.
//!
//! Base32 secrets, `otpauth://` key URIs, and RFC 4226 / RFC 6238 code
//! generation. Zero I/O, zero async, zero logging: every function is a
//! pure computation over its inputs and safe to call from any thread.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod base32;

pub mod credential;
pub mod keyuri;

pub mod totp;

pub use credential::{Credential, ManualEntry, OtpParams, OtpType};
pub use error::{Base32Error, OtpError};
pub use memory::SecretKey;
pub use totp::{
    format_code, generate_hotp, generate_totp, remaining_seconds, unix_time_now, OtpAlgorithm,
    OtpDigits, DEFAULT_COUNTER, DEFAULT_PERIOD,
};
