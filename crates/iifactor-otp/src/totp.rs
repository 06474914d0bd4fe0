//! RFC 6238 TOTP and RFC 4226 HOTP generation engine.
//!
//! Provides standards-compliant one-time password generation using
//! `ring::hmac` for HMAC-SHA1, HMAC-SHA256, and HMAC-SHA512.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::OtpError;

// ── Constants ───────────────────────────────────────────────────────

/// Default TOTP period in seconds (RFC 6238 §4).
pub const DEFAULT_PERIOD: u32 = 30;

/// Default HOTP counter.
pub const DEFAULT_COUNTER: u64 = 0;

/// Largest digit count accepted. Ten digits already cover the whole
/// 31-bit truncated value.
pub const MAX_DIGITS: u8 = 10;

// ── Types ───────────────────────────────────────────────────────────

/// HMAC algorithm used for OTP generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OtpAlgorithm {
    /// HMAC-SHA1 (default for most authenticator apps).
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl OtpAlgorithm {
    /// Map to the corresponding `ring::hmac::Algorithm`.
    fn to_ring_algorithm(self) -> hmac::Algorithm {
        match self {
            Self::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => hmac::HMAC_SHA256,
            Self::Sha512 => hmac::HMAC_SHA512,
        }
    }

    /// Name as written in key URIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Lenient lookup used by the key-URI parser: unknown names give SHA1.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for OtpAlgorithm {
    type Err = OtpError;

    /// Case-insensitive strict parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(OtpError::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

impl fmt::Display for OtpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of digits in an OTP code.
///
/// 6 and 8 are the values authenticators use; anything in
/// `1..=MAX_DIGITS` is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OtpDigits(u8);

impl OtpDigits {
    /// 6-digit code (standard).
    pub const SIX: Self = Self(6);
    /// 8-digit code.
    pub const EIGHT: Self = Self(8);

    /// Validate a digit count. Returns `None` outside `1..=MAX_DIGITS`.
    #[must_use]
    pub const fn new(digits: u8) -> Option<Self> {
        if digits == 0 || digits > MAX_DIGITS {
            None
        } else {
            Some(Self(digits))
        }
    }

    /// Return the numeric digit count.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Return the modulus value (10^digits) for truncation.
    #[must_use]
    const fn modulus(self) -> u64 {
        // digits <= 10, so 10^digits fits comfortably in u64.
        #[allow(clippy::arithmetic_side_effects)]
        let modulus = 10u64.pow(self.0 as u32);
        modulus
    }
}

impl Default for OtpDigits {
    fn default() -> Self {
        Self::SIX
    }
}

impl TryFrom<u8> for OtpDigits {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("digits must be 1..={MAX_DIGITS}, got {value}"))
    }
}

impl From<OtpDigits> for u8 {
    fn from(digits: OtpDigits) -> Self {
        digits.0
    }
}

// ── HOTP (RFC 4226) ────────────────────────────────────────────────

/// Generate an HOTP code per RFC 4226.
///
/// # Arguments
/// - `secret`: Shared secret key bytes (from `SecretKey::expose()`)
/// - `counter`: 8-byte counter value (big-endian per RFC 4226 §5.2)
/// - `digits`: Number of output digits
/// - `algorithm`: HMAC algorithm to use
///
/// # Errors
/// Returns `OtpError::InvalidSecret` if the secret is empty.
#[must_use = "OTP code should be used or stored"]
pub fn generate_hotp(
    secret: &[u8],
    counter: u64,
    digits: OtpDigits,
    algorithm: OtpAlgorithm,
) -> Result<String, OtpError> {
    if secret.is_empty() {
        return Err(OtpError::InvalidSecret("secret must not be empty".to_owned()));
    }

    // HMAC(K, C) where C is counter as 8-byte big-endian (RFC 4226 §5.2).
    let key = hmac::Key::new(algorithm.to_ring_algorithm(), secret);
    let counter_bytes = counter.to_be_bytes();
    let tag = hmac::sign(&key, &counter_bytes);
    let hmac_result = tag.as_ref();

    // Dynamic Truncation (RFC 4226 §5.3).
    // offset = low-order 4 bits of last byte; at most 15, and every digest
    // is at least 20 bytes, so offset + 3 is always in bounds.
    let offset = usize::from(hmac_result[hmac_result.len().wrapping_sub(1)] & 0x0F);

    let binary_code = u32::from_be_bytes([
        hmac_result[offset] & 0x7F,
        hmac_result[offset.wrapping_add(1)],
        hmac_result[offset.wrapping_add(2)],
        hmac_result[offset.wrapping_add(3)],
    ]);

    // modulus is 10^digits with digits >= 1 (never zero).
    #[allow(clippy::arithmetic_side_effects)]
    let code = u64::from(binary_code) % digits.modulus();
    let width = usize::from(digits.value());

    Ok(format!("{code:0>width$}"))
}

// ── TOTP (RFC 6238) ────────────────────────────────────────────────

/// Generate a TOTP code per RFC 6238.
///
/// # Arguments
/// - `secret`: Shared secret key bytes
/// - `time`: Unix timestamp in seconds
/// - `digits`: Number of output digits
/// - `period`: Time step in seconds (typically 30)
/// - `algorithm`: HMAC algorithm to use
///
/// # Errors
/// Returns `OtpError::InvalidPeriod` if `period` is 0, or
/// `OtpError::InvalidSecret` if the secret is empty.
#[must_use = "OTP code should be used or stored"]
pub fn generate_totp(
    secret: &[u8],
    time: u64,
    digits: OtpDigits,
    period: u32,
    algorithm: OtpAlgorithm,
) -> Result<String, OtpError> {
    generate_hotp(secret, time_step(time, period)?, digits, algorithm)
}

/// `T = floor(time / period)` per RFC 6238 §4.
///
/// # Errors
/// Returns `OtpError::InvalidPeriod` if `period` is 0.
pub fn time_step(time: u64, period: u32) -> Result<u64, OtpError> {
    time.checked_div(u64::from(period))
        .ok_or(OtpError::InvalidPeriod)
}

/// Seconds until the code for `time` changes.
///
/// At an exact period boundary the full period is returned, never zero.
///
/// # Errors
/// Returns `OtpError::InvalidPeriod` if `period` is 0.
pub fn remaining_seconds(time: u64, period: u32) -> Result<u32, OtpError> {
    let elapsed = time
        .checked_rem(u64::from(period))
        .ok_or(OtpError::InvalidPeriod)?;
    // elapsed < period, so the difference is in 1..=period.
    let elapsed = u32::try_from(elapsed).map_err(|_| OtpError::InvalidPeriod)?;
    Ok(period.saturating_sub(elapsed))
}

/// Current Unix time in seconds (0 if the clock is before the epoch).
#[must_use]
pub fn unix_time_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Group a code for display: `"123 456"`, `"1234 5678"`.
///
/// Codes of any other length are returned unchanged.
#[must_use]
pub fn format_code(code: &str) -> String {
    let split = match code.len() {
        6 => 3,
        8 => 4,
        _ => return code.to_owned(),
    };
    if !code.is_char_boundary(split) {
        return code.to_owned();
    }
    let (head, tail) = code.split_at(split);
    format!("{head} {tail}")
}

// ── Tests ───────────────────────────────────────────────────────────
