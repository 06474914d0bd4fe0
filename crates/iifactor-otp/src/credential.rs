//! The OTP credential model.
//!
//! A [`Credential`] is built once, from a key URI or from manual-entry
//! fields, and is immutable afterwards except for its display fields
//! (issuer, account name, group). Identity is the `id`, not the content.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keyuri::{self, ParsedKeyUri};
use crate::memory::SecretKey;
use crate::totp::{
    self, OtpAlgorithm, OtpDigits, DEFAULT_COUNTER, DEFAULT_PERIOD,
};
use crate::OtpError;

// ── OTP type ────────────────────────────────────────────────────────

/// Whether the moving factor is time-derived or an explicit counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    /// Time-based one-time password (RFC 6238).
    #[default]
    Totp,
    /// HMAC-based one-time password (RFC 4226).
    Hotp,
}

impl OtpType {
    /// Key-URI host for this type.
    #[must_use]
    pub const fn as_host(self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::Hotp => "hotp",
        }
    }

    /// Map a key-URI host (any case) to a type.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        if host.eq_ignore_ascii_case("totp") {
            Some(Self::Totp)
        } else if host.eq_ignore_ascii_case("hotp") {
            Some(Self::Hotp)
        } else {
            None
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Totp => "TOTP",
            Self::Hotp => "HOTP",
        })
    }
}

// ── Cryptographic parameters ───────────────────────────────────────

/// Everything the generator needs: the cryptographic contract of a
/// credential, without its display metadata.
#[derive(Debug, Clone)]
pub struct OtpParams {
    /// TOTP or HOTP.
    pub otp_type: OtpType,
    /// Decoded shared secret (never empty).
    pub secret: SecretKey,
    /// HMAC hash.
    pub algorithm: OtpAlgorithm,
    /// Code length.
    pub digits: OtpDigits,
    /// Time step in seconds (TOTP only, always > 0).
    pub period: u32,
    /// Moving factor (HOTP only).
    pub counter: u64,
}

// ── Manual entry ────────────────────────────────────────────────────

/// Fields collected by a manual "add account" form.
///
/// Only `secret` is mandatory. The type/algorithm/digits/period/counter
/// overrides default to TOTP, SHA1, 6 digits, 30 s, counter 0.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    /// Issuer used as the label prefix.
    pub issuer: String,
    /// Account name (label suffix).
    pub account_name: String,
    /// Base32 secret text as typed; spaces and case are ignored.
    pub secret: String,
    /// Display group.
    pub group: Option<String>,
    /// Issuer to store instead of `issuer`, when non-blank.
    pub issuer_override: Option<String>,
    /// TOTP or HOTP.
    pub otp_type: OtpType,
    /// HMAC hash.
    pub algorithm: OtpAlgorithm,
    /// Code length.
    pub digits: OtpDigits,
    /// TOTP period in seconds; zero falls back to the default.
    pub period: u32,
    /// HOTP starting counter.
    pub counter: u64,
}

impl Default for ManualEntry {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            account_name: String::new(),
            secret: String::new(),
            group: None,
            issuer_override: None,
            otp_type: OtpType::Totp,
            algorithm: OtpAlgorithm::Sha1,
            digits: OtpDigits::SIX,
            period: DEFAULT_PERIOD,
            counter: DEFAULT_COUNTER,
        }
    }
}

// ── Credential ──────────────────────────────────────────────────────

/// A single OTP account.
#[derive(Debug, Clone)]
pub struct Credential {
    id: String,
    params: OtpParams,
    issuer: String,
    account_name: String,
    group: Option<String>,
    uri: String,
}

impl Credential {
    /// Build a credential from a key URI, keeping the trimmed input as `uri`.
    ///
    /// # Errors
    ///
    /// See [`keyuri::parse`].
    pub fn from_uri(uri: &str) -> Result<Self, OtpError> {
        let ParsedKeyUri {
            params,
            issuer,
            account_name,
        } = keyuri::parse(uri)?;
        Ok(Self {
            id: new_id(),
            params,
            issuer,
            account_name,
            group: None,
            uri: uri.trim().to_owned(),
        })
    }

    /// Build a credential from manual-entry fields and synthesize its URI.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::InvalidSecret`] if the secret is blank, not
    /// Base32, or decodes to nothing.
    pub fn from_manual(entry: &ManualEntry) -> Result<Self, OtpError> {
        if entry.secret.trim().is_empty() {
            return Err(OtpError::InvalidSecret("secret is empty".to_owned()));
        }
        let secret = keyuri::decode_secret(&entry.secret)?;

        let label_issuer = entry.issuer.trim();
        let account_name = entry.account_name.trim().to_owned();
        let issuer = entry
            .issuer_override
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(label_issuer)
            .to_owned();

        let period = if entry.period == 0 {
            DEFAULT_PERIOD
        } else {
            entry.period
        };
        let params = OtpParams {
            otp_type: entry.otp_type,
            secret,
            algorithm: entry.algorithm,
            digits: entry.digits,
            period,
            counter: entry.counter,
        };
        let uri = keyuri::build(&params, &issuer, &account_name);

        Ok(Self {
            id: new_id(),
            params,
            issuer,
            account_name,
            group: normalize_group(entry.group.as_deref()),
            uri,
        })
    }

    /// Rebuild a persisted credential from its stored URI and display fields.
    ///
    /// # Errors
    ///
    /// Same as [`Credential::from_uri`].
    pub fn restore(
        id: impl Into<String>,
        uri: &str,
        issuer: impl Into<String>,
        account_name: impl Into<String>,
        group: Option<&str>,
    ) -> Result<Self, OtpError> {
        let mut credential = Self::from_uri(uri)?;
        credential.id = id.into();
        credential.issuer = issuer.into();
        credential.account_name = account_name.into();
        credential.group = normalize_group(group);
        Ok(credential)
    }

    /// Return a copy of this credential with `group` set.
    #[must_use]
    pub fn with_group(mut self, group: Option<&str>) -> Self {
        self.set_group(group);
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Opaque unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// TOTP or HOTP.
    #[must_use]
    pub const fn otp_type(&self) -> OtpType {
        self.params.otp_type
    }

    /// Decoded shared secret.
    #[must_use]
    pub const fn secret(&self) -> &SecretKey {
        &self.params.secret
    }

    /// HMAC hash.
    #[must_use]
    pub const fn algorithm(&self) -> OtpAlgorithm {
        self.params.algorithm
    }

    /// Code length.
    #[must_use]
    pub const fn digits(&self) -> OtpDigits {
        self.params.digits
    }

    /// TOTP period in seconds.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.params.period
    }

    /// HOTP counter as stored in the URI.
    #[must_use]
    pub const fn counter(&self) -> u64 {
        self.params.counter
    }

    /// Cryptographic parameters.
    #[must_use]
    pub const fn params(&self) -> &OtpParams {
        &self.params
    }

    /// Display issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Display account name.
    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Display group, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The key URI this credential was created from (or synthesized).
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// A freshly synthesized URI reflecting the current fields.
    #[must_use]
    pub fn canonical_uri(&self) -> String {
        keyuri::build(&self.params, &self.issuer, &self.account_name)
    }

    // ── Display-field edits ─────────────────────────────────────────

    /// Replace the display issuer (trimmed).
    pub fn set_issuer(&mut self, issuer: &str) {
        issuer.trim().clone_into(&mut self.issuer);
    }

    /// Replace the display account name (trimmed).
    pub fn set_account_name(&mut self, account_name: &str) {
        account_name.trim().clone_into(&mut self.account_name);
    }

    /// Replace the display group; blank clears it.
    pub fn set_group(&mut self, group: Option<&str>) {
        self.group = normalize_group(group);
    }

    // ── Code generation ─────────────────────────────────────────────

    /// TOTP code at `time` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::WrongType`] for an HOTP credential.
    pub fn totp_code(&self, time: u64) -> Result<String, OtpError> {
        self.expect_type(OtpType::Totp)?;
        totp::generate_totp(
            self.params.secret.expose(),
            time,
            self.params.digits,
            self.params.period,
            self.params.algorithm,
        )
    }

    /// HOTP code at `counter`. The stored counter is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::WrongType`] for a TOTP credential.
    pub fn hotp_code(&self, counter: u64) -> Result<String, OtpError> {
        self.expect_type(OtpType::Hotp)?;
        totp::generate_hotp(
            self.params.secret.expose(),
            counter,
            self.params.digits,
            self.params.algorithm,
        )
    }

    /// Current code: TOTP at `time`, HOTP at the stored counter.
    ///
    /// # Errors
    ///
    /// Propagates generator errors (none are expected for a constructed
    /// credential).
    pub fn code_at(&self, time: u64) -> Result<String, OtpError> {
        match self.params.otp_type {
            OtpType::Totp => self.totp_code(time),
            OtpType::Hotp => self.hotp_code(self.params.counter),
        }
    }

    /// [`Credential::code_at`] using the wall clock.
    ///
    /// # Errors
    ///
    /// See [`Credential::code_at`].
    pub fn code_now(&self) -> Result<String, OtpError> {
        self.code_at(totp::unix_time_now())
    }

    /// Seconds until the TOTP code changes; `None` for HOTP.
    #[must_use]
    pub fn remaining_seconds(&self, time: u64) -> Option<u32> {
        match self.params.otp_type {
            OtpType::Totp => totp::remaining_seconds(time, self.params.period).ok(),
            OtpType::Hotp => None,
        }
    }

    fn expect_type(&self, expected: OtpType) -> Result<(), OtpError> {
        if self.params.otp_type == expected {
            Ok(())
        } else {
            Err(OtpError::WrongType {
                expected,
                actual: self.params.otp_type,
            })
        }
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Credential {}

impl Hash for Credential {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn normalize_group(group: Option<&str>) -> Option<String> {
    group
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_owned)
}

// ── Tests ───────────────────────────────────────────────────────────
