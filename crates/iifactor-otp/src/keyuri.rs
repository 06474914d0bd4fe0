//! `otpauth://` key-URI parsing and synthesis.
//!
//! Fallback policy for optional parameters:
//! - `algorithm`: case-insensitive SHA1/SHA256/SHA512, anything else is SHA1
//! - `digits`: integer in `1..=MAX_DIGITS`, anything else is 6
//! - `period` (TOTP): positive integer, anything else is 30
//! - `counter` (HOTP): unsigned integer, anything else is 0
//!
//! When a query key repeats, the first occurrence wins.

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;
use zeroize::Zeroize;

use crate::base32;
use crate::credential::{OtpParams, OtpType};
use crate::memory::SecretKey;
use crate::totp::{OtpAlgorithm, OtpDigits, DEFAULT_COUNTER, DEFAULT_PERIOD};
use crate::OtpError;

/// URI scheme for OTP key URIs.
pub const SCHEME: &str = "otpauth";

/// Characters escaped inside one half of the label.
///
/// `:` is escaped so only the issuer/account separator stays literal.
const LABEL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

/// Result of parsing a key URI, before an id is assigned.
#[derive(Debug, Clone)]
pub struct ParsedKeyUri {
    /// Cryptographic parameters.
    pub params: OtpParams,
    /// `issuer` query parameter, else the label prefix, else empty.
    pub issuer: String,
    /// Label suffix after `:` (or the whole label).
    pub account_name: String,
}

/// Parse an `otpauth://{totp|hotp}/{label}?{query}` key URI.
///
/// # Errors
///
/// - [`OtpError::MalformedUri`] if the input is not a URI or the scheme is
///   not `otpauth`
/// - [`OtpError::UnsupportedType`] if the host is not `totp`/`hotp`
/// - [`OtpError::MissingSecret`] if there is no `secret` parameter
/// - [`OtpError::InvalidSecret`] if the secret is not Base32 or decodes to
///   nothing
pub fn parse(input: &str) -> Result<ParsedKeyUri, OtpError> {
    let url = Url::parse(input.trim()).map_err(|e| OtpError::MalformedUri(e.to_string()))?;
    if url.scheme() != SCHEME {
        return Err(OtpError::MalformedUri(format!(
            "expected scheme '{SCHEME}', got '{}'",
            url.scheme()
        )));
    }

    let host = url.host_str().unwrap_or_default();
    let otp_type = OtpType::from_host(host)
        .ok_or_else(|| OtpError::UnsupportedType(host.to_owned()))?;

    let raw_label = url.path().strip_prefix('/').unwrap_or_else(|| url.path());
    let label = percent_decode_str(raw_label).decode_utf8_lossy();
    let (label_issuer, account_name) = split_label(&label);

    let mut query: HashMap<String, String> = HashMap::new();
    for (key, value) in url.query_pairs() {
        query
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    let secret_text = query.get("secret").ok_or(OtpError::MissingSecret)?;
    let secret = decode_secret(secret_text)?;

    let issuer = query
        .get("issuer")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map_or(label_issuer, str::to_owned);

    let algorithm = query
        .get("algorithm")
        .map(|s| OtpAlgorithm::from_name_or_default(s.trim()))
        .unwrap_or_default();

    let digits = query
        .get("digits")
        .and_then(|s| s.trim().parse::<u8>().ok())
        .and_then(OtpDigits::new)
        .unwrap_or_default();

    let period = match otp_type {
        OtpType::Totp => query
            .get("period")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PERIOD),
        OtpType::Hotp => DEFAULT_PERIOD,
    };

    let counter = match otp_type {
        OtpType::Hotp => query
            .get("counter")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_COUNTER),
        OtpType::Totp => DEFAULT_COUNTER,
    };

    Ok(ParsedKeyUri {
        params: OtpParams {
            otp_type,
            secret,
            algorithm,
            digits,
            period,
            counter,
        },
        issuer,
        account_name,
    })
}

/// Synthesize a key URI from credential fields.
///
/// The label is `issuer:account` when the issuer is non-empty, otherwise
/// just the account. `issuer` is omitted from the query when empty.
#[must_use]
pub fn build(params: &OtpParams, issuer: &str, account_name: &str) -> String {
    let account = utf8_percent_encode(account_name, LABEL);
    let label = if issuer.is_empty() {
        account.to_string()
    } else {
        format!("{}:{account}", utf8_percent_encode(issuer, LABEL))
    };

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("secret", &base32::encode(params.secret.expose()));
    if !issuer.is_empty() {
        query.append_pair("issuer", issuer);
    }
    query.append_pair("algorithm", params.algorithm.as_str());
    query.append_pair("digits", &params.digits.value().to_string());
    match params.otp_type {
        OtpType::Totp => query.append_pair("period", &params.period.to_string()),
        OtpType::Hotp => query.append_pair("counter", &params.counter.to_string()),
    };

    format!(
        "{SCHEME}://{}/{label}?{}",
        params.otp_type.as_host(),
        query.finish()
    )
}

/// Rewrite the `counter` parameter of `uri`, keeping every other part.
///
/// The first `counter` pair is replaced and later duplicates dropped; the
/// pair is appended when absent.
///
/// # Errors
///
/// Returns [`OtpError::MalformedUri`] if `uri` is not a URI.
pub fn with_counter(uri: &str, counter: u64) -> Result<String, OtpError> {
    let mut url = Url::parse(uri.trim()).map_err(|e| OtpError::MalformedUri(e.to_string()))?;

    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == "counter" {
            if !replaced {
                pairs.push((key.into_owned(), counter.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push(("counter".to_owned(), counter.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}

/// Decode secret text (any case, spaces allowed) into a non-empty key.
///
/// # Errors
///
/// Returns [`OtpError::InvalidSecret`] on a Base32 error or an empty result.
pub fn decode_secret(text: &str) -> Result<SecretKey, OtpError> {
    let mut bytes = base32::decode(text)?;
    let key = SecretKey::new(&bytes);
    bytes.zeroize();
    key.ok_or_else(|| OtpError::InvalidSecret("secret is empty".to_owned()))
}

/// Split a decoded label on its first `:` into (issuer, account).
fn split_label(label: &str) -> (String, String) {
    label.split_once(':').map_or_else(
        || (String::new(), label.trim().to_owned()),
        |(issuer, account)| (issuer.trim().to_owned(), account.trim().to_owned()),
    )
}
