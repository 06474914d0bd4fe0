//! Command handlers.
//!
//! Each handler takes the opened [`AppState`] and returns the text to print
//! on stdout. Handlers never print themselves, so they can be tested
//! against a temporary data directory.

pub mod credentials;
pub mod settings;
pub mod transfer;

use iifactor_otp::{Credential, OtpType};
use serde::Serialize;

use crate::cli::Command;
use crate::error::CliError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Display-safe credential summary for `list --json`.
///
/// Never includes the secret or the key URI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDto {
    /// 1-based list position.
    pub position: usize,
    /// Credential id.
    pub id: String,
    /// Display issuer.
    pub issuer: String,
    /// Display account name.
    pub account_name: String,
    /// Display group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// `totp` or `hotp`.
    #[serde(rename = "type")]
    pub otp_type: OtpType,
    /// `SHA1`, `SHA256` or `SHA512`.
    pub algorithm: String,
    /// Code length.
    pub digits: u8,
    /// TOTP period in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    /// HOTP counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u64>,
}

impl CredentialDto {
    /// Summarize `credential` at list position `position`.
    #[must_use]
    pub fn new(position: usize, credential: &Credential) -> Self {
        let (period, counter) = match credential.otp_type() {
            OtpType::Totp => (Some(credential.period()), None),
            OtpType::Hotp => (None, Some(credential.counter())),
        };
        Self {
            position,
            id: credential.id().to_owned(),
            issuer: credential.issuer().to_owned(),
            account_name: credential.account_name().to_owned(),
            group: credential.group().map(str::to_owned),
            otp_type: credential.otp_type(),
            algorithm: credential.algorithm().as_str().to_owned(),
            digits: credential.digits().value(),
            period,
            counter,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one parsed command.
///
/// # Errors
///
/// Returns the handler's [`CliError`].
pub fn dispatch(state: &mut AppState, command: Command) -> Result<String, CliError> {
    match command {
        Command::AddUri { uri, group } => credentials::add_uri(state, &uri, group.as_deref()),
        Command::Add(args) => credentials::add(state, &args),
        Command::List { group, json } => credentials::list(state, group, json),
        Command::Code { selector, at } => credentials::code(state, selector.as_deref(), at),
        Command::Next { selector } => credentials::next(state, &selector),
        Command::Edit {
            selector,
            issuer,
            account,
            group,
        } => credentials::edit(
            state,
            &selector,
            issuer.as_deref(),
            account.as_deref(),
            group.as_deref(),
        ),
        Command::Delete { selector } => credentials::delete(state, &selector),
        Command::Move { selector, position } => credentials::move_to(state, &selector, position),
        Command::Import {
            file,
            group,
            keep_duplicates,
        } => transfer::import(state, &file, group.as_deref(), keep_duplicates),
        Command::Export { dir, stdout } => transfer::export(state, dir.as_deref(), stdout),
        Command::Settings(args) => settings::settings(state, &args),
    }
}

/// `Issuer (account)`, or whichever half is present.
#[must_use]
pub fn label(credential: &Credential) -> String {
    match (credential.issuer(), credential.account_name()) {
        ("", "") => "(unnamed)".to_owned(),
        (issuer, "") => issuer.to_owned(),
        ("", account) => account.to_owned(),
        (issuer, account) => format!("{issuer} ({account})"),
    }
}

/// First eight characters of the id, enough to select it again.
#[must_use]
pub fn short_id(credential: &Credential) -> &str {
    credential.id().get(..8).unwrap_or_else(|| credential.id())
}
