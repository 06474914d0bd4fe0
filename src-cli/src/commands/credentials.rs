//! Credential commands: add, list, codes, edit, delete, reorder.

use std::fmt::Write as _;

use iifactor_otp::{format_code, unix_time_now, Credential, ManualEntry, OtpDigits, OtpType};
use iifactor_store::{next_hotp_code, CredentialStore, GroupFilter};

use super::{label, short_id, CredentialDto};
use crate::cli::AddArgs;
use crate::error::CliError;
use crate::state::AppState;

/// `add-uri`: parse a key URI and append it.
pub fn add_uri(state: &mut AppState, uri: &str, group: Option<&str>) -> Result<String, CliError> {
    let credential = Credential::from_uri(uri)?.with_group(state.settings.group_for_new(group));
    save_new(state, &credential)
}

/// `add`: build a credential from individual fields and append it.
pub fn add(state: &mut AppState, args: &AddArgs) -> Result<String, CliError> {
    let digits = OtpDigits::new(args.digits)
        .ok_or_else(|| CliError::Usage(format!("digits must be 1-10, got {}", args.digits)))?;
    let entry = ManualEntry {
        issuer: args.issuer.clone(),
        account_name: args.account.clone(),
        secret: args.secret.clone(),
        group: state
            .settings
            .group_for_new(args.group.as_deref())
            .map(str::to_owned),
        issuer_override: None,
        otp_type: args.otp_type.into(),
        algorithm: args.algorithm,
        digits,
        period: args.period,
        counter: args.counter,
    };
    let credential = Credential::from_manual(&entry)?;
    save_new(state, &credential)
}

fn save_new(state: &mut AppState, credential: &Credential) -> Result<String, CliError> {
    state.store.save_one(credential)?;
    tracing::info!(id = %credential.id(), "credential added");
    Ok(format!("Added {} [{}]\n", label(credential), short_id(credential)))
}

/// `list`: table or JSON of the credentials in `filter` (or the default view).
pub fn list(state: &AppState, filter: Option<GroupFilter>, json: bool) -> Result<String, CliError> {
    let filter = filter.unwrap_or_else(|| state.settings.default_view.clone());
    let all = state.store.load_all()?;
    let visible: Vec<(usize, &Credential)> = positioned(&all)
        .filter(|(_, c)| filter.matches(c))
        .collect();

    if json {
        let dtos: Vec<CredentialDto> = visible
            .iter()
            .map(|(position, c)| CredentialDto::new(*position, c))
            .collect();
        let mut out = serde_json::to_string_pretty(&dtos)?;
        out.push('\n');
        return Ok(out);
    }

    if visible.is_empty() {
        return Ok(format!("No credentials in view '{filter}'.\n"));
    }
    let mut out = String::new();
    for (position, credential) in visible {
        let _ = writeln!(
            out,
            "{position:>3}  {}  {}  {}{}",
            short_id(credential),
            credential.otp_type(),
            label(credential),
            credential
                .group()
                .map(|g| format!("  [{g}]"))
                .unwrap_or_default(),
        );
    }
    Ok(out)
}

/// `code`: one credential's current code, or every credential in the
/// default view.
pub fn code(state: &AppState, selector: Option<&str>, at: Option<u64>) -> Result<String, CliError> {
    let time = at.unwrap_or_else(unix_time_now);

    if let Some(selector) = selector {
        let credential = state.resolve(selector)?;
        return Ok(format!("{}\n", code_line(&credential, time)?));
    }

    let all = state.store.load_all()?;
    let mut out = String::new();
    for credential in state.settings.default_view.apply(&all) {
        let _ = writeln!(out, "{}", code_line(credential, time)?);
    }
    Ok(out)
}

fn code_line(credential: &Credential, time: u64) -> Result<String, CliError> {
    let code = format_code(&credential.code_at(time)?);
    Ok(match credential.otp_type() {
        OtpType::Totp => format!(
            "{code}  {}  ({}s)",
            label(credential),
            credential.remaining_seconds(time).unwrap_or_default()
        ),
        OtpType::Hotp => format!(
            "{code}  {}  (counter {})",
            label(credential),
            credential.counter()
        ),
    })
}

/// `next`: print the HOTP code at the stored counter, then advance and
/// persist the counter.
pub fn next(state: &mut AppState, selector: &str) -> Result<String, CliError> {
    let credential = state.resolve(selector)?;
    let code = next_hotp_code(&mut state.store, credential.id())?;
    Ok(format!("{}\n", format_code(&code)))
}

/// `edit`: change display fields; the key URI is left untouched.
pub fn edit(
    state: &mut AppState,
    selector: &str,
    issuer: Option<&str>,
    account: Option<&str>,
    group: Option<&str>,
) -> Result<String, CliError> {
    if issuer.is_none() && account.is_none() && group.is_none() {
        return Err(CliError::Usage(
            "nothing to change; pass --issuer, --account or --group".to_owned(),
        ));
    }
    let mut credential = state.resolve(selector)?;
    if let Some(issuer) = issuer {
        credential.set_issuer(issuer);
    }
    if let Some(account) = account {
        credential.set_account_name(account);
    }
    if let Some(group) = group {
        credential.set_group(Some(group));
    }
    state.store.save_one(&credential)?;
    Ok(format!("Updated {} [{}]\n", label(&credential), short_id(&credential)))
}

/// `delete`: remove one credential.
pub fn delete(state: &mut AppState, selector: &str) -> Result<String, CliError> {
    let credential = state.resolve(selector)?;
    if !state.store.delete_one(credential.id())? {
        return Err(CliError::NoMatch(selector.to_owned()));
    }
    tracing::info!(id = %credential.id(), "credential deleted");
    Ok(format!("Deleted {}\n", label(&credential)))
}

/// `move`: place one credential at a 1-based position.
pub fn move_to(state: &mut AppState, selector: &str, position: usize) -> Result<String, CliError> {
    let target = position
        .checked_sub(1)
        .ok_or_else(|| CliError::Usage("positions start at 1".to_owned()))?;
    let credential = state.resolve(selector)?;

    let mut ids: Vec<String> = state
        .store
        .load_all()?
        .iter()
        .map(|c| c.id().to_owned())
        .filter(|id| id != credential.id())
        .collect();
    let target = target.min(ids.len());
    ids.insert(target, credential.id().to_owned());
    state.store.reorder(&ids)?;

    Ok(format!(
        "Moved {} to position {}\n",
        label(&credential),
        target.saturating_add(1)
    ))
}

fn positioned(credentials: &[Credential]) -> impl Iterator<Item = (usize, &Credential)> {
    (1_usize..).zip(credentials)
}
