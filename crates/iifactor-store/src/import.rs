//! Bulk import of plain-text key URI lists.
//!
//! The input is one `otpauth://` URI per line, as written by
//! [`crate::export::export_text`]. Parsing, duplicate detection and the
//! actual store writes are separate steps so a caller can show the user
//! what will happen before committing.

use iifactor_otp::Credential;
use serde::Serialize;

use crate::error::StoreError;
use crate::store::CredentialStore;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Result of parsing an import file.
#[derive(Debug, Default)]
pub struct ParsedImport {
    /// Credentials parsed from valid lines, in file order.
    pub entries: Vec<Credential>,
    /// Non-blank lines that did not parse.
    pub malformed: Vec<MalformedLine>,
}

/// A line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedLine {
    /// 1-based line number in the input.
    pub line: usize,
    /// Parser error message.
    pub reason: String,
}

/// A parsed entry that matches a credential already in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateInfo {
    /// Index in [`ParsedImport::entries`].
    pub index: usize,
    /// Issuer of the parsed entry.
    pub issuer: String,
    /// Account name of the parsed entry.
    pub account_name: String,
    /// ID of the existing credential.
    pub existing_id: String,
}

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Number of credentials saved.
    pub imported: usize,
    /// Number of entries skipped at the caller's request.
    pub skipped: usize,
    /// IDs of the saved credentials.
    pub imported_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `text` as one key URI per line.
///
/// Lines are trimmed and blank lines ignored. Every parsed credential is
/// placed in `group`. Lines that fail to parse are collected in
/// [`ParsedImport::malformed`] and never abort the import.
#[must_use]
pub fn parse_key_uri_text(text: &str, group: Option<&str>) -> ParsedImport {
    let mut parsed = ParsedImport::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match Credential::from_uri(line) {
            Ok(credential) => parsed.entries.push(credential.with_group(group)),
            Err(e) => {
                let line_number = idx.saturating_add(1);
                tracing::debug!(line = line_number, "skipping malformed import line: {e}");
                parsed.malformed.push(MalformedLine {
                    line: line_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    parsed
}

// ---------------------------------------------------------------------------
// Duplicate detection
// ---------------------------------------------------------------------------

/// Find parsed entries whose lowercase (issuer, account name) pair already
/// exists in `existing`.
#[must_use]
pub fn find_duplicates(existing: &[Credential], entries: &[Credential]) -> Vec<DuplicateInfo> {
    let key = |c: &Credential| (c.issuer().to_lowercase(), c.account_name().to_lowercase());

    let mut duplicates = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let entry_key = key(entry);
        for current in existing.iter().filter(|c| key(c) == entry_key) {
            duplicates.push(DuplicateInfo {
                index,
                issuer: entry.issuer().to_owned(),
                account_name: entry.account_name().to_owned(),
                existing_id: current.id().to_owned(),
            });
        }
    }
    duplicates
}

/// [`find_duplicates`] against everything in `store`.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be read.
pub fn check_duplicates(
    store: &impl CredentialStore,
    entries: &[Credential],
) -> Result<Vec<DuplicateInfo>, StoreError> {
    Ok(find_duplicates(&store.load_all()?, entries))
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

/// Save every entry not listed in `skip_indices`, appending to the store
/// in input order.
///
/// # Errors
///
/// Returns the first [`StoreError`] from the store. Entries saved before
/// the failure stay saved.
pub fn import_credentials(
    store: &mut impl CredentialStore,
    entries: &[Credential],
    skip_indices: &[usize],
) -> Result<ImportSummary, StoreError> {
    let mut imported_ids = Vec::new();
    let mut skipped = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        if skip_indices.contains(&idx) {
            skipped = skipped.saturating_add(1);
            continue;
        }
        store.save_one(entry)?;
        imported_ids.push(entry.id().to_owned());
    }

    tracing::info!(imported = imported_ids.len(), skipped, "import finished");

    Ok(ImportSummary {
        imported: imported_ids.len(),
        skipped,
        imported_ids,
    })
}
