//! `iifactor-store`: credential persistence and file exchange for IIFactor.
//!
//! Everything here sits on top of the pure `iifactor-otp` core: the
//! [`CredentialStore`] interface with in-memory and JSON-file backends,
//! display groups, user settings, and plain-text key URI import/export.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

mod atomic;
pub mod error;

pub mod store;

pub mod groups;
pub mod settings;

pub mod export;
pub mod import;

pub use error::StoreError;
pub use export::{export_file_name, export_text, write_export};
pub use groups::GroupFilter;
pub use import::{
    check_duplicates, find_duplicates, import_credentials, parse_key_uri_text, DuplicateInfo,
    ImportSummary, MalformedLine, ParsedImport,
};
pub use settings::Settings;
pub use store::{next_hotp_code, CredentialStore, JsonFileStore, MemoryStore, StoredCredential};
