//! Credential persistence behind an explicit storage interface.
//!
//! The OTP core never touches storage; callers load credentials through a
//! [`CredentialStore`], generate codes, and save edits back. Each stored
//! record keeps only the key URI plus the display fields and list position;
//! the secret and OTP parameters are re-derived from the URI on load.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use iifactor_otp::{keyuri, Credential};
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Storage interface
// ---------------------------------------------------------------------------

/// Load-all / save-one / delete-one persistence for credentials.
pub trait CredentialStore {
    /// Every stored credential, in list order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn load_all(&self) -> Result<Vec<Credential>, StoreError>;

    /// Insert `credential` at the end of the list, or update the stored
    /// copy with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be written.
    fn save_one(&mut self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove the credential with `id`. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be written.
    fn delete_one(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Put the listed ids first, in the given order. Unknown ids are
    /// ignored; unlisted credentials follow in their previous order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be written.
    fn reorder(&mut self, ordered_ids: &[String]) -> Result<(), StoreError>;

    /// The credential with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no credential has that id.
    fn get(&self, id: &str) -> Result<Credential, StoreError> {
        self.load_all()?
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }
}

/// Return the HOTP code at the stored counter of credential `id`, then
/// persist the credential with its counter (and URI) advanced by one.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for an unknown id, and
/// [`StoreError::Otp`] for a TOTP credential.
pub fn next_hotp_code(store: &mut impl CredentialStore, id: &str) -> Result<String, StoreError> {
    let current = store.get(id)?;
    let code = current.hotp_code(current.counter())?;

    let next = current.counter().saturating_add(1);
    let uri = keyuri::with_counter(current.uri(), next)?;
    let advanced = Credential::restore(
        current.id(),
        &uri,
        current.issuer(),
        current.account_name(),
        current.group(),
    )?;
    store.save_one(&advanced)?;

    tracing::debug!(id, counter = next, "hotp counter advanced");
    Ok(code)
}

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// One persisted credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    /// Credential id.
    pub id: String,
    /// Key URI (original or synthesized).
    pub uri: String,
    /// Display issuer.
    pub issuer: String,
    /// Display account name.
    pub account_name: String,
    /// Display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// List position; lower sorts first.
    pub index: i64,
}

impl StoredCredential {
    fn from_credential(credential: &Credential, index: i64) -> Self {
        Self {
            id: credential.id().to_owned(),
            uri: credential.uri().to_owned(),
            issuer: credential.issuer().to_owned(),
            account_name: credential.account_name().to_owned(),
            group: credential.group().map(str::to_owned),
            index,
        }
    }

    /// Rebuild the credential this record describes.
    ///
    /// # Errors
    ///
    /// Returns the parser error if the stored URI no longer parses.
    pub fn to_credential(&self) -> Result<Credential, StoreError> {
        Ok(Credential::restore(
            self.id.clone(),
            &self.uri,
            self.issuer.clone(),
            self.account_name.clone(),
            self.group.as_deref(),
        )?)
    }
}

/// Ordered record list shared by both store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Records {
    #[serde(default)]
    credentials: Vec<StoredCredential>,
}

impl Records {
    fn sort(&mut self) {
        self.credentials.sort_by_key(|r| r.index);
    }

    fn upsert(&mut self, credential: &Credential) {
        if let Some(existing) = self.credentials.iter_mut().find(|r| r.id == credential.id()) {
            *existing = StoredCredential::from_credential(credential, existing.index);
            return;
        }
        let index = self
            .credentials
            .iter()
            .map(|r| r.index)
            .max()
            .map_or(0, |last| last.saturating_add(1));
        self.credentials
            .push(StoredCredential::from_credential(credential, index));
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.credentials.len();
        self.credentials.retain(|r| r.id != id);
        self.credentials.len() != before
    }

    fn reorder(&mut self, ordered_ids: &[String]) {
        self.sort();
        let mut reordered: Vec<StoredCredential> = Vec::with_capacity(self.credentials.len());
        for id in ordered_ids {
            if let Some(pos) = self.credentials.iter().position(|r| &r.id == id) {
                reordered.push(self.credentials.remove(pos));
            }
        }
        reordered.append(&mut self.credentials);
        for (index, record) in (0_i64..).zip(reordered.iter_mut()) {
            record.index = index;
        }
        self.credentials = reordered;
    }

    /// Credentials in list order; records whose URI fails to parse are
    /// skipped and logged rather than failing the whole load.
    fn to_credentials(&self) -> Vec<Credential> {
        let mut sorted: Vec<&StoredCredential> = self.credentials.iter().collect();
        sorted.sort_by_key(|r| r.index);
        sorted
            .into_iter()
            .filter_map(|record| match record.to_credential() {
                Ok(credential) => Some(credential),
                Err(e) => {
                    tracing::warn!(id = %record.id, "skipping stored credential: {e}");
                    None
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, for tests and for callers that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Records,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.records.to_credentials())
    }

    fn save_one(&mut self, credential: &Credential) -> Result<(), StoreError> {
        self.records.upsert(credential);
        Ok(())
    }

    fn delete_one(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(id))
    }

    fn reorder(&mut self, ordered_ids: &[String]) -> Result<(), StoreError> {
        self.records.reorder(ordered_ids);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

const CREDENTIALS_FILE: &str = "credentials.json";

/// Store backed by `{dir}/credentials.json`.
///
/// Every write rewrites the file atomically. A missing file reads as an
/// empty store; an unreadable one is an error (never silently replaced).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir`. The directory must exist before writing.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Directory holding the backing file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self) -> Result<Records, StoreError> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Records::default()),
            Err(e) => return Err(e.into()),
        };
        let mut records: Records = serde_json::from_str(&contents)?;
        records.sort();
        Ok(records)
    }

    fn write(&self, records: &Records) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.dir, CREDENTIALS_FILE, &json)?;
        tracing::debug!(
            path = %self.path().display(),
            count = records.credentials.len(),
            "credentials saved"
        );
        Ok(())
    }
}

impl CredentialStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.read()?.to_credentials())
    }

    fn save_one(&mut self, credential: &Credential) -> Result<(), StoreError> {
        let mut records = self.read()?;
        records.upsert(credential);
        self.write(&records)
    }

    fn delete_one(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.read()?;
        let removed = records.remove(id);
        if removed {
            self.write(&records)?;
        }
        Ok(removed)
    }

    fn reorder(&mut self, ordered_ids: &[String]) -> Result<(), StoreError> {
        let mut records = self.read()?;
        records.reorder(ordered_ids);
        self.write(&records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credential(account: &str) -> Credential {
        Credential::from_uri(&format!(
            "otpauth://totp/Example:{account}?secret=JBSWY3DPEHPK3PXP"
        ))
        .unwrap()
    }

    fn accounts(store: &impl CredentialStore) -> Vec<String> {
        store
            .load_all()
            .unwrap()
            .iter()
            .map(|c| c.account_name().to_owned())
            .collect()
    }

    #[test]
    fn save_appends_in_order() {
        let mut store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.save_one(&credential(name)).unwrap();
        }
        assert_eq!(accounts(&store), ["a", "b", "c"]);
    }

    #[test]
    fn save_existing_updates_in_place() {
        let mut store = MemoryStore::new();
        let mut first = credential("a");
        store.save_one(&first).unwrap();
        store.save_one(&credential("b")).unwrap();

        first.set_account_name("renamed");
        first.set_group(Some("Work"));
        store.save_one(&first).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id(), first.id());
        assert_eq!(loaded[0].account_name(), "renamed");
        assert_eq!(loaded[0].group(), Some("Work"));
    }

    #[test]
    fn delete_reports_whether_removed() {
        let mut store = MemoryStore::new();
        let a = credential("a");
        store.save_one(&a).unwrap();
        assert!(store.delete_one(a.id()).unwrap());
        assert!(!store.delete_one(a.id()).unwrap());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn deleted_id_is_not_reused_on_insert() {
        let mut store = MemoryStore::new();
        let a = credential("a");
        store.save_one(&a).unwrap();
        store.delete_one(a.id()).unwrap();
        let b = credential("b");
        store.save_one(&b).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn reorder_moves_listed_ids_first() {
        let mut store = MemoryStore::new();
        let creds: Vec<Credential> = ["a", "b", "c", "d"].iter().map(|n| credential(n)).collect();
        for c in &creds {
            store.save_one(c).unwrap();
        }
        store
            .reorder(&[
                creds[2].id().to_owned(),
                "unknown".to_owned(),
                creds[0].id().to_owned(),
            ])
            .unwrap();
        assert_eq!(accounts(&store), ["c", "a", "b", "d"]);

        // New inserts land after the reordered tail.
        store.save_one(&credential("e")).unwrap();
        assert_eq!(accounts(&store), ["c", "a", "b", "d", "e"]);
    }

    #[test]
    fn get_finds_by_id() {
        let mut store = MemoryStore::new();
        let a = credential("a");
        store.save_one(&a).unwrap();
        assert_eq!(store.get(a.id()).unwrap(), a);
        assert!(matches!(store.get("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn next_hotp_code_advances_stored_counter() {
        let mut store = MemoryStore::new();
        let hotp = Credential::from_uri(
            "otpauth://hotp/Test?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&counter=1",
        )
        .unwrap()
        .with_group(Some("Work"));
        store.save_one(&hotp).unwrap();

        // RFC 4226 counter 1.
        assert_eq!(next_hotp_code(&mut store, hotp.id()).unwrap(), "287082");
        let stored = store.get(hotp.id()).unwrap();
        assert_eq!(stored.counter(), 2);
        assert!(stored.uri().ends_with("counter=2"));
        assert_eq!(stored.group(), Some("Work"));

        let totp = credential("t");
        store.save_one(&totp).unwrap();
        assert!(matches!(
            next_hotp_code(&mut store, totp.id()),
            Err(StoreError::Otp(_))
        ));
        assert_eq!(store.get(totp.id()).unwrap().uri(), totp.uri());
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn json_store_roundtrips_display_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path());

        let mut a = credential("a");
        a.set_issuer("Renamed");
        a.set_group(Some("Personal"));
        store.save_one(&a).unwrap();

        let reopened = JsonFileStore::new(dir.path());
        let loaded = reopened.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), a.id());
        assert_eq!(loaded[0].issuer(), "Renamed");
        assert_eq!(loaded[0].group(), Some("Personal"));
        assert_eq!(loaded[0].uri(), a.uri());
        assert_eq!(loaded[0].secret().expose(), a.secret().expose());
    }

    #[test]
    fn json_store_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CREDENTIALS_FILE), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.load_all(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn json_store_skips_unparseable_records() {
        let dir = TempDir::new().unwrap();
        let good = credential("good");
        let records = Records {
            credentials: vec![
                StoredCredential {
                    id: "broken".into(),
                    uri: "otpauth://totp/x?issuer=NoSecret".into(),
                    issuer: String::new(),
                    account_name: "x".into(),
                    group: None,
                    index: 0,
                },
                StoredCredential::from_credential(&good, 1),
            ],
        };
        fs::write(
            dir.path().join(CREDENTIALS_FILE),
            serde_json::to_string(&records).unwrap(),
        )
        .unwrap();

        let loaded = JsonFileStore::new(dir.path()).load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), good.id());
    }

    #[test]
    fn stored_record_uses_camel_case() {
        let record = StoredCredential::from_credential(&credential("a"), 3);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("accountName"));
        assert!(json.contains(r#""index":3"#));
        assert!(!json.contains("group"), "empty group is omitted");
    }
}
