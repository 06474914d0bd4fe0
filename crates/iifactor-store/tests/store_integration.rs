#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for the JSON-file credential store.
//!
//! Exercises the full lifecycle against a real directory: add, edit,
//! reorder, delete, reopen, and code generation from reloaded records.

use iifactor_otp::{Credential, ManualEntry, OtpAlgorithm, OtpDigits, OtpType};
use iifactor_store::{
    next_hotp_code, CredentialStore, GroupFilter, JsonFileStore, MemoryStore, Settings,
};
use proptest::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

fn totp(account: &str) -> Credential {
    Credential::from_uri(&format!(
        "otpauth://totp/Example:{account}?secret={RFC_SECRET}&issuer=Example&digits=8"
    ))
    .unwrap()
}

fn names(store: &impl CredentialStore) -> Vec<String> {
    store
        .load_all()
        .unwrap()
        .iter()
        .map(|c| c.account_name().to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn full_lifecycle_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::new(dir.path());

    let alice = totp("alice");
    let mut bob = totp("bob");
    let carol = totp("carol");
    for c in [&alice, &bob, &carol] {
        store.save_one(c).unwrap();
    }

    bob.set_issuer("Renamed Inc");
    bob.set_group(Some("Work"));
    store.save_one(&bob).unwrap();

    store
        .reorder(&[carol.id().to_owned(), alice.id().to_owned()])
        .unwrap();
    assert!(store.delete_one(alice.id()).unwrap());

    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(names(&reopened), ["carol", "bob"]);

    let loaded_bob = reopened.get(bob.id()).unwrap();
    assert_eq!(loaded_bob.issuer(), "Renamed Inc");
    assert_eq!(loaded_bob.group(), Some("Work"));
    assert_eq!(loaded_bob.uri(), bob.uri());
}

#[test]
fn reloaded_credentials_generate_the_same_codes() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let original = totp("alice");
    store.save_one(&original).unwrap();

    let loaded = store.get(original.id()).unwrap();
    // RFC 6238 SHA-1 vector at T = 59.
    assert_eq!(loaded.totp_code(59).unwrap(), "94287082");
    assert_eq!(loaded.totp_code(59).unwrap(), original.totp_code(59).unwrap());
}

#[test]
fn hotp_counter_advance_is_persisted() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::new(dir.path());

    let entry = ManualEntry {
        issuer: "Bank".into(),
        account_name: "bob".into(),
        secret: RFC_SECRET.into(),
        otp_type: OtpType::Hotp,
        algorithm: OtpAlgorithm::Sha1,
        digits: OtpDigits::SIX,
        counter: 0,
        ..ManualEntry::default()
    };
    let credential = Credential::from_manual(&entry).unwrap();
    store.save_one(&credential).unwrap();

    // RFC 4226 counter 0 and 1.
    assert_eq!(next_hotp_code(&mut store, credential.id()).unwrap(), "755224");

    let reloaded = JsonFileStore::new(dir.path()).get(credential.id()).unwrap();
    assert_eq!(reloaded.counter(), 1);
    assert_eq!(reloaded.hotp_code(reloaded.counter()).unwrap(), "287082");
    assert_eq!(names(&store).len(), 1);
}

#[test]
fn settings_and_store_share_a_directory() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        default_group: Some("Personal".into()),
        default_view: GroupFilter::Named("Personal".into()),
    };
    settings.save(dir.path()).unwrap();

    let mut store = JsonFileStore::new(dir.path());
    let credential = totp("alice").with_group(settings.group_for_new(None));
    store.save_one(&credential).unwrap();
    store.save_one(&totp("bob")).unwrap();

    let settings = Settings::load(dir.path());
    let all = store.load_all().unwrap();
    let visible = settings.default_view.apply(&all);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].account_name(), "alice");
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn reorder_is_a_permutation(count in 1usize..8, picks in proptest::collection::vec(0usize..10, 0..10)) {
        let mut store = MemoryStore::new();
        let creds: Vec<Credential> = (0..count).map(|i| totp(&format!("user{i}"))).collect();
        for c in &creds {
            store.save_one(c).unwrap();
        }

        let ids: Vec<String> = picks
            .iter()
            .map(|&p| creds.get(p).map_or_else(|| format!("unknown-{p}"), |c| c.id().to_owned()))
            .collect();
        store.reorder(&ids).unwrap();

        let mut after: Vec<String> = store.load_all().unwrap().iter().map(|c| c.id().to_owned()).collect();
        prop_assert_eq!(after.len(), count);

        // The first listed known id always ends up first.
        if let Some(first) = ids.iter().find(|id| creds.iter().any(|c| c.id() == id.as_str())) {
            prop_assert_eq!(&after[0], first);
        }

        let mut before: Vec<String> = creds.iter().map(|c| c.id().to_owned()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
