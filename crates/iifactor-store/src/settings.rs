//! Application settings, stored as plain JSON next to the credentials.
//!
//! Settings are passed explicitly to whoever needs them; there is no global
//! settings object.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::groups::GroupFilter;

// ── Top-level settings ─────────────────────────────────────────────

/// User settings.
///
/// Persisted to `{data_dir}/settings.json`. All fields have defaults via
/// [`Default`], and missing fields in the file fall back individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Group given to new credentials when the caller does not choose one.
    #[serde(default)]
    pub default_group: Option<String>,

    /// Group filter shown first when listing credentials.
    #[serde(default)]
    pub default_view: GroupFilter,
}

impl Settings {
    /// The group for a new credential: `explicit` if given and non-blank,
    /// otherwise the configured default.
    #[must_use]
    pub fn group_for_new<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .or_else(|| self.default_group.as_deref())
    }
}

// ── File I/O ───────────────────────────────────────────────────────

const SETTINGS_FILE: &str = "settings.json";

impl Settings {
    /// Load settings from `{data_dir}/settings.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or
    /// contains invalid JSON (corrupt-file recovery).
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "settings file is corrupt, using defaults: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to `{data_dir}/settings.json` atomically.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write/rename.
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_atomic(data_dir, SETTINGS_FILE, &json)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_values_are_correct() {
        let settings = Settings::default();
        assert_eq!(settings.default_group, None);
        assert_eq!(settings.default_view, GroupFilter::All);
    }

    #[test]
    fn load_returns_default_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            default_group: Some("Work".into()),
            default_view: GroupFilter::Named("Personal".into()),
        };

        settings.save(dir.path()).unwrap();
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn load_recovers_from_corrupt_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ this is not valid json }}}").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn load_handles_partial_json_with_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{"defaultGroup":"Work"}"#).unwrap();

        let settings = Settings::load(dir.path());
        assert_eq!(settings.default_group.as_deref(), Some("Work"));
        assert_eq!(settings.default_view, GroupFilter::All);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("defaultGroup"));
        assert!(json.contains("defaultView"));
        assert!(!json.contains("default_group"));
    }

    #[test]
    fn explicit_group_beats_default() {
        let settings = Settings {
            default_group: Some("Work".into()),
            ..Settings::default()
        };
        assert_eq!(settings.group_for_new(Some("Personal")), Some("Personal"));
        assert_eq!(settings.group_for_new(Some("  ")), Some("Work"));
        assert_eq!(settings.group_for_new(None), Some("Work"));
        assert_eq!(Settings::default().group_for_new(None), None);
    }
}
