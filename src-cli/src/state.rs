//! Per-invocation application state: data directory, store and settings.

use std::fs;
use std::path::{Path, PathBuf};

use iifactor_otp::Credential;
use iifactor_store::{CredentialStore, JsonFileStore, Settings};

use crate::error::CliError;

/// Everything a command needs, opened once per process.
pub struct AppState {
    data_dir: PathBuf,
    /// Credential storage under `data_dir`.
    pub store: JsonFileStore,
    /// Settings loaded from `data_dir`.
    pub settings: Settings,
}

impl AppState {
    /// Open (creating if needed) the data directory and load settings.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if the directory cannot be created.
    pub fn open(data_dir: PathBuf) -> Result<Self, CliError> {
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
            tracing::info!(path = %data_dir.display(), "created data directory");
        }
        let settings = Settings::load(&data_dir);
        Ok(Self {
            store: JsonFileStore::new(&data_dir),
            settings,
            data_dir,
        })
    }

    /// The data directory in use.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Persist the in-memory settings.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if the write fails.
    pub fn save_settings(&self) -> Result<(), CliError> {
        self.settings.save(&self.data_dir)?;
        Ok(())
    }

    /// Find one stored credential by 1-based list position, exact id, or
    /// unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NoMatch`] or [`CliError::Ambiguous`].
    pub fn resolve(&self, selector: &str) -> Result<Credential, CliError> {
        resolve(self.store.load_all()?, selector)
    }
}

/// Default data directory: `$XDG_DATA_HOME/iifactor`, else
/// `$HOME/.local/share/iifactor`, else `./.iifactor`.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .map_or_else(|| PathBuf::from(".iifactor"), |base| base.join("iifactor"))
}

fn resolve(credentials: Vec<Credential>, selector: &str) -> Result<Credential, CliError> {
    let selector = selector.trim();

    if let Ok(position) = selector.parse::<usize>() {
        if let Some(credential) = position
            .checked_sub(1)
            .and_then(|idx| credentials.get(idx))
        {
            return Ok(credential.clone());
        }
    }

    if let Some(exact) = credentials.iter().find(|c| c.id() == selector) {
        return Ok(exact.clone());
    }

    let mut matches: Vec<Credential> = credentials
        .into_iter()
        .filter(|c| !selector.is_empty() && c.id().starts_with(selector))
        .collect();
    match matches.len() {
        0 => Err(CliError::NoMatch(selector.to_owned())),
        1 => Ok(matches.remove(0)),
        count => Err(CliError::Ambiguous {
            selector: selector.to_owned(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Vec<Credential> {
        ["a", "b", "c"]
            .iter()
            .map(|n| {
                Credential::restore(
                    format!("{n}{n}{n}-0000"),
                    "otpauth://totp/x?secret=JBSWY3DPEHPK3PXP",
                    "",
                    *n,
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn resolves_by_position() {
        assert_eq!(resolve(credentials(), "2").unwrap().account_name(), "b");
        assert!(matches!(
            resolve(credentials(), "4"),
            Err(CliError::NoMatch(_))
        ));
        assert!(matches!(
            resolve(credentials(), "0"),
            Err(CliError::NoMatch(_))
        ));
    }

    #[test]
    fn resolves_by_id_and_prefix() {
        assert_eq!(resolve(credentials(), "ccc-0000").unwrap().account_name(), "c");
        assert_eq!(resolve(credentials(), "bb").unwrap().account_name(), "b");
        assert!(matches!(resolve(credentials(), ""), Err(CliError::NoMatch(_))));
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        let mut all = credentials();
        all.push(
            Credential::restore("aaa-1111", "otpauth://totp/y?secret=JBSWY3DPEHPK3PXP", "", "d", None)
                .unwrap(),
        );
        assert!(matches!(
            resolve(all, "aaa"),
            Err(CliError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn open_creates_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("data");
        let state = AppState::open(nested.clone()).unwrap();
        assert!(nested.is_dir());
        assert_eq!(state.data_dir(), nested);
    }
}
