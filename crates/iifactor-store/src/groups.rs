//! Display-group filtering ("All", "Personal", "Work", ...).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use iifactor_otp::Credential;
use serde::{Deserialize, Serialize};

/// Which credentials a list view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum GroupFilter {
    /// Every credential.
    #[default]
    All,
    /// Credentials without a group.
    Ungrouped,
    /// Credentials in the named group (case-insensitive).
    Named(String),
}

impl GroupFilter {
    /// Whether `credential` belongs in this view.
    #[must_use]
    pub fn matches(&self, credential: &Credential) -> bool {
        match self {
            Self::All => true,
            Self::Ungrouped => credential.group().is_none(),
            Self::Named(name) => credential
                .group()
                .is_some_and(|group| group.eq_ignore_ascii_case(name)),
        }
    }

    /// Keep the matching credentials, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, credentials: &'a [Credential]) -> Vec<&'a Credential> {
        credentials.iter().filter(|c| self.matches(c)).collect()
    }
}

impl FromStr for GroupFilter {
    type Err = Infallible;

    /// `all` and `none` are reserved; anything else names a group.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else if s.eq_ignore_ascii_case("none") {
            Self::Ungrouped
        } else {
            Self::Named(s.to_owned())
        })
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Ungrouped => f.write_str("None"),
            Self::Named(name) => f.write_str(name),
        }
    }
}
