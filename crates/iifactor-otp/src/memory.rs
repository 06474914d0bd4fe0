//! Secret key container.
//!
//! Key bytes are held in a [`SecretSlice`] so they are zeroized on drop and
//! never printed by `Debug`.

use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

/// Decoded OTP shared secret.
///
/// Construction goes through [`SecretKey::new`], which refuses empty input,
/// so a `SecretKey` always holds at least one byte.
pub struct SecretKey {
    inner: SecretSlice<u8>,
}

impl SecretKey {
    /// Wrap decoded key bytes. Returns `None` for an empty key.
    ///
    /// The caller should zeroize `bytes` afterwards if it keeps them.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            inner: bytes.to_vec().into(),
        })
    }

    /// Borrow the raw key bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self {
            inner: self.expose().to_vec().into(),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}
