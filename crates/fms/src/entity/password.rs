//! Salted password digests for staff and passenger accounts.

use serde::{Deserialize, Serialize};

use super::require_non_blank;
use crate::error::{Error, Result};

/// Scheme tag written in front of every stored digest.
const SCHEME: &str = "blake3";

/// Bytes of random salt per password.
const SALT_LEN: usize = 16;

/// A salted password digest, stored as `blake3$<salt>$<digest>`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a plain-text password with a fresh random salt.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank password.
    pub fn create(password: &str) -> Result<Self> {
        require_non_blank("password", password)?;
        let salt: [u8; SALT_LEN] = rand::random();
        let salt = hex::encode(salt);
        let digest = digest(&salt, password.trim());
        Ok(Self(format!("{SCHEME}${salt}${digest}")))
    }

    /// Check a plain-text password against this digest.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        match self.parts() {
            Some((salt, expected)) => digest(salt, password.trim()) == expected,
            None => false,
        }
    }

    /// Check the stored string has the expected layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the digest is malformed.
    pub fn validate(&self) -> Result<()> {
        if self.parts().is_none() {
            return Err(Error::validation("password", "stored digest is malformed"));
        }
        Ok(())
    }

    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> Option<(&str, &str)> {
        let mut parts = self.0.splitn(3, '$');
        let scheme = parts.next()?;
        let salt = parts.next()?;
        let digest = parts.next()?;
        (scheme == SCHEME && !salt.is_empty() && digest.len() == 64).then_some((salt, digest))
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}
