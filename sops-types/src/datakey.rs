//! The symmetric data key that the leaf cipher and the integrity MAC are
//! both keyed from.
//!
//! Mirrors the scoped-exposure shape used for secret material elsewhere in
//! this codebase: the raw bytes never escape as an owned `Vec<u8>` or
//! `String`, there is no `Clone`/`Display`/`Serialize`, and the only way to
//! read the bytes is [`DataKey::with_bytes`], which hands a short-lived
//! borrow to a closure.

use rand::RngCore;
use zeroize::Zeroizing;

/// Length in bytes of a data key (AES-256 / ChaCha20 key size).
pub const DATA_KEY_LEN: usize = 32;

/// A 32-byte symmetric key, zeroized on drop.
pub struct DataKey(Zeroizing<[u8; DATA_KEY_LEN]>);

impl DataKey {
    /// Generate a fresh random data key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; DATA_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        DataKey(Zeroizing::new(bytes))
    }

    /// Wrap an existing 32-byte key, e.g. one just unwrapped from a master
    /// key or reconstructed from Shamir shares.
    pub fn from_bytes(bytes: [u8; DATA_KEY_LEN]) -> Self {
        DataKey(Zeroizing::new(bytes))
    }

    /// Build from a slice, failing if the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DataKeyError> {
        if bytes.len() != DATA_KEY_LEN {
            return Err(DataKeyError::WrongLength(bytes.len()));
        }
        let mut arr = [0u8; DATA_KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(DataKey::from_bytes(arr))
    }

    /// Expose the raw key bytes to `f` for the duration of the call only.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8; DATA_KEY_LEN]) -> R) -> R {
        f(&self.0)
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataKey").field("bytes", &"<redacted>").finish()
    }
}

/// Errors constructing a [`DataKey`] from untrusted input.
#[derive(Debug, thiserror::Error)]
pub enum DataKeyError {
    #[error("expected {DATA_KEY_LEN}-byte data key, got {0} bytes")]
    WrongLength(usize),
}
