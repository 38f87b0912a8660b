//! The `MasterKey` contract every backend variant implements.

use crate::error::MasterKeyError;
use async_trait::async_trait;
use sops_types::DataKey;

/// One wrapped copy of a data key under a single master key backend.
///
/// The orchestrator never branches on which backend it's holding outside
/// this trait — all variant-specific behavior (cloud KMS envelope
/// encryption, OpenPGP, age recipients, passphrase KDF) is encapsulated
/// behind these five methods.
///
/// A `MasterKey` instance constructed for `encrypt` need not support
/// `decrypt` (it has no ciphertext yet), and vice versa for one
/// constructed from an existing [`sops_types::MasterKeyRef`] — backend
/// crates document which constructor produces which.
#[async_trait]
pub trait MasterKey: Send + Sync {
    /// Wrap `data_key`, returning the ciphertext string stored in the
    /// envelope. Deterministic only in which identifier it reports, not in
    /// ciphertext bytes; re-wrapping the same key is allowed and need not
    /// be byte-equal to a previous wrap.
    async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError>;

    /// Unwrap this master key's internally held ciphertext, returning the
    /// recovered data key (or share).
    async fn decrypt(&self) -> Result<DataKey, MasterKeyError>;

    /// Variant-specific freshness hint: should this master key be rotated?
    fn needs_rotation(&self) -> bool;

    /// The `kind` string stored in the envelope (`"age"`, `"pgp"`, ...).
    fn type_identifier(&self) -> &'static str;

    /// Serialize this master key's public metadata (identifier, wrapped
    /// data key, per-kind fields) for the envelope. Never includes
    /// unwrapped key material.
    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value>;
}
