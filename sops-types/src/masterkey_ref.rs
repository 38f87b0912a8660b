//! A serialized reference to one master key's wrapped copy of the data key.
//!
//! This is pure data — the metadata envelope's view of a master key. The
//! actual wrap/unwrap behavior lives behind the `MasterKey` trait in
//! `sops-masterkey`; this crate only needs to describe what gets written to
//! disk.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Which master key backend a [`MasterKeyRef`] was produced by.
///
/// Mirrors the telemetry-safe `.kind()` tag pattern used for secret
/// sources elsewhere: safe to log, never contains key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MasterKeyKind {
    KmsAws,
    KmsGcp,
    KmsVault,
    Pgp,
    Age,
    Passphrase,
}

impl MasterKeyKind {
    /// A short, log-safe tag for this kind. Never includes key material.
    pub fn as_tag(&self) -> &'static str {
        match self {
            MasterKeyKind::KmsAws => "kms-aws",
            MasterKeyKind::KmsGcp => "kms-gcp",
            MasterKeyKind::KmsVault => "kms-vault",
            MasterKeyKind::Pgp => "pgp",
            MasterKeyKind::Age => "age",
            MasterKeyKind::Passphrase => "passphrase",
        }
    }
}

/// A single master key's wrapped copy of a data key (or data-key share),
/// plus the bookkeeping needed to decide when it should be rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterKeyRef {
    pub kind: MasterKeyKind,
    /// Opaque identifier within `kind` — key ARN, fingerprint, recipient
    /// string, etc. Safe to log.
    pub identifier: String,
    /// Base64 ciphertext produced by this master key's `wrap`.
    pub wrapped_data_key: String,
    pub created_at: OffsetDateTime,
    /// Backend-specific fields that don't fit the common shape (e.g. a KMS
    /// key's AWS profile/role, an age recipient's extra context).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MasterKeyRef {
    pub fn new(
        kind: MasterKeyKind,
        identifier: impl Into<String>,
        wrapped_data_key: impl Into<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        MasterKeyRef {
            kind,
            identifier: identifier.into(),
            wrapped_data_key: wrapped_data_key.into(),
            created_at,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable_strings() {
        assert_eq!(MasterKeyKind::Age.as_tag(), "age");
        assert_eq!(MasterKeyKind::KmsAws.as_tag(), "kms-aws");
    }

    #[test]
    fn serializes_without_empty_extra() {
        let r = MasterKeyRef::new(
            MasterKeyKind::Age,
            "age1abc...",
            "ENC[...]",
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
        );
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("extra").is_none());
    }
}
