//! The metadata envelope: the `sops` branch (or sidecar block for binary
//! formats) a [`sops_store`]-adapted document carries alongside its
//! encrypted tree.

use crate::error::EnvelopeError;
use crate::legacy::RawEnvelope;
use crate::policy_metadata::PolicyMetadata;
use serde::{Deserialize, Serialize};
use sops_types::KeyGroup;
use time::OffsetDateTime;

/// Envelope versions this workspace can read and write. Bumped only on a
/// breaking change to the fields below.
pub const SUPPORTED_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    #[serde(rename = "shamir-threshold", default, skip_serializing_if = "Option::is_none")]
    pub shamir_threshold: Option<u8>,
    #[serde(rename = "key-groups")]
    pub key_groups: Vec<KeyGroup>,
    pub mac: String,
    #[serde(rename = "last-modified", with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    #[serde(flatten)]
    pub policy: PolicyMetadata,
}

impl Envelope {
    pub fn new(
        key_groups: Vec<KeyGroup>,
        shamir_threshold: Option<u8>,
        mac: String,
        last_modified: OffsetDateTime,
        policy: PolicyMetadata,
    ) -> Self {
        Envelope {
            version: SUPPORTED_VERSION.to_string(),
            shamir_threshold: shamir_threshold.filter(|t| *t > 1),
            key_groups,
            mac,
            last_modified,
            policy,
        }
    }

    /// Parse an envelope from its on-disk JSON shape, accepting either
    /// the current `key-groups` layout or the flat legacy layout (no
    /// `key-groups`, per-kind top-level lists), synthesizing a single
    /// implicit group from the latter.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EnvelopeError> {
        let raw: RawEnvelope =
            serde_json::from_value(value.clone()).map_err(|e| EnvelopeError::Other(Box::new(e)))?;
        raw.into_envelope()
    }

    /// Refuses only an unknown *major* version; a same-major minor bump
    /// like `"1.1"` reads fine against `SUPPORTED_VERSION = "1"`.
    pub fn verify_version(&self) -> Result<(), EnvelopeError> {
        let major = self.version.split('.').next().unwrap_or(&self.version);
        if major != SUPPORTED_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(self.version.clone()));
        }
        Ok(())
    }

    /// The effective Shamir threshold: `1` when unset, matching "no
    /// splitting, every master key wraps the full key" semantics.
    pub fn effective_threshold(&self) -> u8 {
        self.shamir_threshold.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sops_types::{MasterKeyKind, MasterKeyRef};

    fn sample_group() -> KeyGroup {
        KeyGroup::new(vec![MasterKeyRef::new(
            MasterKeyKind::Age,
            "age1...",
            "ENC[...]",
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
        )])
    }

    #[test]
    fn omits_threshold_when_trivial() {
        let env = Envelope::new(
            vec![sample_group()],
            Some(1),
            "ENC[...]".into(),
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
            PolicyMetadata::default(),
        );
        let json = serde_json::to_value(&env).unwrap();
        assert!(json.get("shamir-threshold").is_none());
        assert_eq!(env.effective_threshold(), 1);
    }

    #[test]
    fn keeps_threshold_when_splitting() {
        let env = Envelope::new(
            vec![sample_group(), sample_group(), sample_group()],
            Some(2),
            "ENC[...]".into(),
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
            PolicyMetadata::default(),
        );
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json.get("shamir-threshold").unwrap(), 2);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut env = Envelope::new(
            vec![sample_group()],
            None,
            "ENC[...]".into(),
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
            PolicyMetadata::default(),
        );
        env.version = "99".to_string();
        assert!(env.verify_version().is_err());
    }

    #[test]
    fn accepts_same_major_minor_version() {
        let mut env = Envelope::new(
            vec![sample_group()],
            None,
            "ENC[...]".into(),
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
            PolicyMetadata::default(),
        );
        env.version = "1.1".to_string();
        assert!(env.verify_version().is_ok());
    }

    #[test]
    fn round_trips_through_json() {
        let env = Envelope::new(
            vec![sample_group()],
            None,
            "ENC[...]".into(),
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            PolicyMetadata::default(),
        );
        let json = serde_json::to_value(&env).unwrap();
        let parsed = Envelope::from_json(&json).unwrap();
        assert_eq!(parsed.key_groups.len(), 1);
        assert_eq!(parsed.mac, "ENC[...]");
    }
}
