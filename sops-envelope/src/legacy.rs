//! Backward-compatible envelope parsing: the current `key-groups` layout,
//! or an older flat per-kind layout with no groups at all.

use crate::envelope::Envelope;
use crate::error::EnvelopeError;
use crate::policy_metadata::PolicyMetadata;
use serde::Deserialize;
use sops_types::{KeyGroup, MasterKeyRef};
use time::OffsetDateTime;

#[derive(Deserialize)]
pub(crate) struct RawEnvelope {
    pub version: String,
    #[serde(rename = "shamir-threshold", default)]
    pub shamir_threshold: Option<u8>,
    #[serde(rename = "key-groups", default)]
    pub key_groups: Option<Vec<KeyGroup>>,

    // Flat per-kind lists from the pre-key-groups layout. Absent in any
    // document written by this workspace; only read.
    #[serde(default)]
    pub kms: Option<Vec<MasterKeyRef>>,
    #[serde(default)]
    pub gcp_kms: Option<Vec<MasterKeyRef>>,
    #[serde(default)]
    pub azure_kv: Option<Vec<MasterKeyRef>>,
    #[serde(default)]
    pub hc_vault: Option<Vec<MasterKeyRef>>,
    #[serde(default)]
    pub pgp: Option<Vec<MasterKeyRef>>,
    #[serde(default)]
    pub age: Option<Vec<MasterKeyRef>>,

    pub mac: String,
    #[serde(rename = "last-modified", with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    #[serde(flatten)]
    pub policy: PolicyMetadata,
}

impl RawEnvelope {
    /// Tries the current shape first (`key-groups` present), falling back
    /// to synthesizing one implicit group from whichever flat per-kind
    /// lists are present — explicit match-based dispatch rather than a
    /// serde `#[serde(untagged)]` enum, which gives much worse error
    /// messages when neither shape matches.
    pub fn into_envelope(self) -> Result<Envelope, EnvelopeError> {
        let key_groups = match self.key_groups {
            Some(groups) if !groups.is_empty() => groups,
            _ => {
                let mut flat = Vec::new();
                flat.extend(self.kms.into_iter().flatten());
                flat.extend(self.gcp_kms.into_iter().flatten());
                flat.extend(self.azure_kv.into_iter().flatten());
                flat.extend(self.hc_vault.into_iter().flatten());
                flat.extend(self.pgp.into_iter().flatten());
                flat.extend(self.age.into_iter().flatten());
                if flat.is_empty() {
                    return Err(EnvelopeError::NoKeyMaterial);
                }
                vec![KeyGroup::new(flat)]
            }
        };

        Ok(Envelope {
            version: self.version,
            shamir_threshold: self.shamir_threshold,
            key_groups,
            mac: self.mac,
            last_modified: self.last_modified,
            policy: self.policy,
        })
    }
}
