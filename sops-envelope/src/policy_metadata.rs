//! The policy fields stored in an envelope — pure data mirroring
//! [`sops_policy::PolicyConfig`], so an envelope can be read back into a
//! validated [`sops_policy::EncryptionPolicy`] without re-parsing a
//! `.sops.yaml` creation rule.

use serde::{Deserialize, Serialize};
use sops_policy::{EncryptionPolicy, PolicyConfig, PolicyError};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyMetadata {
    #[serde(rename = "unencrypted-suffix", default, skip_serializing_if = "Option::is_none")]
    pub unencrypted_suffix: Option<String>,
    #[serde(rename = "encrypted-suffix", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_suffix: Option<String>,
    #[serde(rename = "unencrypted-regex", default, skip_serializing_if = "Option::is_none")]
    pub unencrypted_regex: Option<String>,
    #[serde(rename = "encrypted-regex", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_regex: Option<String>,
    #[serde(rename = "unencrypted-comment-regex", default, skip_serializing_if = "Option::is_none")]
    pub unencrypted_comment_regex: Option<String>,
    #[serde(rename = "encrypted-comment-regex", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_comment_regex: Option<String>,
    #[serde(rename = "mac-only-encrypted", default)]
    pub mac_only_encrypted: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub overrides: HashMap<String, bool>,
}

impl PolicyMetadata {
    /// Compile this stored metadata back into a validated policy.
    pub fn to_policy(&self) -> Result<EncryptionPolicy, PolicyError> {
        let mut builder = PolicyConfig::new().with_mac_only_encrypted(self.mac_only_encrypted);
        if let Some(v) = &self.unencrypted_suffix {
            builder = builder.with_unencrypted_suffix(v.clone());
        }
        if let Some(v) = &self.encrypted_suffix {
            builder = builder.with_encrypted_suffix(v.clone());
        }
        if let Some(v) = &self.unencrypted_regex {
            builder = builder.with_unencrypted_regex(v.clone());
        }
        if let Some(v) = &self.encrypted_regex {
            builder = builder.with_encrypted_regex(v.clone());
        }
        if let Some(v) = &self.unencrypted_comment_regex {
            builder = builder.with_unencrypted_comment_regex(v.clone());
        }
        if let Some(v) = &self.encrypted_comment_regex {
            builder = builder.with_encrypted_comment_regex(v.clone());
        }
        for (path, encrypt) in &self.overrides {
            builder = builder.with_override(path.clone(), *encrypt);
        }
        builder.build()
    }
}
