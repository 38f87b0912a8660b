//! AWS KMS master key backend (`cloud-kms-a`).
//!
//! This is a deliberate stub: real envelope encryption against AWS KMS
//! needs an AWS SDK client, credential resolution, and region routing,
//! none of which are in scope here. The shape — identifier parsing,
//! `MasterKey` impl, error mapping — is real; `encrypt`/`decrypt` report
//! [`sops_masterkey::MasterKeyError::BackendUnavailable`] naming the stub
//! rather than silently succeeding with fake ciphertext.

use async_trait::async_trait;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;

/// A reference to one AWS KMS key: its ARN, plus optional role/profile and
/// an encryption-context map the real backend would authenticate.
pub struct AwsKmsMasterKey {
    key_arn: String,
    role: Option<String>,
    profile: Option<String>,
    context: serde_json::Map<String, serde_json::Value>,
}

impl AwsKmsMasterKey {
    pub fn new(key_arn: impl Into<String>) -> Self {
        AwsKmsMasterKey {
            key_arn: key_arn.into(),
            role: None,
            profile: None,
            context: serde_json::Map::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_context(mut self, context: serde_json::Map<String, serde_json::Value>) -> Self {
        self.context = context;
        self
    }
}

#[async_trait]
impl MasterKey for AwsKmsMasterKey {
    async fn encrypt(&self, _data_key: &DataKey) -> Result<String, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "AwsKmsMasterKey is a stub — would call kms:Encrypt for {}",
            self.key_arn
        )))
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "AwsKmsMasterKey is a stub — would call kms:Decrypt for {}",
            self.key_arn
        )))
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "cloud-kms-a"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("arn".into(), self.key_arn.clone().into());
        if let Some(role) = &self.role {
            map.insert("role".into(), role.clone().into());
        }
        if let Some(profile) = &self.profile {
            map.insert("profile".into(), profile.clone().into());
        }
        if !self.context.is_empty() {
            map.insert("context".into(), self.context.clone().into());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn encrypt_reports_stub_unavailable() {
        let mk = AwsKmsMasterKey::new("arn:aws:kms:us-east-1:000000000000:key/abc");
        let key = DataKey::generate();
        let err = mk.encrypt(&key).await.unwrap_err();
        assert!(matches!(err, MasterKeyError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn decrypt_reports_stub_unavailable() {
        let mk = AwsKmsMasterKey::new("arn:aws:kms:us-east-1:000000000000:key/abc");
        assert!(mk.decrypt().await.is_err());
    }

    #[test]
    fn never_needs_rotation() {
        let mk = AwsKmsMasterKey::new("arn:aws:kms:us-east-1:000000000000:key/abc");
        assert!(!mk.needs_rotation());
    }

    #[test]
    fn serialized_map_includes_arn_and_optional_fields() {
        let mk = AwsKmsMasterKey::new("arn:abc").with_role("deploy-role");
        let map = mk.to_serialized_map();
        assert_eq!(map.get("arn").unwrap(), "arn:abc");
        assert_eq!(map.get("role").unwrap(), "deploy-role");
        assert!(map.get("profile").is_none());
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<Box<dyn MasterKey>>();
    }
}
