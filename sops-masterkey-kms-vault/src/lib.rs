//! HashiCorp Vault Transit master key backend (`cloud-kms-c`).
//!
//! Stub, same boundary as the AWS/GCP KMS backends: identified by Vault
//! URI, key name, and key version, but no Vault client dependency.

use async_trait::async_trait;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;

/// A Vault Transit key: the Vault server URI, transit key name, and
/// key version used to wrap/unwrap.
pub struct VaultTransitMasterKey {
    vault_uri: String,
    key_name: String,
    key_version: u32,
}

impl VaultTransitMasterKey {
    pub fn new(vault_uri: impl Into<String>, key_name: impl Into<String>, key_version: u32) -> Self {
        VaultTransitMasterKey {
            vault_uri: vault_uri.into(),
            key_name: key_name.into(),
            key_version,
        }
    }
}

#[async_trait]
impl MasterKey for VaultTransitMasterKey {
    async fn encrypt(&self, _data_key: &DataKey) -> Result<String, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "VaultTransitMasterKey is a stub — would POST {}/v1/transit/encrypt/{}",
            self.vault_uri, self.key_name
        )))
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "VaultTransitMasterKey is a stub — would POST {}/v1/transit/decrypt/{}",
            self.vault_uri, self.key_name
        )))
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "cloud-kms-c"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("vault_uri".into(), self.vault_uri.clone().into());
        map.insert("key_name".into(), self.key_name.clone().into());
        map.insert("key_version".into(), self.key_version.into());
        map
    }
}
