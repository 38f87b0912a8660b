//! GCP Cloud KMS master key backend (`cloud-kms-b`).
//!
//! Stub, same boundary as `sops-masterkey-kms-aws`: the identifier is a
//! full resource URL including key version, but no GCP client is wired up.

use async_trait::async_trait;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::DataKey;

/// A GCP Cloud KMS key, identified by its resource URL
/// (`projects/.../locations/.../keyRings/.../cryptoKeys/.../cryptoKeyVersions/...`).
pub struct GcpKmsMasterKey {
    resource_url: String,
}

impl GcpKmsMasterKey {
    pub fn new(resource_url: impl Into<String>) -> Self {
        GcpKmsMasterKey {
            resource_url: resource_url.into(),
        }
    }
}

#[async_trait]
impl MasterKey for GcpKmsMasterKey {
    async fn encrypt(&self, _data_key: &DataKey) -> Result<String, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "GcpKmsMasterKey is a stub — would call projects.locations.keyRings.cryptoKeys.encrypt for {}",
            self.resource_url
        )))
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        Err(MasterKeyError::BackendUnavailable(format!(
            "GcpKmsMasterKey is a stub — would call projects.locations.keyRings.cryptoKeys.decrypt for {}",
            self.resource_url
        )))
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        "cloud-kms-b"
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("resource_url".into(), self.resource_url.clone().into());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn encrypt_reports_stub_unavailable() {
        let mk = GcpKmsMasterKey::new("projects/p/locations/global/keyRings/r/cryptoKeys/k");
        let err = mk.encrypt(&DataKey::generate()).await.unwrap_err();
        assert!(matches!(err, MasterKeyError::BackendUnavailable(_)));
    }

    #[test]
    fn type_identifier_is_cloud_kms_b() {
        let mk = GcpKmsMasterKey::new("r");
        assert_eq!(mk.type_identifier(), "cloud-kms-b");
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<Box<dyn MasterKey>>();
    }
}
