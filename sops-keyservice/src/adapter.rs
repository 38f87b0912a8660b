//! Bridges a [`KeyService`] back into a [`MasterKey`] for one specific
//! master key reference.
//!
//! This is what lets [`sops_shamir`](../sops_shamir/index.html)'s key-group
//! wrap/unwrap — written directly against `Arc<dyn MasterKey>` — work
//! unchanged whether a group's master key is a local backend or a remote
//! key service: wrap the remote case in [`RemoteMasterKey`] and it's just
//! another `MasterKey` trait object as far as the group orchestration is
//! concerned.

use crate::service::KeyService;
use async_trait::async_trait;
use sops_masterkey::{MasterKey, MasterKeyError};
use sops_types::{DataKey, MasterKeyRef};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Adapts one [`MasterKeyRef`] to the [`MasterKey`] trait by delegating
/// `encrypt`/`decrypt` to a [`KeyService`] — in-process or remote.
pub struct RemoteMasterKey {
    key_service: Arc<dyn KeyService>,
    reference: Mutex<MasterKeyRef>,
}

impl RemoteMasterKey {
    pub fn new(key_service: Arc<dyn KeyService>, reference: MasterKeyRef) -> Self {
        RemoteMasterKey {
            key_service,
            reference: Mutex::new(reference),
        }
    }
}

#[async_trait]
impl MasterKey for RemoteMasterKey {
    async fn encrypt(&self, data_key: &DataKey) -> Result<String, MasterKeyError> {
        let reference = self.reference.lock().await.clone();
        let wrapped = self
            .key_service
            .encrypt_data_key(&reference, data_key)
            .await
            .map_err(|e| MasterKeyError::Other(Box::new(e)))?;
        self.reference.lock().await.wrapped_data_key = wrapped.clone();
        Ok(wrapped)
    }

    async fn decrypt(&self) -> Result<DataKey, MasterKeyError> {
        let reference = self.reference.lock().await.clone();
        self.key_service
            .decrypt_data_key(&reference, &reference.wrapped_data_key)
            .await
            .map_err(|e| MasterKeyError::Other(Box::new(e)))
    }

    fn needs_rotation(&self) -> bool {
        false
    }

    fn type_identifier(&self) -> &'static str {
        // A blocking lock on an uncontended mutex to read a `'static`
        // label computed from the held reference's kind; `try_lock`
        // keeps this method non-async as the trait requires.
        match self.reference.try_lock() {
            Ok(reference) => match reference.kind {
                sops_types::MasterKeyKind::KmsAws => "cloud-kms-a",
                sops_types::MasterKeyKind::KmsGcp => "cloud-kms-b",
                sops_types::MasterKeyKind::KmsVault => "cloud-kms-c",
                sops_types::MasterKeyKind::Pgp => "openpgp",
                sops_types::MasterKeyKind::Age => "x25519-recipient",
                sops_types::MasterKeyKind::Passphrase => "passphrase",
            },
            Err(_) => "remote",
        }
    }

    fn to_serialized_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match self.reference.try_lock() {
            Ok(reference) => {
                let mut map = serde_json::Map::new();
                map.insert("identifier".into(), reference.identifier.clone().into());
                map.insert(
                    "wrapped_data_key".into(),
                    reference.wrapped_data_key.clone().into(),
                );
                map
            }
            Err(_) => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyServiceError;
    use base64::Engine as _;
    use sops_types::MasterKeyKind;
    use time::OffsetDateTime;

    struct StubKeyService;
    #[async_trait]
    impl KeyService for StubKeyService {
        async fn generate_data_key(
            &self,
            _master_keys: &[MasterKeyRef],
        ) -> Result<(DataKey, Vec<MasterKeyRef>), KeyServiceError> {
            unimplemented!()
        }
        async fn encrypt_data_key(
            &self,
            _master_key: &MasterKeyRef,
            plaintext: &DataKey,
        ) -> Result<String, KeyServiceError> {
            Ok(plaintext.with_bytes(|b| base64::engine::general_purpose::STANDARD.encode(b)))
        }
        async fn decrypt_data_key(
            &self,
            _master_key: &MasterKeyRef,
            ciphertext: &str,
        ) -> Result<DataKey, KeyServiceError> {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(ciphertext)
                .unwrap();
            DataKey::from_slice(&bytes).map_err(|e| KeyServiceError::Other(Box::new(e)))
        }
    }

    #[tokio::test]
    async fn wraps_and_unwraps_through_the_key_service() {
        let reference = MasterKeyRef::new(
            MasterKeyKind::Age,
            "age1...",
            "",
            OffsetDateTime::from_unix_timestamp(0).unwrap(),
        );
        let adapter = RemoteMasterKey::new(Arc::new(StubKeyService), reference);
        let key = DataKey::generate();
        adapter.encrypt(&key).await.unwrap();
        let recovered = adapter.decrypt().await.unwrap();
        assert_eq!(key.with_bytes(|b| *b), recovered.with_bytes(|b| *b));
        assert_eq!(adapter.type_identifier(), "x25519-recipient");
    }
}
