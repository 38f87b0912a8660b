//! The `KeyService` trait and its in-process implementation.

use crate::error::KeyServiceError;
use crate::protocol::GenerateDataKeyResponse;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sops_masterkey::MasterKey;
use sops_types::{DataKey, MasterKeyRef};
use std::sync::Arc;

/// Resolves a [`MasterKeyRef`] — pure data from an envelope — into a live
/// backend capable of wrapping or unwrapping against it.
///
/// Resolvers are the seam where environment-specific policy (which
/// `SOPS_AGE_KEY*` variable to read, which cloud credentials to use)
/// lives; this crate only calls through the resolver, never reads
/// environment state itself.
#[async_trait]
pub trait MasterKeyResolver: Send + Sync {
    /// Resolve a backend capable of `encrypt` for a master key named only
    /// by its reference (used by `GenerateDataKey`/`EncryptDataKey`,
    /// where no ciphertext exists yet).
    async fn resolve_for_encrypt(
        &self,
        reference: &MasterKeyRef,
    ) -> Result<Arc<dyn MasterKey>, KeyServiceError>;

    /// Resolve a backend capable of `decrypt` holding `ciphertext`
    /// (used by `DecryptDataKey`).
    async fn resolve_for_decrypt(
        &self,
        reference: &MasterKeyRef,
        ciphertext: &str,
    ) -> Result<Arc<dyn MasterKey>, KeyServiceError>;
}

/// A Key Service Protocol endpoint: the three RPC operations, independent
/// of transport.
#[async_trait]
pub trait KeyService: Send + Sync {
    async fn generate_data_key(
        &self,
        master_keys: &[MasterKeyRef],
    ) -> Result<(DataKey, Vec<MasterKeyRef>), KeyServiceError>;

    async fn encrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        plaintext: &DataKey,
    ) -> Result<String, KeyServiceError>;

    async fn decrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        ciphertext: &str,
    ) -> Result<DataKey, KeyServiceError>;
}

/// The in-process transport: a direct call through [`MasterKeyResolver`],
/// no serialization, typed errors. Equivalent to calling a local
/// dispatcher directly rather than going over a socket.
pub struct LocalKeyService<R> {
    resolver: R,
}

impl<R: MasterKeyResolver> LocalKeyService<R> {
    pub fn new(resolver: R) -> Self {
        LocalKeyService { resolver }
    }
}

#[async_trait]
impl<R: MasterKeyResolver> KeyService for LocalKeyService<R> {
    async fn generate_data_key(
        &self,
        master_keys: &[MasterKeyRef],
    ) -> Result<(DataKey, Vec<MasterKeyRef>), KeyServiceError> {
        let data_key = DataKey::generate();
        let mut updated = Vec::with_capacity(master_keys.len());
        for reference in master_keys {
            let backend = self.resolver.resolve_for_encrypt(reference).await?;
            let wrapped_data_key = backend.encrypt(&data_key).await?;
            tracing::debug!(kind = reference.kind.as_tag(), identifier = %reference.identifier, "generated data key wrapped");
            let mut updated_ref = reference.clone();
            updated_ref.wrapped_data_key = wrapped_data_key;
            updated.push(updated_ref);
        }
        Ok((data_key, updated))
    }

    async fn encrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        plaintext: &DataKey,
    ) -> Result<String, KeyServiceError> {
        let backend = self.resolver.resolve_for_encrypt(master_key).await?;
        let wrapped = backend.encrypt(plaintext).await?;
        tracing::debug!(kind = master_key.kind.as_tag(), identifier = %master_key.identifier, "wrapped data key");
        Ok(wrapped)
    }

    async fn decrypt_data_key(
        &self,
        master_key: &MasterKeyRef,
        ciphertext: &str,
    ) -> Result<DataKey, KeyServiceError> {
        let backend = self
            .resolver
            .resolve_for_decrypt(master_key, ciphertext)
            .await?;
        let data_key = backend.decrypt().await?;
        tracing::debug!(kind = master_key.kind.as_tag(), identifier = %master_key.identifier, "unwrapped data key");
        Ok(data_key)
    }
}

/// Turn a `generate_data_key` result into the wire response shape,
/// base64-encoding the raw key for same-trust-boundary transport.
pub fn to_generate_response(
    data_key: &DataKey,
    updated_keys: Vec<MasterKeyRef>,
) -> GenerateDataKeyResponse {
    GenerateDataKeyResponse {
        data_key_b64: data_key.with_bytes(|b| STANDARD.encode(b)),
        updated_keys,
    }
}
