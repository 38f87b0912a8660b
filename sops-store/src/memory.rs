//! An in-memory JSON-backed [`Store`], built for the rest of the
//! workspace's integration tests rather than as a production format
//! adapter. Embeds the envelope as a reserved `sops` field alongside the
//! tree's own JSON representation, mirroring the generic on-disk layout
//! described for human-readable formats.

use crate::error::StoreError;
use crate::store::Store;
use async_trait::async_trait;
use sops_envelope::Envelope;
use sops_types::Tree;

/// A `Store` that round-trips through `serde_json` with no on-disk
/// format of its own. Available behind the `test-utils` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryStore;

#[derive(serde::Serialize, serde::Deserialize)]
struct EncryptedDocument {
    #[serde(flatten)]
    tree: Tree,
    sops: Envelope,
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load_plain_tree(&self, bytes: &[u8]) -> Result<Tree, StoreError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }

    async fn load_encrypted_tree_and_envelope(
        &self,
        bytes: &[u8],
    ) -> Result<(Tree, Envelope), StoreError> {
        let doc: EncryptedDocument = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::MalformedDocument(e.to_string()))?;
        doc.sops.verify_version()?;
        Ok((doc.tree, doc.sops))
    }

    async fn emit_plain_tree(&self, tree: &Tree) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(tree).map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }

    async fn emit_encrypted_tree_and_envelope(
        &self,
        tree: &Tree,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, StoreError> {
        let doc = EncryptedDocument {
            tree: tree.clone(),
            sops: envelope.clone(),
        };
        serde_json::to_vec(&doc).map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }
}
