//! The Store Adapter Contract: the narrow boundary between a concrete
//! on-disk format (YAML, JSON, INI, env, opaque binary) and the rest of
//! this workspace, which only ever sees a [`sops_types::Tree`].
//!
//! Format parsers are out of scope here — each format gets its own crate
//! (not part of this workspace) implementing [`Store`]. This crate ships
//! only the trait, plus an in-memory implementation behind `test-utils`
//! for the rest of the workspace's integration tests to build on.

use crate::error::StoreError;
use async_trait::async_trait;
use sops_envelope::Envelope;
use sops_types::Tree;

/// Converts between raw document bytes and the tree/envelope model the
/// pipeline operates on. Implementations must preserve leaf ordering and
/// represent the envelope location consistently, so that loading and
/// re-emitting an untouched document is idempotent at the semantic (not
/// necessarily byte-exact) level.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load_plain_tree(&self, bytes: &[u8]) -> Result<Tree, StoreError>;

    async fn load_encrypted_tree_and_envelope(
        &self,
        bytes: &[u8],
    ) -> Result<(Tree, Envelope), StoreError>;

    async fn emit_plain_tree(&self, tree: &Tree) -> Result<Vec<u8>, StoreError>;

    async fn emit_encrypted_tree_and_envelope(
        &self,
        tree: &Tree,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_send_sync<T: Send + Sync>() {}
    fn _assert_object_safe() {
        _assert_send_sync::<std::sync::Arc<dyn Store>>();
    }
}
