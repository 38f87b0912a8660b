//! Tree-wide encryption: split the data key across key groups, wrap each
//! group's share, walk the tree encrypting whatever the policy selects,
//! and seal the result with an integrity MAC.

use crate::error::PipelineError;
use sops_crypto::{encrypt_leaf, encrypt_mac};
use sops_envelope::{Envelope, PolicyMetadata};
use sops_policy::PolicyScope;
use sops_shamir::KeyGroupMember;
use sops_tree::{compute_fingerprint, FingerprintScope};
use sops_types::{Branch, DataKey, Item, KeyGroup, Node, Path, Tree, Value};
use std::collections::HashSet;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

/// Encrypt `tree` in place and return the envelope describing how to
/// decrypt it.
///
/// `key_groups` supplies, in order, each key group's members (already
/// resolved to live [`sops_masterkey::MasterKey`] backends); the returned
/// envelope's `key-groups` are built from whichever of each group's
/// members actually succeed at wrapping the data key's share. `threshold`
/// of `0` or `1` means no real Shamir splitting: every group gets a full
/// copy of the data key.
pub async fn encrypt_tree(
    tree: &mut Tree,
    key_groups: Vec<Vec<KeyGroupMember>>,
    threshold: u8,
    policy_metadata: PolicyMetadata,
    cancel: &CancellationToken,
) -> Result<Envelope, PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    if key_groups.is_empty() {
        return Err(PipelineError::NoKeyGroups);
    }

    let policy = policy_metadata.to_policy()?;

    let data_key = DataKey::generate();
    let shares = sops_shamir::split(&data_key, key_groups.len(), threshold)?;

    let mut wrapped_groups = Vec::with_capacity(key_groups.len());
    for (members, share) in key_groups.into_iter().zip(shares) {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let wrapped_refs = sops_shamir::wrap_group(&share.data_key, &members).await?;
        let mut key_group = KeyGroup::new(wrapped_refs);
        if let Some(index) = share.share_index {
            key_group = key_group.with_share_index(index);
        }
        wrapped_groups.push(key_group);
    }

    // Decide which leaves get encrypted, then fingerprint the tree while
    // every leaf still holds its plaintext value — the MAC digests
    // plaintext on both encrypt and decrypt, never ciphertext, so the two
    // sides agree. Only after that do we mutate the tree in place.
    let scope = PolicyScope::root(&policy);
    let mut encrypted_paths: HashSet<Path> = HashSet::new();
    decide_branch(&tree.root, &scope, &Path::root(), &mut encrypted_paths);

    let fingerprint_scope = if policy.mac_only_encrypted {
        FingerprintScope::EncryptedOnly(&encrypted_paths)
    } else {
        FingerprintScope::All
    };
    let digest = compute_fingerprint(tree, fingerprint_scope);
    let mac = encrypt_mac(&digest, &data_key);

    encrypt_branch(&mut tree.root, &Path::root(), &data_key, &encrypted_paths);

    Ok(Envelope::new(
        wrapped_groups,
        Some(threshold).filter(|t| *t > 1),
        mac,
        OffsetDateTime::now_utc(),
        policy_metadata,
    ))
}

/// Walk `branch` without mutating it, recording in `encrypted_paths` every
/// leaf the policy selects for encryption.
fn decide_branch(
    branch: &Branch,
    scope: &PolicyScope<'_>,
    path: &Path,
    encrypted_paths: &mut HashSet<Path>,
) {
    for item in &branch.0 {
        match item {
            Item::Pair { key, node } => {
                let leaf_path = path.push_key(key.clone());
                match node {
                    Node::Leaf(leaf) => {
                        if leaf.value.is_encryptable() {
                            let decision = scope.decide(key, leaf.trailing_comment.as_deref());
                            if decision.should_encrypt() {
                                encrypted_paths.insert(leaf_path);
                            }
                        }
                    }
                    Node::Branch(child) => {
                        let child_scope = scope.descend(key);
                        decide_branch(child, &child_scope, &leaf_path, encrypted_paths);
                    }
                }
            }
            Item::Element { index, node } => {
                let leaf_path = path.push_index(*index);
                let child_scope = scope.descend_index(*index);
                match node {
                    Node::Leaf(leaf) => {
                        if leaf.value.is_encryptable() {
                            let decision = child_scope.decide("", leaf.trailing_comment.as_deref());
                            if decision.should_encrypt() {
                                encrypted_paths.insert(leaf_path);
                            }
                        }
                    }
                    Node::Branch(child) => {
                        decide_branch(child, &child_scope, &leaf_path, encrypted_paths);
                    }
                }
            }
            Item::Comment(_) => {}
        }
    }
}

/// Replace every leaf in `encrypted_paths` with its ciphertext token. The
/// set of paths to encrypt was already decided against the plaintext tree
/// by [`decide_branch`], so this pass never re-evaluates policy.
fn encrypt_branch(
    branch: &mut Branch,
    path: &Path,
    data_key: &DataKey,
    encrypted_paths: &HashSet<Path>,
) {
    for item in &mut branch.0 {
        match item {
            Item::Pair { key, node } => {
                let leaf_path = path.push_key(key.clone());
                match node {
                    Node::Leaf(leaf) => {
                        if encrypted_paths.contains(&leaf_path) {
                            let associated_data = leaf_path.as_associated_data();
                            let token = encrypt_leaf(&leaf.value, data_key, &associated_data);
                            leaf.value = Value::Str(token);
                        }
                    }
                    Node::Branch(child) => {
                        encrypt_branch(child, &leaf_path, data_key, encrypted_paths);
                    }
                }
            }
            Item::Element { index, node } => {
                let leaf_path = path.push_index(*index);
                match node {
                    Node::Leaf(leaf) => {
                        if encrypted_paths.contains(&leaf_path) {
                            let associated_data = leaf_path.as_associated_data();
                            let token = encrypt_leaf(&leaf.value, data_key, &associated_data);
                            leaf.value = Value::Str(token);
                        }
                    }
                    Node::Branch(child) => {
                        encrypt_branch(child, &leaf_path, data_key, encrypted_paths);
                    }
                }
            }
            Item::Comment(_) => {}
        }
    }
}
