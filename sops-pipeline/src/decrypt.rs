//! Tree-wide decryption: recover the data key from enough key groups,
//! walk the tree decrypting whatever looks like a ciphertext token, and
//! verify the integrity MAC before handing anything back.

use crate::error::PipelineError;
use sops_crypto::{decrypt_leaf, decrypt_mac, looks_like_token, verify_mac};
use sops_envelope::Envelope;
use sops_masterkey::MasterKey;
use sops_tree::{compute_fingerprint, FingerprintScope};
use sops_types::{Branch, DataKey, Item, Node, Path, Tree, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const MAC_LABEL: &str = "<mac>";

/// Decrypt `tree` in place against `envelope`, verifying the integrity MAC.
///
/// `key_groups` must align, index for index, with `envelope.key_groups` —
/// each inner list is the set of already-resolved master key backends to
/// try, in order, for that group's share. A group with fewer backends
/// than master keys listed in the envelope (or none at all) is simply
/// skipped; decryption still succeeds as long as enough *other* groups
/// recover their shares to meet the threshold.
pub async fn decrypt_tree(
    tree: &mut Tree,
    envelope: &Envelope,
    key_groups: &[Vec<Arc<dyn MasterKey>>],
    cancel: &CancellationToken,
) -> Result<(), PipelineError> {
    envelope.verify_version()?;
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let threshold = envelope.effective_threshold();
    let data_key = if threshold <= 1 {
        recover_without_splitting(key_groups, cancel).await?
    } else {
        recover_with_splitting(envelope, key_groups, threshold, cancel).await?
    };

    let mut encrypted_paths: HashSet<Path> = HashSet::new();
    decrypt_branch(&mut tree.root, &Path::root(), &data_key, &mut encrypted_paths)?;

    let policy = envelope.policy.to_policy()?;
    let fingerprint_scope = if policy.mac_only_encrypted {
        FingerprintScope::EncryptedOnly(&encrypted_paths)
    } else {
        FingerprintScope::All
    };
    let recomputed = compute_fingerprint(tree, fingerprint_scope);

    let stored = decrypt_mac(&envelope.mac, &data_key).map_err(|source| PipelineError::Crypto {
        path: MAC_LABEL.to_string(),
        source,
    })?;
    verify_mac(&stored, &recomputed).map_err(|_| PipelineError::IntegrityFailure)?;

    Ok(())
}

async fn recover_without_splitting(
    key_groups: &[Vec<Arc<dyn MasterKey>>],
    cancel: &CancellationToken,
) -> Result<DataKey, PipelineError> {
    for group in key_groups {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        if group.is_empty() {
            continue;
        }
        if let Ok(data_key) = sops_shamir::unwrap_group(group).await {
            return Ok(data_key);
        }
    }
    Err(PipelineError::InsufficientShares {
        recovered: 0,
        required: 1,
    })
}

async fn recover_with_splitting(
    envelope: &Envelope,
    key_groups: &[Vec<Arc<dyn MasterKey>>],
    threshold: u8,
    cancel: &CancellationToken,
) -> Result<DataKey, PipelineError> {
    let mut recovered = Vec::new();
    for (meta, group) in envelope.key_groups.iter().zip(key_groups.iter()) {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let Some(share_index) = meta.share_index else {
            continue;
        };
        if group.is_empty() {
            continue;
        }
        if let Ok(share) = sops_shamir::unwrap_group(group).await {
            recovered.push((share_index, share));
            if recovered.len() as u8 >= threshold {
                break;
            }
        }
    }
    sops_shamir::recover(&recovered, threshold).map_err(PipelineError::from)
}

fn decrypt_branch(
    branch: &mut Branch,
    path: &Path,
    data_key: &DataKey,
    encrypted_paths: &mut HashSet<Path>,
) -> Result<(), PipelineError> {
    for item in &mut branch.0 {
        match item {
            Item::Pair { key, node } => {
                let leaf_path = path.push_key(key.clone());
                decrypt_node(node, &leaf_path, data_key, encrypted_paths)?;
            }
            Item::Element { index, node } => {
                let leaf_path = path.push_index(*index);
                decrypt_node(node, &leaf_path, data_key, encrypted_paths)?;
            }
            Item::Comment(_) => {}
        }
    }
    Ok(())
}

fn decrypt_node(
    node: &mut Node,
    path: &Path,
    data_key: &DataKey,
    encrypted_paths: &mut HashSet<Path>,
) -> Result<(), PipelineError> {
    match node {
        Node::Leaf(leaf) => {
            if let Value::Str(token) = &leaf.value {
                if looks_like_token(token) {
                    let associated_data = path.as_associated_data();
                    let decrypted = decrypt_leaf(token, data_key, &associated_data).map_err(|source| {
                        PipelineError::Crypto {
                            path: path.to_string(),
                            source,
                        }
                    })?;
                    leaf.value = decrypted;
                    encrypted_paths.insert(path.clone());
                }
            }
            Ok(())
        }
        Node::Branch(child) => decrypt_branch(child, path, data_key, encrypted_paths),
    }
}
