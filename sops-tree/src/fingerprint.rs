//! Deterministic fingerprint over a tree's leaves, the input the integrity
//! MAC is keyed-hashed over.

use sops_types::{Path, Tree};
use std::collections::HashSet;

/// Byte separating successive leaf representations in the fingerprint.
pub const LEAF_SEPARATOR: u8 = 0x3A;

/// Which leaves contribute to [`compute_fingerprint`].
pub enum FingerprintScope<'a> {
    /// Every leaf, encrypted or not.
    All,
    /// Only leaves whose path is in this set — used when the
    /// `mac-only-encrypted` policy flag is set.
    EncryptedOnly(&'a HashSet<Path>),
}

/// Ordered concatenation of leaf values (in their current representation —
/// ciphertext tokens post-encrypt, plaintext scalars pre-encrypt or for
/// leaves the policy left unencrypted) separated by [`LEAF_SEPARATOR`].
///
/// Pure and allocation-bounded: a single `Vec<u8>` accumulator, one pass
/// over [`Tree::walk_leaves`].
pub fn compute_fingerprint(tree: &Tree, scope: FingerprintScope<'_>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut first = true;
    for (path, leaf) in tree.walk_leaves() {
        let included = match &scope {
            FingerprintScope::All => true,
            FingerprintScope::EncryptedOnly(set) => set.contains(&path),
        };
        if !included {
            continue;
        }
        if !first {
            out.push(LEAF_SEPARATOR);
        }
        first = false;
        let (_, bytes) = leaf.value.encode_canonical();
        out.extend_from_slice(&bytes);
    }
    out
}
