//! Tree walking and fingerprinting over the [`sops_types`] document model.
//!
//! This crate is purely structural: no cryptography, no policy decisions.
//! It answers two questions every other crate needs answered the same way
//! every time — "what order do leaves come in" and "what does this tree's
//! content boil down to as a byte string" — so the leaf cipher, the policy
//! engine, and the integrity MAC all agree.

mod fingerprint;
mod walk;

pub use fingerprint::{compute_fingerprint, FingerprintScope, LEAF_SEPARATOR};
pub use walk::walk_leaves;
