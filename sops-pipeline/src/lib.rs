//! Tree-wide encrypt/decrypt orchestration (C8): the one place that ties
//! policy decisions, the leaf cipher, the integrity MAC, key groups and
//! Shamir splitting, and master key backends together into the two
//! operations everything else in this workspace exists to support.
//!
//! [`encrypt_tree`] generates a fresh data key, splits and wraps it across
//! the given key groups, walks the tree encrypting whatever the policy
//! selects, and seals the result with an integrity MAC. [`decrypt_tree`]
//! reverses it: recover the data key from enough groups, walk the tree
//! decrypting anything that looks like a ciphertext token, and verify the
//! MAC before returning. A MAC mismatch is always fatal; a key group or
//! individual master key failing is tolerated as long as enough others
//! succeed.
//!
//! Suspension only happens at group wrap/unwrap — every master key call
//! in this crate is `.await`ed, nothing else in the tree walk or MAC
//! computation ever yields. [`tokio_util::sync::CancellationToken`]
//! threads through both operations so a caller can abort between (but
//! never mid-) a master key call.

mod decrypt;
mod encrypt;
mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use decrypt::decrypt_tree;
pub use encrypt::encrypt_tree;
pub use error::PipelineError;
