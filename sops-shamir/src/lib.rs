//! Key groups and Shamir secret sharing over the data key.
//!
//! A document's data key is split into one share per [`sops_types::KeyGroup`]
//! (trivially, a single unsplit share, when no threshold is configured).
//! Each group's share is wrapped independently under every master key the
//! group lists ([`group::wrap_group`]) and recovered by trying those
//! master keys in order until one succeeds ([`group::unwrap_group`]).
//! Once at least `threshold` groups' shares are recovered,
//! [`split::recover`] reconstructs the original data key.

mod error;
mod group;
mod split;

pub use error::ShamirError;
pub use group::{unwrap_group, wrap_group, KeyGroupMember};
pub use split::{recover, split, GroupShare};
