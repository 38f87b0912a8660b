//! Core data model shared across every `sops-*` crate: the document tree,
//! its scalar values, paths, the symmetric data key, and the metadata
//! types (`MasterKeyRef`, `KeyGroup`) that describe how that key is
//! protected.
//!
//! No crate in this workspace should define its own copy of "what a tree
//! looks like" or "what a master key reference looks like" — they all
//! depend on this one.
//!
//! # The data model
//!
//! | Type | Role |
//! |------|------|
//! | [`Tree`] / [`Branch`] / [`Item`] / [`Node`] / [`Leaf`] | The document shape a store adapter loads and emits |
//! | [`Value`] | A scalar leaf value, with canonical byte encoding |
//! | [`Path`] / [`PathSegment`] | A leaf's fully-qualified location, also the leaf cipher's associated data |
//! | [`DataKey`] | The symmetric key leaves are encrypted under |
//! | [`MasterKeyRef`] / [`MasterKeyKind`] | One master key's wrapped copy of (a share of) the data key |
//! | [`KeyGroup`] | An ordered set of master keys sharing one Shamir share |
//!
//! # Design principle
//!
//! Tree order is load-bearing. [`Tree::walk_leaves`] defines the one
//! traversal every other crate must use — the leaf cipher binds ciphertext
//! to the path it produces, and the integrity MAC concatenates leaves in
//! that same order. If two crates walked the tree differently, encryption
//! and verification would disagree about which leaf is which.
mod datakey;
mod error;
mod keygroup;
mod masterkey_ref;
mod path;
mod tree;
mod value;

pub use datakey::{DataKey, DataKeyError, DATA_KEY_LEN};
pub use error::TypesError;
pub use keygroup::KeyGroup;
pub use masterkey_ref::{MasterKeyKind, MasterKeyRef};
pub use path::{Path, PathSegment};
pub use tree::{Branch, Item, Leaf, Node, Tree};
pub use value::{Value, ValueDecodeError};
