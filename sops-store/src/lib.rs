//! The Store Adapter Contract (C10): the trait every concrete document
//! format (YAML, JSON, INI, dotenv, opaque binary) implements to feed the
//! rest of this workspace a [`sops_types::Tree`] and an
//! [`sops_envelope::Envelope`].
//!
//! Format parsers themselves live in their own crates outside this
//! workspace. Behind the `test-utils` feature, this crate also ships
//! [`InMemoryStore`], a JSON-backed implementation the rest of the
//! workspace's integration tests build on.

mod error;
mod store;

pub use error::StoreError;
pub use store::Store;

#[cfg(feature = "test-utils")]
mod memory;
#[cfg(feature = "test-utils")]
pub use memory::InMemoryStore;
