//! The metadata envelope: version, key groups, Shamir threshold, policy
//! options, and the encrypted integrity MAC.
//!
//! Serialized as a reserved `sops` branch for human-readable formats, or
//! a sidecar block for binary ones — which of those two a given document
//! uses is a [`sops_store`] concern, not this crate's; this crate only
//! defines the envelope's own shape.

mod envelope;
mod error;
mod legacy;
mod policy_metadata;

pub use envelope::{Envelope, SUPPORTED_VERSION};
pub use error::EnvelopeError;
pub use policy_metadata::PolicyMetadata;
