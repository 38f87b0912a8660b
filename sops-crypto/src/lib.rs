//! Leaf-level AEAD encryption and the tree-wide integrity MAC.
//!
//! Two things live here because they share one primitive: the MAC's own
//! digest is itself stored as an encrypted leaf token (path `""`), so the
//! MAC module is built directly on top of the leaf cipher rather than
//! duplicating AEAD plumbing.
//!
//! Suspension: nothing in this crate ever awaits. Leaf encryption,
//! decryption, and MAC computation/verification are pure, synchronous, and
//! allocation-bounded — only the master-key wrap/unwrap calls elsewhere in
//! the pipeline suspend.

mod aead;
mod error;
mod mac;
mod token;

pub use aead::{decrypt_leaf, encrypt_leaf, CipherId};
pub use error::CryptoError;
pub use mac::{decrypt_mac, encrypt_mac, verify_mac, MAC_PATH};
pub use token::{looks_like_token, parse_token, ParsedToken};
