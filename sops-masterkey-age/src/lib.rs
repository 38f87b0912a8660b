//! The `x25519-recipient`, `ssh-recipient`, and passphrase-derived master
//! key backends.
//!
//! The first two share one ECIES-over-X25519 wrap mechanism ([`ecies`]) —
//! `ssh-recipient` only differs in how it parses its recipient string and
//! in converting the resulting Edwards point to Montgomery form. The
//! passphrase backend is unrelated: it protects identity-file key material
//! at rest rather than wrapping a document's data key, so it lives here as
//! [`PassphraseIdentity`] rather than implementing
//! [`sops_masterkey::MasterKey`].

mod ecies;
mod error;
mod passphrase;
mod ssh;
mod x25519;

pub use error::AgeError;
pub use passphrase::PassphraseIdentity;
pub use ssh::{parse_ssh_recipient, SshMasterKey};
pub use x25519::{decode_recipient, encode_recipient, X25519MasterKey};
