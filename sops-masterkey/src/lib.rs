//! The `MasterKey` contract: one sealed variant's wrap/unwrap of a data
//! key. Backend crates (`sops-masterkey-age`, `sops-masterkey-pgp`,
//! `sops-masterkey-kms-*`) implement [`MasterKey`]; this crate only
//! defines the shape they all share.

mod error;
mod trait_def;

pub use error::MasterKeyError;
pub use trait_def::MasterKey;
