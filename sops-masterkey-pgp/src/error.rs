//! Errors specific to this simplified OpenPGP backend.

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PgpError {
    #[error("invalid hex fingerprint: {0}")]
    InvalidFingerprint(String),
    #[error("invalid transport public key: {0}")]
    InvalidPublicKey(String),
    #[error("malformed wrapped data key: {0}")]
    MalformedWrapped(String),
    #[error("AEAD authentication failed while unwrapping")]
    Integrity,
}

impl From<PgpError> for sops_masterkey::MasterKeyError {
    fn from(e: PgpError) -> Self {
        match e {
            PgpError::Integrity => sops_masterkey::MasterKeyError::IntegrityError(e.to_string()),
            other => sops_masterkey::MasterKeyError::Other(Box::new(other)),
        }
    }
}
