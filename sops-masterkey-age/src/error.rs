//! Errors specific to parsing/constructing age-family backends, mapped to
//! [`sops_masterkey::MasterKeyError`] at the trait boundary.

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AgeError {
    #[error("invalid x25519 recipient string: {0}")]
    InvalidRecipient(String),
    #[error("invalid ssh public key: {0}")]
    InvalidSshKey(String),
    #[error("unsupported ssh key type: {0} (only ssh-ed25519 recipients are supported)")]
    UnsupportedSshKeyType(String),
    #[error("malformed wrapped data key: {0}")]
    MalformedWrapped(String),
    #[error("AEAD authentication failed while unwrapping")]
    Integrity,
}

impl From<AgeError> for sops_masterkey::MasterKeyError {
    fn from(e: AgeError) -> Self {
        match e {
            AgeError::UnsupportedSshKeyType(_) => {
                sops_masterkey::MasterKeyError::UnsupportedOperation(e.to_string())
            }
            AgeError::Integrity => sops_masterkey::MasterKeyError::IntegrityError(e.to_string()),
            other => sops_masterkey::MasterKeyError::Other(Box::new(other)),
        }
    }
}
