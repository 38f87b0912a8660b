//! Errors from the leaf cipher and integrity MAC.

/// Errors from encrypting, decrypting, or parsing a leaf ciphertext token,
/// or from MAC verification.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("malformed ciphertext token: {0}")]
    MalformedCiphertext(String),
    #[error("unsupported cipher identifier: {0}")]
    UnsupportedCipher(String),
    #[error("AEAD authentication failed")]
    Integrity,
    #[error("MAC verification failed")]
    MacMismatch,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
