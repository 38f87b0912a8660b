//! Composite error for the encrypt/decrypt orchestration. Never carries
//! key material or plaintext — only component names, identifiers, and
//! paths, all already safe to log.

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no key groups configured")]
    NoKeyGroups,

    #[error("policy error: {0}")]
    Policy(#[from] sops_policy::PolicyError),

    #[error("crypto error at path {path}: {source}")]
    Crypto {
        path: String,
        #[source]
        source: sops_crypto::CryptoError,
    },

    #[error("shamir error: {0}")]
    Shamir(#[from] sops_shamir::ShamirError),

    #[error("envelope error: {0}")]
    Envelope(#[from] sops_envelope::EnvelopeError),

    #[error("not enough key groups recovered the data key: got {recovered} of {required}")]
    InsufficientShares { recovered: usize, required: usize },

    #[error("integrity check failed: stored MAC does not match recomputed tree contents")]
    IntegrityFailure,

    #[error("operation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
