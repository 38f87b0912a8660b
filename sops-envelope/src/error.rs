//! Errors reading or building a metadata envelope.

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(String),

    #[error("envelope has neither key-groups nor a recognized legacy layout")]
    NoKeyMaterial,

    #[error("more than one bulk encryption rule set: {0}")]
    ConflictingPolicyFields(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
