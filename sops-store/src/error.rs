//! Errors loading or emitting a document through a [`crate::Store`].

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("document has no envelope (not an encrypted document)")]
    MissingEnvelope,

    #[error(transparent)]
    Envelope(#[from] sops_envelope::EnvelopeError),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
