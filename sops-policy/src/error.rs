//! Errors building an [`crate::EncryptionPolicy`].

/// Errors validating a resolved policy configuration.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// More than one bulk mode (suffix/regex/comment-regex, encrypted or
    /// unencrypted) was set at once. The modes are mutually exclusive —
    /// pick one.
    #[error("conflicting bulk modes: {0}")]
    ConflictingModes(String),
    #[error("invalid regex for {field}: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
