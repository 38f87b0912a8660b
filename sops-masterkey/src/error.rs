//! Errors a [`crate::MasterKey`] backend can return.

/// Errors from wrapping or unwrapping a data key against a master key
/// backend. This is the full set the orchestrator is allowed to branch on
/// — backend crates must map their own errors into one of these variants
/// rather than leaking backend-specific error types across the trait
/// boundary.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum MasterKeyError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("integrity check failed: {0}")]
    IntegrityError(String),
    #[error("master key not found: {0}")]
    NotFound(String),
    #[error("operation unsupported: {0}")]
    UnsupportedOperation(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
