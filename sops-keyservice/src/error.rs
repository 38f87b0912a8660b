//! Errors from dispatching a Key Service Protocol request.

use sops_masterkey::MasterKeyError;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum KeyServiceError {
    /// The backend a request named could not be reached or resolved.
    #[error("master key backend error: {0}")]
    Backend(#[from] MasterKeyError),

    /// No resolver is registered for this master key kind/identifier.
    #[error("no backend resolver for master key: {0}")]
    UnresolvedMasterKey(String),

    /// The server rejected the request before it reached a backend
    /// (malformed envelope, unknown method, etc.).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The out-of-process transport was unreachable, or the connection
    /// was lost mid-request. Per the protocol's at-most-once guarantee,
    /// callers must not assume the request executed and must not
    /// automatically retry.
    #[error("key service unavailable: {0}")]
    KeyServiceUnavailable(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
