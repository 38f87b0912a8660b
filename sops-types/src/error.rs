//! Shared error type for data-model construction failures.

/// Errors building or validating core data-model values.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    #[error("data key error: {0}")]
    DataKey(#[from] crate::datakey::DataKeyError),
    #[error("value decode error: {0}")]
    ValueDecode(#[from] crate::value::ValueDecodeError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
