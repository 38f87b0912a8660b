//! Errors from splitting or reconstructing a data key across key groups.

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ShamirError {
    #[error("key group has no master keys configured")]
    EmptyKeyGroup,

    #[error("every master key in the group failed to wrap the share: {0}")]
    GroupWrapFailed(String),

    #[error("recovered {recovered} of {required} required shares")]
    InsufficientShares { recovered: usize, required: usize },

    #[error("a key group is missing its share_index but threshold splitting is in effect")]
    MissingShareIndex,

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
