use std::error::Error as StdError;

/// Errors raised while building conditions or dispatching to a store.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid group `{key}`: {reason}")]
    InvalidGroup { key: String, reason: String },
    #[error("invalid condition `{key}`: {reason}")]
    InvalidCondition { key: String, reason: String },
    #[error("invalid operand for {operator}: {reason}")]
    InvalidOperand {
        operator: &'static str,
        reason: String,
    },
    /// An update or delete reached dispatch with no conditions, which would
    /// match the whole collection.
    #[error("refusing {operation} on {collection} without conditions")]
    Unconstrained {
        operation: &'static str,
        collection: String,
    },
    #[error("no document found in {collection}")]
    NotFound { collection: String },
    #[error("store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl QueryError {
    pub(crate) fn store<E>(e: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        QueryError::Store(Box::new(e))
    }
}
