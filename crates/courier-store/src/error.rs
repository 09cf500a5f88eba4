use std::time::Duration;

/// Errors from collection driver operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document with the same `_id`, or matching an insert guard, is
    /// already stored.
    #[error("duplicate key in {collection}: {id}")]
    DuplicateKey { collection: String, id: String },

    /// The operation did not finish before its context deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend failed in a way the caller cannot fix.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
