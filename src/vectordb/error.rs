use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector index at '{url}' is unreachable: {message}")]
    Unreachable { url: String, message: String },

    /// The backend rejected an operation.
    #[error("{op} failed on collection '{collection}': {message}")]
    Backend {
        op: &'static str,
        collection: String,
        message: String,
    },

    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}
