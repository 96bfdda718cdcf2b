use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::ModelError;
use crate::vectordb::IndexError;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] ModelError),

    #[error("vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("blocking task failed: {reason}")]
    BlockingTask { reason: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
