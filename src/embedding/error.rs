use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which model an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Encoder,
    Reranker,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::Encoder => "encoder",
            ModelKind::Reranker => "reranker",
        })
    }
}

/// Loading or running the sentence encoder or the cross-encoder.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {model} configuration: {reason}")]
    InvalidConfig { model: ModelKind, reason: String },

    #[error("{model} model not found at {}", path.display())]
    ModelNotFound { model: ModelKind, path: PathBuf },

    #[error("failed to load {model} model: {reason}")]
    LoadFailed { model: ModelKind, reason: String },

    #[error("{model} tokenization failed: {reason}")]
    Tokenization { model: ModelKind, reason: String },

    #[error("{model} inference failed: {reason}")]
    Inference { model: ModelKind, reason: String },

    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
}

impl ModelError {
    pub fn model(&self) -> Option<ModelKind> {
        match self {
            ModelError::InvalidConfig { model, .. }
            | ModelError::ModelNotFound { model, .. }
            | ModelError::LoadFailed { model, .. }
            | ModelError::Tokenization { model, .. }
            | ModelError::Inference { model, .. } => Some(*model),
            ModelError::Tensor(_) => None,
        }
    }
}
