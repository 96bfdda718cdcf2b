use thiserror::Error;

use crate::embedding::ModelError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("relevance model returned {actual} scores for {expected} documents")]
    ScoreCountMismatch { expected: usize, actual: usize },

    #[error("scoring computation failed: {reason}")]
    ComputationFailed { reason: String },
}
