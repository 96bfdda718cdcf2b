//! Validator rounds: query, fan out, score, record.

mod driver;
mod error;
mod sink;


pub use driver::{RoundDriver, RoundOutcome, RoundSettings};
pub use error::RoundError;
pub use sink::{MovingAverageSink, ScoreSink};

use std::sync::Arc;

use tracing::info;

use crate::config::ValidatorConfig;
use crate::embedding::{ModelError, Reranker, RerankerConfig};
use crate::query::{BenchmarkQuerySource, FreeQuerySource, QuerySource, QuerySourceKind};
use crate::reward::{CrossEncoderScorer, MrrScorer, RewardEngine, RewardMode};

/// Builds the configured query source. Missing data files degrade instead of failing:
/// an empty benchmark skips rounds, a missing query list falls back to built-in queries.
pub fn query_source_from_config(config: &ValidatorConfig) -> Arc<dyn QuerySource> {
    match config.query_source {
        QuerySourceKind::Benchmark => {
            Arc::new(BenchmarkQuerySource::load_or_empty(&config.benchmark_path))
        }
        QuerySourceKind::Free => Arc::new(FreeQuerySource::load_or_default(&config.queries_path)),
    }
}

/// Builds the configured reward strategy, loading the cross-encoder model if needed.
pub fn reward_engine_from_config(config: &ValidatorConfig) -> Result<RewardEngine, ModelError> {
    match config.reward_mode {
        RewardMode::Mrr => Ok(RewardEngine::Mrr(MrrScorer::new())),
        RewardMode::CrossEncoder => {
            let reranker_config = match &config.reranker_path {
                Some(path) => RerankerConfig::new(path.clone()),
                None => RerankerConfig::stub(),
            };
            let reranker = Reranker::load(reranker_config)?;
            info!(
                model_loaded = reranker.is_model_loaded(),
                "Cross-encoder ready"
            );
            Ok(RewardEngine::CrossEncoder(CrossEncoderScorer::new(
                Arc::new(reranker),
            )))
        }
    }
}
