use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::error::ScoringError;
use super::types::{RewardVector, ScoringContext};
use super::ScoringStrategy;
use crate::embedding::Reranker;
use crate::protocol::{MinerResponse, ProtocolMode};

/// Jointly scores `(query, document)` pairs, one value per document.
pub trait RelevanceModel: Send + Sync {
    fn predict(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, ScoringError>;
}

impl RelevanceModel for Reranker {
    fn predict(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, ScoringError> {
        Ok(self.score_batch(query, documents)?)
    }
}

/// Rewards each response with the best relevance among the documents it returned.
pub struct CrossEncoderScorer {
    model: Arc<dyn RelevanceModel>,
    // One batch in the model at a time.
    gate: Mutex<()>,
}

impl std::fmt::Debug for CrossEncoderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderScorer").finish_non_exhaustive()
    }
}

impl CrossEncoderScorer {
    pub fn new(model: Arc<dyn RelevanceModel>) -> Self {
        Self {
            model,
            gate: Mutex::new(()),
        }
    }

    /// Max relevance over the response's documents.
    pub fn score_response(
        &self,
        query: &str,
        response: &MinerResponse,
    ) -> Result<f32, ScoringError> {
        if !response.success || response.documents.is_empty() {
            return Ok(0.0);
        }

        let documents: Vec<&str> = response.documents.iter().map(String::as_str).collect();
        // A panicking model zeroes this response only.
        let outcome = {
            let _guard = self.gate.lock();
            catch_unwind(AssertUnwindSafe(|| self.model.predict(query, &documents)))
        };
        let scores = outcome.map_err(|panic| ScoringError::ComputationFailed {
            reason: format!("relevance model panicked: {}", panic_message(&*panic)),
        })??;

        if scores.len() != documents.len() {
            return Err(ScoringError::ScoreCountMismatch {
                expected: documents.len(),
                actual: scores.len(),
            });
        }

        let best = scores.into_iter().fold(f32::NEG_INFINITY, f32::max);
        if !best.is_finite() {
            return Err(ScoringError::ComputationFailed {
                reason: format!("non-finite relevance score {best}"),
            });
        }

        Ok(best)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

impl ScoringStrategy for CrossEncoderScorer {
    fn name(&self) -> &'static str {
        "cross_encoder"
    }

    fn protocol_mode(&self) -> ProtocolMode {
        ProtocolMode::WithDocuments
    }

    fn requires_ground_truth(&self) -> bool {
        false
    }

    fn score(&self, context: &ScoringContext, responses: &[MinerResponse]) -> RewardVector {
        let query = context.query.as_str();

        let rewards: RewardVector = responses
            .iter()
            .map(|response| match self.score_response(query, response) {
                Ok(score) => score,
                Err(e) => {
                    warn!(uid = %response.uid, error = %e, "Relevance scoring failed, reward is zero");
                    0.0
                }
            })
            .collect();

        debug!(
            responses = responses.len(),
            best = rewards.max().unwrap_or(0.0),
            "Cross-encoder scoring complete"
        );

        rewards
    }
}

/// Scores documents from a fixed table; unknown documents get the default score.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct FixedRelevanceModel {
    scores: std::collections::HashMap<String, f32>,
    default_score: f32,
}

#[cfg(any(test, feature = "mock"))]
impl FixedRelevanceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, document: impl Into<String>, score: f32) -> Self {
        self.scores.insert(document.into(), score);
        self
    }

    pub fn with_default_score(mut self, score: f32) -> Self {
        self.default_score = score;
        self
    }
}

#[cfg(any(test, feature = "mock"))]
impl RelevanceModel for FixedRelevanceModel {
    fn predict(&self, _query: &str, documents: &[&str]) -> Result<Vec<f32>, ScoringError> {
        Ok(documents
            .iter()
            .map(|doc| self.scores.get(*doc).copied().unwrap_or(self.default_score))
            .collect())
    }
}

/// Errors on any batch containing the trigger text, otherwise scores every document `1.0`.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct FailingRelevanceModel {
    trigger: String,
}

#[cfg(any(test, feature = "mock"))]
impl FailingRelevanceModel {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl RelevanceModel for FailingRelevanceModel {
    fn predict(&self, _query: &str, documents: &[&str]) -> Result<Vec<f32>, ScoringError> {
        if documents.iter().any(|doc| doc.contains(&self.trigger)) {
            return Err(ScoringError::ComputationFailed {
                reason: format!("model rejected input containing '{}'", self.trigger),
            });
        }
        Ok(vec![1.0; documents.len()])
    }
}

/// Panics on any batch containing the trigger text, otherwise scores every document `1.0`.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct PanickingRelevanceModel {
    trigger: String,
}

#[cfg(any(test, feature = "mock"))]
impl PanickingRelevanceModel {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl RelevanceModel for PanickingRelevanceModel {
    fn predict(&self, _query: &str, documents: &[&str]) -> Result<Vec<f32>, ScoringError> {
        if documents.iter().any(|doc| doc.contains(&self.trigger)) {
            panic!("relevance model crashed on '{}'", self.trigger);
        }
        Ok(vec![1.0; documents.len()])
    }
}
