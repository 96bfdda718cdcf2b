use tracing::{debug, warn};

use super::types::{RewardVector, ScoringContext};
use super::ScoringStrategy;
use crate::protocol::{MinerResponse, ProtocolMode, RelevanceSet};

/// `1 / (i + 1)` for the first id at index `i` found in `relevant`, else `0.0`.
pub fn reciprocal_rank(relevant: &RelevanceSet, document_ids: &[String]) -> f32 {
    document_ids
        .iter()
        .position(|id| relevant.contains(id))
        .map(|i| 1.0 / (i + 1) as f32)
        .unwrap_or(0.0)
}

/// Ground-truth scorer for benchmark rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrrScorer;

impl MrrScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_response(&self, relevant: &RelevanceSet, response: &MinerResponse) -> f32 {
        if !response.has_results() {
            return 0.0;
        }
        reciprocal_rank(relevant, &response.document_ids)
    }
}

impl ScoringStrategy for MrrScorer {
    fn name(&self) -> &'static str {
        "mrr"
    }

    fn protocol_mode(&self) -> ProtocolMode {
        ProtocolMode::IdsOnly
    }

    fn requires_ground_truth(&self) -> bool {
        true
    }

    fn score(&self, context: &ScoringContext, responses: &[MinerResponse]) -> RewardVector {
        let Some(relevant) = &context.relevant else {
            warn!(
                query = %context.query,
                responses = responses.len(),
                "MRR round without ground truth, all rewards are zero"
            );
            return RewardVector::zeros(responses.len());
        };

        let rewards: RewardVector = responses
            .iter()
            .map(|response| self.score_response(relevant, response))
            .collect();

        debug!(
            responses = responses.len(),
            mean = rewards.mean(),
            "MRR scoring complete"
        );

        rewards
    }
}
