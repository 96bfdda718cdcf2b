//! Reward engine: turns a round's miner responses into a [`RewardVector`].
//!
//! Two strategies sit behind [`ScoringStrategy`]:
//!
//! - [`MrrScorer`]: reciprocal rank of the first ground-truth hit.
//! - [`CrossEncoderScorer`]: best cross-encoder relevance among the returned documents.
//!
//! [`RewardEngine`] is the configured choice between them. Every strategy scores each
//! response on its own; no strategy reads or writes anything shared between responses,
//! and any per-response failure becomes a `0.0` for that response only.

pub mod cross_encoder;
pub mod error;
pub mod mrr;
pub mod types;


pub use cross_encoder::{CrossEncoderScorer, RelevanceModel};
#[cfg(any(test, feature = "mock"))]
pub use cross_encoder::{FailingRelevanceModel, FixedRelevanceModel, PanickingRelevanceModel};
pub use error::ScoringError;
pub use mrr::{MrrScorer, reciprocal_rank};
pub use types::{RewardMode, RewardVector, ScoringContext};

use crate::protocol::{MinerResponse, ProtocolMode};

/// One way of scoring a batch of responses.
pub trait ScoringStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Reply variant miners must be asked for.
    fn protocol_mode(&self) -> ProtocolMode;

    /// `true` if the context must carry a relevance set.
    fn requires_ground_truth(&self) -> bool;

    /// Scores `responses` in order. The result always has `responses.len()` entries.
    fn score(&self, context: &ScoringContext, responses: &[MinerResponse]) -> RewardVector;
}

/// The reward strategy selected by configuration.
#[derive(Debug)]
pub enum RewardEngine {
    Mrr(MrrScorer),
    CrossEncoder(CrossEncoderScorer),
}

impl RewardEngine {
    pub fn mode(&self) -> RewardMode {
        match self {
            RewardEngine::Mrr(_) => RewardMode::Mrr,
            RewardEngine::CrossEncoder(_) => RewardMode::CrossEncoder,
        }
    }

    fn inner(&self) -> &dyn ScoringStrategy {
        match self {
            RewardEngine::Mrr(scorer) => scorer,
            RewardEngine::CrossEncoder(scorer) => scorer,
        }
    }
}

impl ScoringStrategy for RewardEngine {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn protocol_mode(&self) -> ProtocolMode {
        self.inner().protocol_mode()
    }

    fn requires_ground_truth(&self) -> bool {
        self.inner().requires_ground_truth()
    }

    fn score(&self, context: &ScoringContext, responses: &[MinerResponse]) -> RewardVector {
        self.inner().score(context, responses)
    }
}
