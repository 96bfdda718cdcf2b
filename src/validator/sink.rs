use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::protocol::MinerUid;
use crate::reward::RewardVector;

/// Receives each round's rewards.
pub trait ScoreSink: Send + Sync {
    /// `uids[i]` earned `rewards[i]`.
    fn record(&self, uids: &[MinerUid], rewards: &RewardVector);
}

/// Exponential moving average of rewards per miner, starting from zero.
#[derive(Debug)]
pub struct MovingAverageSink {
    alpha: f32,
    scores: RwLock<HashMap<MinerUid, f32>>,
}

impl MovingAverageSink {
    /// # Panics
    ///
    /// Panics if `alpha` is not in `(0, 1]`.
    pub fn new(alpha: f32) -> Self {
        assert!(
            alpha.is_finite() && alpha > 0.0 && alpha <= 1.0,
            "alpha must be in (0, 1]"
        );
        Self {
            alpha,
            scores: RwLock::new(HashMap::new()),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn score(&self, uid: MinerUid) -> Option<f32> {
        self.scores.read().get(&uid).copied()
    }

    /// All scores, ordered by uid.
    pub fn scores(&self) -> Vec<(MinerUid, f32)> {
        let mut scores: Vec<_> = self
            .scores
            .read()
            .iter()
            .map(|(uid, score)| (*uid, *score))
            .collect();
        scores.sort_by_key(|(uid, _)| *uid);
        scores
    }
}

impl ScoreSink for MovingAverageSink {
    fn record(&self, uids: &[MinerUid], rewards: &RewardVector) {
        let mut scores = self.scores.write();
        for (uid, reward) in uids.iter().zip(rewards.iter()) {
            let reward = if reward.is_finite() { reward } else { 0.0 };
            let score = scores.entry(*uid).or_insert(0.0);
            *score = self.alpha * reward + (1.0 - self.alpha) * *score;
        }
        debug!(updated = uids.len().min(rewards.len()), "Scores updated");
    }
}
