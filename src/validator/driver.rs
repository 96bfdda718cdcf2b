use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::{RoundError, ScoreSink};
use crate::config::ValidatorConfig;
use crate::dispatch::{DispatchClient, DispatchTimeouts, MinerRegistry, dispatch_round};
use crate::protocol::{MinerResponse, MinerUid, Query, QueryRequest};
use crate::query::{QuerySource, RoundQuery};
use crate::reward::{RewardVector, ScoringContext, ScoringStrategy};

/// Knobs for running rounds.
#[derive(Debug, Clone, Copy)]
pub struct RoundSettings {
    pub sample_size: usize,
    pub timeouts: DispatchTimeouts,
    pub round_interval: Duration,
}

impl From<&ValidatorConfig> for RoundSettings {
    fn from(config: &ValidatorConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            timeouts: DispatchTimeouts {
                per_miner: config.timeout,
                round: config.round_timeout,
            },
            round_interval: config.round_interval,
        }
    }
}

/// What one completed round produced.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round_id: Uuid,
    pub query: Query,
    /// Dispatch order.
    pub uids: Vec<MinerUid>,
    /// `rewards[i]` belongs to `uids[i]`.
    pub rewards: RewardVector,
    /// Miners that answered in time.
    pub answered: usize,
}

/// Runs validator rounds over narrow collaborators.
pub struct RoundDriver {
    queries: Arc<dyn QuerySource>,
    client: Arc<dyn DispatchClient>,
    strategy: Arc<dyn ScoringStrategy>,
    sink: Arc<dyn ScoreSink>,
    registry: MinerRegistry,
    settings: RoundSettings,
}

impl std::fmt::Debug for RoundDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundDriver")
            .field("strategy", &self.strategy.name())
            .field("queries", &self.queries.len())
            .field("miners", &self.registry.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RoundDriver {
    /// Fails if the strategy needs ground truth the query source cannot provide.
    pub fn new(
        queries: Arc<dyn QuerySource>,
        client: Arc<dyn DispatchClient>,
        strategy: Arc<dyn ScoringStrategy>,
        sink: Arc<dyn ScoreSink>,
        registry: MinerRegistry,
        settings: RoundSettings,
    ) -> Result<Self, RoundError> {
        if strategy.requires_ground_truth() && !queries.provides_ground_truth() {
            return Err(RoundError::IncompatibleQuerySource {
                strategy: strategy.name(),
            });
        }

        if registry.is_empty() {
            warn!("Miner registry is empty, every round will be skipped");
        }
        if queries.is_empty() {
            warn!("Query source is empty, every round will be skipped");
        }

        Ok(Self {
            queries,
            client,
            strategy,
            sink,
            registry,
            settings,
        })
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    /// Plays one round end to end and records its rewards.
    pub async fn run_round(&self) -> Result<RoundOutcome, RoundError> {
        let round_id = Uuid::new_v4();
        let span = info_span!("round", %round_id, strategy = self.strategy.name());
        self.play(round_id).instrument(span).await
    }

    async fn play(&self, round_id: Uuid) -> Result<RoundOutcome, RoundError> {
        let RoundQuery { query, relevant } = self.queries.next_query()?;

        if self.registry.is_empty() {
            return Err(RoundError::NoMiners);
        }
        let miners = self
            .registry
            .sample(self.settings.sample_size, &mut rand::thread_rng());
        let uids: Vec<MinerUid> = miners.iter().map(|m| m.uid).collect();

        debug!(query = %query, miners = miners.len(), "Dispatching round");

        let responses = dispatch_round(
            self.client.as_ref(),
            &miners,
            &QueryRequest::new(&query),
            self.strategy.protocol_mode(),
            self.settings.timeouts,
        )
        .await;
        let answered = responses.iter().filter(|r| r.success).count();

        let rewards = self
            .score(ScoringContext::new(query.clone(), relevant), responses)
            .await;

        self.sink.record(&uids, &rewards);

        info!(
            query = %query,
            dispatched = uids.len(),
            answered,
            mean_reward = rewards.mean(),
            max_reward = rewards.max().unwrap_or(0.0),
            "Round complete"
        );

        Ok(RoundOutcome {
            round_id,
            query,
            uids,
            rewards,
            answered,
        })
    }

    /// Scores on the blocking pool. A panicking or misbehaving strategy yields all zeros.
    async fn score(
        &self,
        context: ScoringContext,
        responses: Vec<MinerResponse>,
    ) -> RewardVector {
        let expected = responses.len();
        let strategy = Arc::clone(&self.strategy);

        let rewards =
            match tokio::task::spawn_blocking(move || strategy.score(&context, &responses)).await {
                Ok(rewards) => rewards,
                Err(e) => {
                    error!(error = %e, "Scoring task failed, all rewards are zero");
                    return RewardVector::zeros(expected);
                }
            };

        if rewards.len() != expected {
            error!(
                expected,
                actual = rewards.len(),
                "Strategy returned the wrong number of rewards, all rewards are zero"
            );
            return RewardVector::zeros(expected);
        }

        rewards
    }

    /// Runs rounds every `round_interval` until `shutdown` resolves. Returns the number of
    /// completed rounds. Failed rounds are logged and skipped.
    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.settings.round_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut completed = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                _ = &mut shutdown => break,
                result = self.run_round() => match result {
                    Ok(_) => completed += 1,
                    Err(e) => warn!(error = %e, "Round skipped"),
                },
            }
        }

        info!(completed, "Validator loop stopped");
        completed
    }
}
