use std::path::PathBuf;
use std::time::Duration;

use super::{
    ConfigError, parse_from_env, parse_optional_from_env, parse_optional_path_from_env,
    parse_path_from_env, parse_secs_from_env, require_dir, require_positive,
};
use crate::constants::{
    DEFAULT_BENCHMARK_PATH, DEFAULT_MINERS_PATH, DEFAULT_MOVING_AVERAGE_ALPHA,
    DEFAULT_QUERIES_PATH, DEFAULT_ROUND_INTERVAL_SECS, DEFAULT_SAMPLE_SIZE, DEFAULT_TIMEOUT_SECS,
};
use crate::query::QuerySourceKind;
use crate::reward::RewardMode;

/// Validator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Miners queried per round. Default: `10`.
    pub sample_size: usize,

    /// Budget for a single miner's reply. Default: `10s`.
    pub timeout: Duration,

    /// Budget for the whole fan-out. Defaults to `timeout`.
    pub round_timeout: Duration,

    /// Pause between round starts. Default: `12s`.
    pub round_interval: Duration,

    pub reward_mode: RewardMode,

    /// Defaults to `benchmark` for MRR and `free` for the cross-encoder.
    pub query_source: QuerySourceKind,

    /// JSON array of `{query, relevant_docs}`.
    pub benchmark_path: PathBuf,

    /// One query per line.
    pub queries_path: PathBuf,

    /// JSON array of miner endpoints.
    pub miners_path: PathBuf,

    /// Cross-encoder model directory; the lexical stub is used when unset.
    pub reranker_path: Option<PathBuf>,

    /// Weight of the newest reward in the moving average. Default: `0.1`.
    pub moving_average_alpha: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let timeout = Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS);
        let reward_mode = RewardMode::default();
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            timeout,
            round_timeout: timeout,
            round_interval: Duration::from_secs_f64(DEFAULT_ROUND_INTERVAL_SECS),
            reward_mode,
            query_source: Self::default_query_source(reward_mode),
            benchmark_path: PathBuf::from(DEFAULT_BENCHMARK_PATH),
            queries_path: PathBuf::from(DEFAULT_QUERIES_PATH),
            miners_path: PathBuf::from(DEFAULT_MINERS_PATH),
            reranker_path: None,
            moving_average_alpha: DEFAULT_MOVING_AVERAGE_ALPHA,
        }
    }
}

impl ValidatorConfig {
    const ENV_SAMPLE_SIZE: &'static str = "CERS_SAMPLE_SIZE";
    const ENV_TIMEOUT_SECS: &'static str = "CERS_TIMEOUT_SECS";
    const ENV_ROUND_TIMEOUT_SECS: &'static str = "CERS_ROUND_TIMEOUT_SECS";
    const ENV_ROUND_INTERVAL_SECS: &'static str = "CERS_ROUND_INTERVAL_SECS";
    const ENV_REWARD_MODE: &'static str = "CERS_REWARD_MODE";
    const ENV_QUERY_SOURCE: &'static str = "CERS_QUERY_SOURCE";
    const ENV_BENCHMARK_PATH: &'static str = "CERS_BENCHMARK_PATH";
    const ENV_QUERIES_PATH: &'static str = "CERS_QUERIES_PATH";
    const ENV_MINERS_PATH: &'static str = "CERS_MINERS_PATH";
    const ENV_RERANKER_PATH: &'static str = "CERS_RERANKER_PATH";
    const ENV_MOVING_AVERAGE_ALPHA: &'static str = "CERS_MOVING_AVERAGE_ALPHA";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let sample_size = parse_from_env(Self::ENV_SAMPLE_SIZE, defaults.sample_size)?;
        let timeout = parse_secs_from_env(Self::ENV_TIMEOUT_SECS, defaults.timeout)?;
        let round_timeout = parse_secs_from_env(Self::ENV_ROUND_TIMEOUT_SECS, timeout)?;
        let round_interval =
            parse_secs_from_env(Self::ENV_ROUND_INTERVAL_SECS, defaults.round_interval)?;
        let reward_mode = parse_from_env(Self::ENV_REWARD_MODE, defaults.reward_mode)?;
        let query_source = parse_optional_from_env(Self::ENV_QUERY_SOURCE)?
            .unwrap_or_else(|| Self::default_query_source(reward_mode));
        let benchmark_path = parse_path_from_env(Self::ENV_BENCHMARK_PATH, defaults.benchmark_path);
        let queries_path = parse_path_from_env(Self::ENV_QUERIES_PATH, defaults.queries_path);
        let miners_path = parse_path_from_env(Self::ENV_MINERS_PATH, defaults.miners_path);
        let reranker_path = parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let moving_average_alpha =
            parse_from_env(Self::ENV_MOVING_AVERAGE_ALPHA, defaults.moving_average_alpha)?;

        Ok(Self {
            sample_size,
            timeout,
            round_timeout,
            round_interval,
            reward_mode,
            query_source,
            benchmark_path,
            queries_path,
            miners_path,
            reranker_path,
            moving_average_alpha,
        })
    }

    pub fn default_query_source(mode: RewardMode) -> QuerySourceKind {
        match mode {
            RewardMode::Mrr => QuerySourceKind::Benchmark,
            RewardMode::CrossEncoder => QuerySourceKind::Free,
        }
    }

    /// Checks invariants. Data files are not required to exist; missing sources are
    /// handled at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(Self::ENV_SAMPLE_SIZE, self.sample_size)?;

        for (name, value) in [
            (Self::ENV_TIMEOUT_SECS, self.timeout),
            (Self::ENV_ROUND_TIMEOUT_SECS, self.round_timeout),
            (Self::ENV_ROUND_INTERVAL_SECS, self.round_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: format!("{}", value.as_secs_f64()),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        let alpha = self.moving_average_alpha;
        if !(alpha.is_finite() && alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MOVING_AVERAGE_ALPHA,
                value: alpha.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }

        if self.reward_mode == RewardMode::Mrr && self.query_source == QuerySourceKind::Free {
            return Err(ConfigError::Incompatible {
                reason: "mrr scoring needs ground truth, use the benchmark query source"
                    .to_string(),
            });
        }

        if let Some(ref path) = self.reranker_path {
            require_dir(path)?;
        }

        Ok(())
    }
}
