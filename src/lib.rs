//! CERS library crate (used by the validator and miner binaries and integration tests).
//!
//! # Public API Surface
//!
//! ## Protocol
//! - [`Query`], [`QueryRequest`], [`QueryReply`], [`DocumentReply`] - Wire messages
//! - [`MinerResponse`], [`MinerUid`], [`ProtocolMode`] - Validator-side view of a reply
//!
//! ## Validator
//! - [`RoundDriver`], [`RoundSettings`], [`RoundOutcome`] - Round loop
//! - [`BenchmarkQuerySource`], [`FreeQuerySource`] - Query selection
//! - [`dispatch_round`], [`HttpDispatchClient`], [`MinerRegistry`] - Fan-out
//! - [`MrrScorer`], [`CrossEncoderScorer`], [`RewardEngine`] - Rewards
//! - [`MovingAverageSink`] - Per-miner score tracking
//!
//! ## Miner
//! - [`DocumentStore`], [`seed_from_file`] - Document index
//! - [`create_router_with_state`], [`MinerState`] - HTTP gateway
//! - [`SentenceEncoder`] - Embeddings
//!
//! ## Vector Database
//! - [`QdrantIndex`] - Qdrant-backed index
//! - [`InMemoryVectorDb`] - In-process index for tests and qdrant-less miners
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod miner;
pub mod protocol;
pub mod query;
pub mod reward;
pub mod shutdown;
pub mod validator;
pub mod vectordb;

pub use config::{ConfigError, MinerConfig, ValidatorConfig};
#[cfg(any(test, feature = "mock"))]
pub use dispatch::{MockBehaviour, ScriptedDispatchClient};
pub use dispatch::{
    DispatchClient, DispatchError, DispatchTimeouts, HttpDispatchClient, MinerEndpoint,
    MinerRegistry, dispatch_round,
};
pub use embedding::{
    EncoderConfig, ModelError, ModelKind, Reranker, RerankerConfig, SentenceEncoder,
};
pub use gateway::{GatewayError, MinerState, create_router_with_state};
pub use hashing::{api_key_matches, hash_api_key, hash_document_id};
pub use miner::{
    Document, DocumentStore, MinerError, RetrievedDocument, SeedOutcome, read_seed_file,
    seed_from_file,
};
pub use protocol::{
    DocumentReply, MinerResponse, MinerUid, ProtocolError, ProtocolMode, Query, QueryReply,
    QueryRequest, RelevanceSet,
};
pub use query::{
    BenchmarkItem, BenchmarkQuerySource, FreeQuerySource, QuerySource, QuerySourceError,
    QuerySourceKind, RoundQuery,
};
#[cfg(any(test, feature = "mock"))]
pub use reward::{FailingRelevanceModel, FixedRelevanceModel, PanickingRelevanceModel};
pub use reward::{
    CrossEncoderScorer, MrrScorer, RelevanceModel, RewardEngine, RewardMode, RewardVector,
    ScoringContext, ScoringError, ScoringStrategy, reciprocal_rank,
};
pub use validator::{
    MovingAverageSink, RoundDriver, RoundError, RoundOutcome, RoundSettings, ScoreSink,
    query_source_from_config, reward_engine_from_config,
};
pub use vectordb::{InMemoryVectorDb, IndexError, QdrantIndex, VectorIndex};
