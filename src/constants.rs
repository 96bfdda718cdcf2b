//! Cross-cutting, shared constants.
//!
//! Defaults here are the single source for both roles; config loaders and module configs
//! refer back to them instead of repeating literals.

/// Documents returned per query when `CERS_SEARCH_K` is not set.
pub const DEFAULT_SEARCH_K: usize = 2;

/// Miners sampled per validator round.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Per-miner request timeout (and default round timeout), in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Pause between validator rounds, in seconds.
pub const DEFAULT_ROUND_INTERVAL_SECS: f64 = 12.0;

/// Weight of the newest reward in the moving-average score.
pub const DEFAULT_MOVING_AVERAGE_ALPHA: f32 = 0.1;

/// Output dimension of the sentence encoder (MiniLM-L6 family).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token budget for both the encoder and the cross-encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Collection the miner indexes documents into.
pub const DEFAULT_COLLECTION_NAME: &str = "enterprise-rag";

pub const DEFAULT_MINER_PORT: u16 = 8001;

/// Documents embedded per index write while seeding.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 100;

/// Header carrying the miner management API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Status header attached to every miner gateway response.
pub const CERS_STATUS_HEADER: &str = "x-cers-status";

pub const DEFAULT_BENCHMARK_PATH: &str = "data/benchmark.json";
pub const DEFAULT_QUERIES_PATH: &str = "data/queries.txt";
pub const DEFAULT_MINERS_PATH: &str = "data/miners.json";
pub const DEFAULT_DOCUMENTS_PATH: &str = "data/documents.jsonl";

/// Queries used in free-query mode when no query file is available.
pub const DEFAULT_QUERIES: &[&str] = &[
    "What is Bittensor?",
    "How does Cohere's RAG work?",
    "Explain the concept of a decentralized AI network.",
    "What is the capital of France?",
];
