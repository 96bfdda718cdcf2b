//! Model wrappers.
//!
//! - [`encoder`] turns documents and queries into embeddings for the miner's index.
//! - [`reranker`] is the cross-encoder behind the validator's relevance scoring.
//!
//! Both run on candle and fall back to a deterministic stub when no model directory is
//! configured.

/// BERT heads (sequence classification and mean pooling).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder for the miner index.
pub mod encoder;
mod error;
pub(crate) mod lexical;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{EncoderConfig, SentenceEncoder};
pub use error::{ModelError, ModelKind};
pub use reranker::{Reranker, RerankerConfig};
