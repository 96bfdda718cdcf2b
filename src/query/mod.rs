//! Per-round query selection.
//!
//! - [`BenchmarkQuerySource`] pairs each query with its ground-truth ids (MRR rounds).
//! - [`FreeQuerySource`] draws bare query strings (cross-encoder rounds).
//!
//! Both draw uniformly at random with replacement; the same query can come up in
//! consecutive rounds.

mod benchmark;
mod error;
mod free;

#[cfg(test)]
mod tests;

pub use benchmark::{BenchmarkItem, BenchmarkQuerySource};
pub use error::QuerySourceError;
pub use free::FreeQuerySource;

use crate::protocol::{Query, RelevanceSet};

/// What a round is played with.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundQuery {
    pub query: Query,
    /// Present only for benchmark queries.
    pub relevant: Option<RelevanceSet>,
}

/// Supplies one query per round.
pub trait QuerySource: Send + Sync {
    /// Draws the next query. Errors mean "skip this round".
    fn next_query(&self) -> Result<RoundQuery, QuerySourceError>;

    /// `true` if drawn queries carry a relevance set.
    fn provides_ground_truth(&self) -> bool;

    /// Number of queries available.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which [`QuerySource`] a validator builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySourceKind {
    Benchmark,
    Free,
}

impl QuerySourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuerySourceKind::Benchmark => "benchmark",
            QuerySourceKind::Free => "free",
        }
    }
}

impl std::fmt::Display for QuerySourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuerySourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benchmark" => Ok(QuerySourceKind::Benchmark),
            "free" => Ok(QuerySourceKind::Free),
            other => Err(format!(
                "unknown query source '{other}', expected 'benchmark' or 'free'"
            )),
        }
    }
}
