use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::QuerySourceError;
use super::{QuerySource, RoundQuery};
use crate::protocol::{Query, RelevanceSet};

/// One record of the benchmark dataset file.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkItem {
    pub query: String,
    #[serde(default)]
    pub relevant_docs: Vec<String>,
}

/// Benchmark queries with known relevant documents, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkQuerySource {
    items: Vec<(Query, RelevanceSet)>,
}

impl BenchmarkQuerySource {
    /// Builds the source from records, skipping records with an empty query.
    pub fn from_items(items: impl IntoIterator<Item = BenchmarkItem>) -> Self {
        let items: Vec<_> = items
            .into_iter()
            .filter_map(|item| match Query::new(item.query) {
                Ok(query) => Some((query, item.relevant_docs.into_iter().collect())),
                Err(_) => {
                    warn!("Skipping benchmark item with empty query");
                    None
                }
            })
            .collect();

        Self { items }
    }

    /// Loads a JSON array of `{query, relevant_docs}` records.
    pub fn from_path(path: &Path) -> Result<Self, QuerySourceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| QuerySourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let items: Vec<BenchmarkItem> =
            serde_json::from_str(&raw).map_err(|source| QuerySourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let source = Self::from_items(items);
        info!(
            path = %path.display(),
            items = source.items.len(),
            "Loaded benchmark dataset"
        );
        Ok(source)
    }

    /// Like [`from_path`](Self::from_path) but logs failures and returns an empty source,
    /// so every round is skipped instead of the process exiting.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::from_path(path).unwrap_or_else(|e| {
            warn!(error = %e, "Benchmark dataset unavailable, rounds will be skipped");
            Self::default()
        })
    }

    pub fn next_query_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<RoundQuery, QuerySourceError> {
        let (query, relevant) = self
            .items
            .choose(rng)
            .ok_or(QuerySourceError::EmptyBenchmark)?;

        debug!(query = %query, relevant = relevant.len(), "Selected benchmark query");

        Ok(RoundQuery {
            query: query.clone(),
            relevant: Some(relevant.clone()),
        })
    }
}

impl QuerySource for BenchmarkQuerySource {
    fn next_query(&self) -> Result<RoundQuery, QuerySourceError> {
        self.next_query_with(&mut rand::thread_rng())
    }

    fn provides_ground_truth(&self) -> bool {
        true
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
