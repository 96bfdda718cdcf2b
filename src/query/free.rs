use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use super::error::QuerySourceError;
use super::{QuerySource, RoundQuery};
use crate::constants::DEFAULT_QUERIES;
use crate::protocol::Query;

/// Bare queries without ground truth.
#[derive(Debug, Clone)]
pub struct FreeQuerySource {
    queries: Vec<Query>,
}

impl FreeQuerySource {
    /// Fails with [`QuerySourceError::NoQueries`] if nothing usable is given.
    pub fn from_queries<I, S>(queries: I) -> Result<Self, QuerySourceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queries: Vec<Query> = queries
            .into_iter()
            .filter_map(|q| Query::new(q.into().trim().to_string()).ok())
            .collect();

        if queries.is_empty() {
            return Err(QuerySourceError::NoQueries);
        }

        Ok(Self { queries })
    }

    /// Reads a newline-delimited file, one query per line; blank lines are ignored.
    pub fn from_path(path: &Path) -> Result<Self, QuerySourceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| QuerySourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Self::from_queries(raw.lines())?;
        info!(
            path = %path.display(),
            queries = source.queries.len(),
            "Loaded queries"
        );
        Ok(source)
    }

    /// The built-in query list.
    pub fn builtin() -> Self {
        Self {
            queries: DEFAULT_QUERIES
                .iter()
                .filter_map(|q| Query::new(*q).ok())
                .collect(),
        }
    }

    /// Reads `path`, falling back to [`builtin`](Self::builtin) when it is missing or empty.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Query file unusable, using default queries"
                );
                Self::builtin()
            }
        }
    }

    pub fn next_query_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<RoundQuery, QuerySourceError> {
        let query = self.queries.choose(rng).ok_or(QuerySourceError::NoQueries)?;

        debug!(query = %query, "Selected free query");

        Ok(RoundQuery {
            query: query.clone(),
            relevant: None,
        })
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }
}

impl QuerySource for FreeQuerySource {
    fn next_query(&self) -> Result<RoundQuery, QuerySourceError> {
        self.next_query_with(&mut rand::thread_rng())
    }

    fn provides_ground_truth(&self) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.queries.len()
    }
}
