use thiserror::Error;

use crate::query::QuerySourceError;

#[derive(Debug, Error)]
pub enum RoundError {
    /// The query source could not supply a query; the round is skipped.
    #[error("no query available: {0}")]
    NoQuery(#[from] QuerySourceError),

    #[error("no miners to query")]
    NoMiners,

    #[error("strategy '{strategy}' needs ground truth but the query source has none")]
    IncompatibleQuerySource { strategy: &'static str },
}
