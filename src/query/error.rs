use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuerySourceError {
    #[error("benchmark dataset is empty")]
    EmptyBenchmark,

    #[error("no queries available and no fallback list")]
    NoQueries,

    #[error("failed to read query data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse benchmark dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
