//! Miner-side retrieval: an embedded document index queried by the gateway.

mod error;
mod seed;
mod store;

#[cfg(test)]
mod tests;

pub use error::MinerError;
pub use seed::{SeedOutcome, read_seed_file, seed_from_file};
pub use store::{DocumentStore, RetrievedDocument};

use serde::{Deserialize, Serialize};

/// A document as submitted for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub document: String,
}

impl Document {
    pub fn new(id: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document: document.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), MinerError> {
        if self.id.trim().is_empty() {
            return Err(MinerError::InvalidDocument {
                reason: "document id must not be empty".to_string(),
            });
        }
        if self.document.trim().is_empty() {
            return Err(MinerError::InvalidDocument {
                reason: format!("document '{}' has no text", self.id),
            });
        }
        Ok(())
    }
}
