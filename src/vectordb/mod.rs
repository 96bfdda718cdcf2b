//! Vector index backing the miner's document store.
//!
//! [`QdrantIndex`] talks to a Qdrant server; [`InMemoryVectorDb`] keeps everything in
//! process for local runs and tests. Both implement [`VectorIndex`].

pub mod error;
pub mod memory;
pub mod model;
pub mod qdrant;

#[cfg(test)]
mod tests;

pub use error::IndexError;
pub use memory::{InMemoryVectorDb, cosine_similarity};
pub use model::{SearchResult, VectorPoint};
pub use qdrant::QdrantIndex;

use std::future::Future;

/// Storage the document store is written against.
///
/// Writes return once the points are searchable.
pub trait VectorIndex: Send + Sync {
    /// Creates a cosine collection of `dim`-sized vectors unless it already exists.
    fn ensure_collection(
        &self,
        collection: &str,
        dim: usize,
    ) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Inserts or replaces points by id.
    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// The `k` points closest to `vector`, most similar first.
    ///
    /// Never more than the collection holds; `k == 0` yields nothing.
    fn nearest(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, IndexError>> + Send;

    fn count(&self, collection: &str) -> impl Future<Output = Result<u64, IndexError>> + Send;

    /// Unknown ids are ignored.
    fn remove(
        &self,
        collection: &str,
        ids: Vec<u64>,
    ) -> impl Future<Output = Result<(), IndexError>> + Send;
}
