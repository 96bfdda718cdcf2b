use std::sync::Arc;

use tracing::{debug, instrument};

use super::{Document, MinerError};
use crate::embedding::SentenceEncoder;
use crate::hashing::hash_document_id;
use crate::vectordb::{VectorIndex, VectorPoint};

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    pub id: String,
    pub score: f32,
    /// Present only when the store keeps document text.
    pub text: Option<String>,
}

/// Embeds documents and queries and keeps them in a vector index.
pub struct DocumentStore<V: VectorIndex> {
    encoder: Arc<SentenceEncoder>,
    index: V,
    collection: String,
    store_text: bool,
}

impl<V: VectorIndex> std::fmt::Debug for DocumentStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("encoder", &self.encoder)
            .field("collection", &self.collection)
            .field("store_text", &self.store_text)
            .finish_non_exhaustive()
    }
}

impl<V: VectorIndex> DocumentStore<V> {
    /// `store_text` keeps document text in the index so it can be served back.
    pub fn new(
        encoder: Arc<SentenceEncoder>,
        index: V,
        collection: impl Into<String>,
        store_text: bool,
    ) -> Self {
        Self {
            encoder,
            index,
            collection: collection.into(),
            store_text,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn stores_text(&self) -> bool {
        self.store_text
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    /// Creates the collection sized to the encoder if it does not exist.
    pub async fn ensure_collection(&self) -> Result<(), MinerError> {
        self.index
            .ensure_collection(&self.collection, self.encoder.embedding_dim())
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, MinerError> {
        Ok(self.index.count(&self.collection).await?)
    }

    /// Inserts or replaces a document. Returns its point id.
    pub async fn upsert(&self, document: Document) -> Result<u64, MinerError> {
        let id = hash_document_id(&document.id);
        self.upsert_batch(vec![document]).await?;
        Ok(id)
    }

    /// Inserts or replaces documents in one index write. Returns the number written.
    #[instrument(skip(self, documents), fields(collection = %self.collection, count = documents.len()))]
    pub async fn upsert_batch(&self, documents: Vec<Document>) -> Result<usize, MinerError> {
        if documents.is_empty() {
            return Ok(0);
        }
        for document in &documents {
            document.check()?;
        }

        let texts: Vec<String> = documents.iter().map(|d| d.document.clone()).collect();
        let vectors = self.embed(texts).await?;
        let indexed_at = chrono::Utc::now().timestamp();

        let points: Vec<VectorPoint> = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| {
                let point = VectorPoint::new(hash_document_id(&document.id), vector, document.id)
                    .with_indexed_at(indexed_at);
                if self.store_text {
                    point.with_document(document.document)
                } else {
                    point
                }
            })
            .collect();

        let written = points.len();
        self.index
            .upsert(&self.collection, points)
            .await?;

        debug!(written, "Documents indexed");
        Ok(written)
    }

    /// Removes a document. Unknown ids are a no-op.
    pub async fn delete(&self, doc_id: &str) -> Result<(), MinerError> {
        self.index
            .remove(&self.collection, vec![hash_document_id(doc_id)])
            .await?;
        Ok(())
    }

    /// At most `min(k, indexed)` hits, best first. An empty index yields no hits.
    #[instrument(skip(self, query), fields(collection = %self.collection, query_len = query.len()))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, MinerError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self.embed(vec![query.to_string()]).await?;
        let Some(vector) = vectors.pop() else {
            return Ok(Vec::new());
        };

        let hits = self.index.nearest(&self.collection, vector, k).await?;
        debug!(hits = hits.len(), k, "Search complete");

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedDocument {
                id: hit.doc_id,
                score: hit.score,
                text: hit.document,
            })
            .collect())
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, MinerError> {
        let encoder = Arc::clone(&self.encoder);
        let vectors = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            encoder.embed_batch(&refs)
        })
        .await
        .map_err(|e| MinerError::BlockingTask {
            reason: e.to_string(),
        })??;

        Ok(vectors)
    }
}
