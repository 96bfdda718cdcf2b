use std::sync::Arc;

use tracing::error;

use crate::hashing::hash_api_key;
use crate::miner::DocumentStore;
use crate::vectordb::VectorIndex;

pub struct MinerState<V: VectorIndex + 'static> {
    pub store: Arc<DocumentStore<V>>,

    /// Digest of the management key. `None` disables management routes.
    pub api_key: Option<blake3::Hash>,

    /// Whether `/query/documents` is served.
    pub serve_documents: bool,

    pub search_k: usize,
}

impl<V: VectorIndex + 'static> Clone for MinerState<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            api_key: self.api_key,
            serve_documents: self.serve_documents,
            search_k: self.search_k,
        }
    }
}

impl<V: VectorIndex + 'static> MinerState<V> {
    pub fn new(
        store: Arc<DocumentStore<V>>,
        api_key: Option<&str>,
        serve_documents: bool,
        search_k: usize,
    ) -> Self {
        let api_key = api_key.map(hash_api_key);
        if api_key.is_none() {
            error!("No miner API key configured, document management requests will be rejected");
        }

        Self {
            store,
            api_key,
            serve_documents,
            search_k,
        }
    }
}
