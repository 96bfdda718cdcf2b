use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct,
    PointsIdsList, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Qdrant, QdrantError};
use tracing::{debug, info};

use super::VectorIndex;
use super::error::IndexError;
use super::model::{SearchResult, VectorPoint};

/// [`VectorIndex`] on a Qdrant server.
#[derive(Clone)]
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
}

impl std::fmt::Debug for QdrantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantIndex").field("url", &self.url).finish()
    }
}

impl QdrantIndex {
    /// Builds the client and fails unless the server answers a health check.
    pub async fn connect(url: &str) -> Result<Self, IndexError> {
        let unreachable = |e: QdrantError| IndexError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = Qdrant::from_url(url).build().map_err(unreachable)?;
        client.health_check().await.map_err(unreachable)?;
        info!(url, "Connected to Qdrant");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn backend<'a>(op: &'static str, collection: &'a str) -> impl FnOnce(QdrantError) -> IndexError + 'a {
    move |e| IndexError::Backend {
        op,
        collection: collection.to_string(),
        message: e.to_string(),
    }
}

impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<(), IndexError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(backend("collection lookup", collection))?;
        if exists {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(backend("create", collection))?;
        info!(collection, dim, "Created Qdrant collection");

        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), IndexError> {
        if points.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = points
            .into_iter()
            .map(VectorPoint::into_point_struct)
            .collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(backend("upsert", collection))?;

        Ok(())
    }

    async fn nearest(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> Result<Vec<SearchResult>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector, k as u64).with_payload(true),
            )
            .await
            .map_err(backend("search", collection))?;

        let returned = response.result.len();
        let results: Vec<SearchResult> = response
            .result
            .into_iter()
            .filter_map(SearchResult::from_scored_point)
            .collect();
        if results.len() < returned {
            debug!(
                collection,
                dropped = returned - results.len(),
                "Skipped points without a document id"
            );
        }

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<u64, IndexError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(backend("count", collection))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn remove(&self, collection: &str, ids: Vec<u64>) -> Result<(), IndexError> {
        if ids.is_empty() {
            return Ok(());
        }

        let selector = PointsIdsList {
            ids: ids.into_iter().map(Into::into).collect(),
        };
        self.client
            .delete_points(DeletePointsBuilder::new(collection).points(selector).wait(true))
            .await
            .map_err(backend("delete", collection))?;

        Ok(())
    }
}
