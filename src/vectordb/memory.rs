use std::collections::HashMap;

use parking_lot::RwLock;

use crate::vectordb::{IndexError, SearchResult, VectorIndex, VectorPoint};

/// Brute-force cosine index held in process memory.
#[derive(Default)]
pub struct InMemoryVectorDb {
    collections: RwLock<HashMap<String, Collection>>,
}

#[derive(Default, Clone)]
struct Collection {
    dim: usize,
    points: HashMap<u64, StoredPoint>,
}

#[derive(Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    doc_id: String,
    document: Option<String>,
    indexed_at: i64,
}

impl InMemoryVectorDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.points.len())
    }
}

impl std::fmt::Debug for InMemoryVectorDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorDb")
            .field("collections", &self.collections.read().len())
            .finish()
    }
}

impl VectorIndex for InMemoryVectorDb {
    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<(), IndexError> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_insert(Collection {
                dim,
                points: HashMap::new(),
            });

        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), IndexError> {
        let mut collections = self.collections.write();

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| IndexError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        // Reject the whole batch before touching the map.
        if let Some(bad) = points
            .iter()
            .find(|p| p.vector.len() != coll.dim)
        {
            return Err(IndexError::InvalidDimension {
                expected: coll.dim,
                actual: bad.vector.len(),
            });
        }

        for point in points {
            coll.points.insert(
                point.id,
                StoredPoint {
                    vector: point.vector,
                    doc_id: point.doc_id,
                    document: point.document,
                    indexed_at: point.indexed_at,
                },
            );
        }

        Ok(())
    }

    async fn nearest(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> Result<Vec<SearchResult>, IndexError> {
        let collections = self.collections.read();

        let coll = collections
            .get(collection)
            .ok_or_else(|| IndexError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        let mut results: Vec<SearchResult> = coll
            .points
            .iter()
            .map(|(&id, p)| SearchResult {
                id,
                score: cosine_similarity(&vector, &p.vector),
                doc_id: p.doc_id.clone(),
                document: p.document.clone(),
                indexed_at: p.indexed_at,
            })
            .collect();

        // Ties broken by id so results are stable across runs.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        results.truncate(k);
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<u64, IndexError> {
        self.point_count(collection)
            .map(|n| n as u64)
            .ok_or_else(|| IndexError::CollectionNotFound {
                collection: collection.to_string(),
            })
    }

    async fn remove(&self, collection: &str, ids: Vec<u64>) -> Result<(), IndexError> {
        let mut collections = self.collections.write();

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| IndexError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for id in ids {
            coll.points.remove(&id);
        }

        Ok(())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
