use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{PointStruct, ScoredPoint, Value};

// Payload keys stored next to each vector.
const PAYLOAD_DOC_ID: &str = "doc_id";
const PAYLOAD_DOCUMENT: &str = "document";
const PAYLOAD_INDEXED_AT: &str = "indexed_at";

/// An embedded document ready for indexing.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    /// Caller-facing document identifier.
    pub doc_id: String,
    /// Stored only when the miner serves document text.
    pub document: Option<String>,
    /// Unix seconds.
    pub indexed_at: i64,
}

impl VectorPoint {
    pub fn new(id: u64, vector: Vec<f32>, doc_id: impl Into<String>) -> Self {
        Self {
            id,
            vector,
            doc_id: doc_id.into(),
            document: None,
            indexed_at: 0,
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_indexed_at(mut self, indexed_at: i64) -> Self {
        self.indexed_at = indexed_at;
        self
    }

    /// Qdrant form; the text is only written when present.
    pub(crate) fn into_point_struct(self) -> PointStruct {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(PAYLOAD_DOC_ID.to_string(), self.doc_id.into());
        payload.insert(PAYLOAD_INDEXED_AT.to_string(), self.indexed_at.into());
        if let Some(document) = self.document {
            payload.insert(PAYLOAD_DOCUMENT.to_string(), document.into());
        }

        PointStruct::new(self.id, self.vector, payload)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    pub doc_id: String,
    pub document: Option<String>,
    pub indexed_at: i64,
}

impl SearchResult {
    /// `None` for points without a numeric id or a `doc_id` payload.
    pub(crate) fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let Some(PointIdOptions::Num(id)) = point.id.and_then(|pid| pid.point_id_options) else {
            return None;
        };

        let text = |key: &str| {
            point
                .payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        Some(SearchResult {
            id,
            score: point.score,
            doc_id: text(PAYLOAD_DOC_ID)?,
            document: text(PAYLOAD_DOCUMENT),
            indexed_at: point
                .payload
                .get(PAYLOAD_INDEXED_AT)
                .and_then(|v| v.as_integer())
                .unwrap_or(0),
        })
    }
}
