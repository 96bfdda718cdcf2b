//! Validator ↔ miner wire contract.
//!
//! A request carries one field, `query`. The ids-only reply ([`QueryReply`]) has no field
//! that could hold document text, so a miner answering in that mode cannot leak content
//! through this type. The cross-encoder deployment uses [`DocumentReply`], which adds the
//! text for each returned id.
//!
//! There are no error codes here. A miner that does not answer, answers late, or answers
//! with garbage becomes a [`MinerResponse`] with `success == false`.

mod error;


pub use error::ProtocolError;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Miner identity within the registry (subnet uid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerUid(pub u16);

impl fmt::Display for MinerUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-empty query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Rejects empty and whitespace-only input.
    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ProtocolError::EmptyQuery);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ground-truth document ids for a benchmark query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceSet(HashSet<String>);

impl RelevanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.0.contains(doc_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RelevanceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Which reply variant a round asks miners for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolMode {
    /// Ranked ids only ([`QueryReply`]).
    IdsOnly,
    /// Ranked ids plus their text ([`DocumentReply`]).
    WithDocuments,
}

impl ProtocolMode {
    /// Miner route serving this variant.
    pub fn path(&self) -> &'static str {
        match self {
            ProtocolMode::IdsOnly => "/query",
            ProtocolMode::WithDocuments => "/query/documents",
        }
    }
}

/// Request sent to every selected miner in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: &Query) -> Self {
        Self {
            query: query.as_str().to_string(),
        }
    }
}

/// Ids-only reply. Order is the miner's ranking, rank 0 first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub document_ids: Vec<String>,
}

impl QueryReply {
    pub fn new(document_ids: Vec<String>) -> Self {
        Self { document_ids }
    }
}

/// Reply for the cross-encoder variant: `documents[i]` is the text of `document_ids[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub document_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documents: Vec<String>,
}

impl DocumentReply {
    pub fn new(document_ids: Vec<String>, documents: Vec<String>) -> Self {
        Self {
            document_ids,
            documents,
        }
    }

    /// `true` when every id has exactly one text.
    pub fn is_consistent(&self) -> bool {
        self.document_ids.len() == self.documents.len()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One miner's answer for a round, as seen by the reward engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MinerResponse {
    pub uid: MinerUid,
    pub document_ids: Vec<String>,
    /// Empty unless the round used [`ProtocolMode::WithDocuments`].
    pub documents: Vec<String>,
    pub success: bool,
}

impl MinerResponse {
    /// Timeout, transport failure or malformed reply.
    pub fn failed(uid: MinerUid) -> Self {
        Self {
            uid,
            document_ids: Vec::new(),
            documents: Vec::new(),
            success: false,
        }
    }

    pub fn from_reply(uid: MinerUid, reply: QueryReply) -> Self {
        Self {
            uid,
            document_ids: reply.document_ids,
            documents: Vec::new(),
            success: true,
        }
    }

    /// An inconsistent reply keeps its ids but carries no documents.
    pub fn from_document_reply(uid: MinerUid, reply: DocumentReply) -> Self {
        let documents = if reply.is_consistent() {
            reply.documents
        } else {
            tracing::warn!(
                uid = %uid,
                ids = reply.document_ids.len(),
                documents = reply.documents.len(),
                "Inconsistent document reply, treating as no documents"
            );
            Vec::new()
        };

        Self {
            uid,
            document_ids: reply.document_ids,
            documents,
            success: true,
        }
    }

    /// Returns `true` if the miner answered and returned at least one id.
    pub fn has_results(&self) -> bool {
        self.success && !self.document_ids.is_empty()
    }
}
