use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use super::{DispatchError, MinerEndpoint};
use crate::protocol::{DocumentReply, MinerResponse, ProtocolMode, QueryReply, QueryRequest};

#[async_trait]
/// Sends one query to one miner.
pub trait DispatchClient: Send + Sync {
    /// Returns the miner's parsed reply. Any error counts as a failed response.
    async fn query(
        &self,
        miner: &MinerEndpoint,
        request: &QueryRequest,
        mode: ProtocolMode,
    ) -> Result<MinerResponse, DispatchError>;
}

/// JSON over HTTP to the miner gateway.
#[derive(Debug, Clone)]
pub struct HttpDispatchClient {
    http: HttpClient,
}

impl HttpDispatchClient {
    /// `timeout` bounds each request end to end.
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl DispatchClient for HttpDispatchClient {
    async fn query(
        &self,
        miner: &MinerEndpoint,
        request: &QueryRequest,
        mode: ProtocolMode,
    ) -> Result<MinerResponse, DispatchError> {
        let uid = miner.uid;
        let url = miner.url(mode.path());

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| DispatchError::Transport { uid, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status {
                uid,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DispatchError::Transport { uid, source })?;
        debug!(%uid, %url, bytes = bytes.len(), "Miner replied");

        let malformed = |e: serde_json::Error| DispatchError::MalformedReply {
            uid,
            reason: e.to_string(),
        };

        Ok(match mode {
            ProtocolMode::IdsOnly => {
                let reply: QueryReply = serde_json::from_slice(&bytes).map_err(malformed)?;
                MinerResponse::from_reply(uid, reply)
            }
            ProtocolMode::WithDocuments => {
                let reply: DocumentReply = serde_json::from_slice(&bytes).map_err(malformed)?;
                MinerResponse::from_document_reply(uid, reply)
            }
        })
    }
}

/// How a scripted miner answers.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    Reply {
        document_ids: Vec<String>,
        documents: Vec<String>,
        delay: Duration,
    },
    /// Answers with HTTP 500.
    Fail,
    /// Never answers.
    Hang,
}

#[cfg(any(test, feature = "mock"))]
impl MockBehaviour {
    pub fn ids(ids: &[&str]) -> Self {
        MockBehaviour::Reply {
            document_ids: ids.iter().map(|s| s.to_string()).collect(),
            documents: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// `(id, text)` pairs, served as ids plus documents.
    pub fn documents(pairs: &[(&str, &str)]) -> Self {
        MockBehaviour::Reply {
            document_ids: pairs.iter().map(|(id, _)| id.to_string()).collect(),
            documents: pairs.iter().map(|(_, text)| text.to_string()).collect(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(self, by: Duration) -> Self {
        match self {
            MockBehaviour::Reply {
                document_ids,
                documents,
                ..
            } => MockBehaviour::Reply {
                document_ids,
                documents,
                delay: by,
            },
            other => other,
        }
    }
}

/// In-process dispatch client with a fixed behaviour per miner uid.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct ScriptedDispatchClient {
    behaviours: std::collections::HashMap<crate::protocol::MinerUid, MockBehaviour>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "mock"))]
impl ScriptedDispatchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uid: u16, behaviour: MockBehaviour) -> Self {
        self.behaviours
            .insert(crate::protocol::MinerUid(uid), behaviour);
        self
    }

    /// Number of queries sent so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl DispatchClient for ScriptedDispatchClient {
    async fn query(
        &self,
        miner: &MinerEndpoint,
        _request: &QueryRequest,
        mode: ProtocolMode,
    ) -> Result<MinerResponse, DispatchError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let uid = miner.uid;

        match self.behaviours.get(&uid).cloned() {
            Some(MockBehaviour::Reply {
                document_ids,
                documents,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(match mode {
                    ProtocolMode::IdsOnly => {
                        MinerResponse::from_reply(uid, QueryReply::new(document_ids))
                    }
                    ProtocolMode::WithDocuments => MinerResponse::from_document_reply(
                        uid,
                        DocumentReply::new(document_ids, documents),
                    ),
                })
            }
            Some(MockBehaviour::Fail) => Err(DispatchError::Status { uid, status: 500 }),
            Some(MockBehaviour::Hang) => std::future::pending().await,
            None => Err(DispatchError::Status { uid, status: 404 }),
        }
    }
}
