//! Test miner harness: real axum miners on loopback ports, backed by stub models.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cers::embedding::SentenceEncoder;
use cers::gateway::{MinerState, create_router_with_state};
use cers::miner::{Document, DocumentStore};
use cers::vectordb::InMemoryVectorDb;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
const TEST_COLLECTION_NAME: &str = "cers_test_docs";

#[derive(Debug, Clone)]
pub struct TestMinerConfig {
    pub documents: Vec<Document>,
    pub api_key: Option<String>,
    pub serve_documents: bool,
    pub search_k: usize,
}

impl Default for TestMinerConfig {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            api_key: None,
            serve_documents: false,
            search_k: 2,
        }
    }
}

impl TestMinerConfig {
    pub fn with_documents(mut self, documents: &[(&str, &str)]) -> Self {
        self.documents = documents
            .iter()
            .map(|(id, text)| Document::new(*id, *text))
            .collect();
        self
    }

    pub fn serving_documents(mut self) -> Self {
        self.serve_documents = true;
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

pub struct TestMiner {
    pub addr: SocketAddr,
    pub store: Arc<DocumentStore<InMemoryVectorDb>>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestMiner {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestMiner {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MinerStartupError {
    #[error("Miner failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Miner startup failed: {0}")]
    StartupFailed(String),
}

/// Returns a loopback address nothing listens on.
pub async fn unused_addr() -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    listener.local_addr()
}

pub async fn wait_for_miner_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), MinerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(MinerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Spawns a miner with a stub encoder and an in-memory index seeded with
/// `config.documents`.
pub async fn spawn_test_miner(config: TestMinerConfig) -> Result<TestMiner, MinerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let encoder = SentenceEncoder::stub()
        .map_err(|e| MinerStartupError::StartupFailed(e.to_string()))?;
    let store = Arc::new(DocumentStore::new(
        Arc::new(encoder),
        InMemoryVectorDb::new(),
        TEST_COLLECTION_NAME,
        config.serve_documents,
    ));
    store
        .ensure_collection()
        .await
        .map_err(|e| MinerStartupError::StartupFailed(e.to_string()))?;
    if !config.documents.is_empty() {
        store
            .upsert_batch(config.documents.clone())
            .await
            .map_err(|e| MinerStartupError::StartupFailed(e.to_string()))?;
    }

    let state = MinerState::new(
        Arc::clone(&store),
        config.api_key.as_deref(),
        config.serve_documents,
        config.search_k,
    );
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_miner_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestMiner {
        addr: local_addr,
        store,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
