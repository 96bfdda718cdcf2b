//! CERS miner entrypoint: indexes documents and answers validator queries over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;

use cers::config::MinerConfig;
use cers::embedding::{EncoderConfig, SentenceEncoder};
use cers::gateway::{MinerState, create_router_with_state};
use cers::miner::{DocumentStore, SeedOutcome, seed_from_file};
use cers::shutdown::shutdown_signal;
use cers::vectordb::{InMemoryVectorDb, QdrantIndex, VectorIndex};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = MinerConfig::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        search_k = config.search_k,
        serve_documents = config.serve_documents,
        "CERS miner starting"
    );

    let encoder_config = if let Some(path) = &config.encoder_path {
        EncoderConfig::new(path.clone())
    } else {
        tracing::warn!("No CERS_ENCODER_PATH configured, running encoder in stub mode");
        EncoderConfig::stub()
    };
    let encoder = Arc::new(SentenceEncoder::load(encoder_config)?);

    match &config.qdrant_url {
        Some(url) => {
            let index = QdrantIndex::connect(url).await?;
            tracing::info!(url = %url, "Using Qdrant index");
            serve(config, encoder, index, addr).await
        }
        None => {
            tracing::warn!("No CERS_QDRANT_URL configured, using in-memory index");
            serve(config, encoder, InMemoryVectorDb::new(), addr).await
        }
    }
}

async fn serve<V>(
    config: MinerConfig,
    encoder: Arc<SentenceEncoder>,
    index: V,
    addr: SocketAddr,
) -> anyhow::Result<()>
where
    V: VectorIndex + 'static,
{
    let store = Arc::new(DocumentStore::new(
        encoder,
        index,
        config.collection_name.clone(),
        config.serve_documents,
    ));
    store.ensure_collection().await?;

    match seed_from_file(&store, &config.documents_path, config.upsert_batch_size).await? {
        SeedOutcome::AlreadySeeded { existing } => {
            tracing::info!(existing, "Index already populated, skipping seed")
        }
        SeedOutcome::MissingFile => tracing::warn!(
            path = %config.documents_path.display(),
            "Seed file not found, starting with an empty index"
        ),
        SeedOutcome::Loaded {
            documents,
            skipped_lines,
        } => tracing::info!(documents, skipped_lines, "Index seeded"),
    }

    let state = MinerState::new(
        store,
        config.api_key.as_deref(),
        config.serve_documents,
        config.search_k,
    );
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Miner listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Miner shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("CERS_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cers::constants::DEFAULT_MINER_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}
