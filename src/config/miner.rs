use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use super::{
    ConfigError, parse_bind_addr_from_env, parse_bool_from_env, parse_from_env,
    parse_optional_path_from_env, parse_path_from_env, parse_port_from_env, require_dir,
    require_positive,
};
use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_DOCUMENTS_PATH, DEFAULT_MINER_PORT, DEFAULT_SEARCH_K,
    DEFAULT_UPSERT_BATCH_SIZE,
};

/// Miner configuration loaded from environment variables.
#[derive(Clone)]
pub struct MinerConfig {
    /// HTTP server port. Default: `8001`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Key for the document management routes. Management is refused when unset.
    pub api_key: Option<String>,

    /// Ids returned per query. Default: `2`.
    pub search_k: usize,

    /// Qdrant endpoint. An in-memory index is used when unset.
    pub qdrant_url: Option<String>,

    pub collection_name: String,

    /// JSON-lines `{id, document}` seed file.
    pub documents_path: PathBuf,

    pub upsert_batch_size: usize,

    /// Sentence encoder model directory; the hashed stub is used when unset.
    pub encoder_path: Option<PathBuf>,

    /// Serve `/query/documents` and keep document text in the index.
    pub serve_documents: bool,
}

impl fmt::Debug for MinerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinerConfig")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("search_k", &self.search_k)
            .field("qdrant_url", &self.qdrant_url)
            .field("collection_name", &self.collection_name)
            .field("documents_path", &self.documents_path)
            .field("upsert_batch_size", &self.upsert_batch_size)
            .field("encoder_path", &self.encoder_path)
            .field("serve_documents", &self.serve_documents)
            .finish()
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_MINER_PORT,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            api_key: None,
            search_k: DEFAULT_SEARCH_K,
            qdrant_url: None,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            documents_path: PathBuf::from(DEFAULT_DOCUMENTS_PATH),
            upsert_batch_size: DEFAULT_UPSERT_BATCH_SIZE,
            encoder_path: None,
            serve_documents: false,
        }
    }
}

impl MinerConfig {
    const ENV_PORT: &'static str = "CERS_PORT";
    const ENV_BIND_ADDR: &'static str = "CERS_BIND_ADDR";
    const ENV_API_KEY: &'static str = "CERS_MINER_API_KEY";
    const ENV_SEARCH_K: &'static str = "CERS_SEARCH_K";
    const ENV_QDRANT_URL: &'static str = "CERS_QDRANT_URL";
    const ENV_COLLECTION_NAME: &'static str = "CERS_COLLECTION_NAME";
    const ENV_DOCUMENTS_PATH: &'static str = "CERS_DOCUMENTS_PATH";
    const ENV_UPSERT_BATCH_SIZE: &'static str = "CERS_UPSERT_BATCH_SIZE";
    const ENV_ENCODER_PATH: &'static str = "CERS_ENCODER_PATH";
    const ENV_SERVE_DOCUMENTS: &'static str = "CERS_SERVE_DOCUMENTS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_port_from_env(Self::ENV_PORT, defaults.port)?;
        let bind_addr = parse_bind_addr_from_env(Self::ENV_BIND_ADDR, defaults.bind_addr)?;
        let api_key = super::non_empty_var(Self::ENV_API_KEY);
        let search_k = parse_from_env(Self::ENV_SEARCH_K, defaults.search_k)?;
        let qdrant_url = super::non_empty_var(Self::ENV_QDRANT_URL);
        let collection_name = parse_from_env(Self::ENV_COLLECTION_NAME, defaults.collection_name)?;
        let documents_path = parse_path_from_env(Self::ENV_DOCUMENTS_PATH, defaults.documents_path);
        let upsert_batch_size =
            parse_from_env(Self::ENV_UPSERT_BATCH_SIZE, defaults.upsert_batch_size)?;
        let encoder_path = parse_optional_path_from_env(Self::ENV_ENCODER_PATH);
        let serve_documents = parse_bool_from_env(Self::ENV_SERVE_DOCUMENTS, defaults.serve_documents)?;

        Ok(Self {
            port,
            bind_addr,
            api_key,
            search_k,
            qdrant_url,
            collection_name,
            documents_path,
            upsert_batch_size,
            encoder_path,
            serve_documents,
        })
    }

    /// Validates invariants and model paths (does not touch the seed file).
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(Self::ENV_SEARCH_K, self.search_k)?;
        require_positive(Self::ENV_UPSERT_BATCH_SIZE, self.upsert_batch_size)?;

        if self.collection_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_COLLECTION_NAME,
                value: self.collection_name.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        if let Some(ref path) = self.encoder_path {
            require_dir(path)?;
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
