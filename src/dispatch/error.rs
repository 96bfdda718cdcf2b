use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::MinerUid;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("miner {uid} did not answer within {after:?}")]
    Timeout { uid: MinerUid, after: Duration },

    #[error("request to miner {uid} failed: {source}")]
    Transport {
        uid: MinerUid,
        #[source]
        source: reqwest::Error,
    },

    #[error("miner {uid} answered with HTTP {status}")]
    Status { uid: MinerUid, status: u16 },

    #[error("malformed reply from miner {uid}: {reason}")]
    MalformedReply { uid: MinerUid, reason: String },

    #[error("failed to build HTTP client: {reason}")]
    Client { reason: String },

    #[error("failed to read miner registry {path}: {source}")]
    RegistryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse miner registry {path}: {source}")]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
