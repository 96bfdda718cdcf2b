use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DispatchError;
use crate::protocol::MinerUid;

/// A reachable miner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerEndpoint {
    pub uid: MinerUid,
    #[serde(default)]
    pub hotkey: String,
    /// Base URL, e.g. `http://10.0.0.5:8001`. A bare `host:port` is treated as http.
    pub address: String,
}

impl MinerEndpoint {
    pub fn new(uid: u16, address: impl Into<String>) -> Self {
        Self {
            uid: MinerUid(uid),
            hotkey: String::new(),
            address: address.into(),
        }
    }

    pub fn with_hotkey(mut self, hotkey: impl Into<String>) -> Self {
        self.hotkey = hotkey.into();
        self
    }

    /// Full URL for `path` on this miner.
    pub fn url(&self, path: &str) -> String {
        let base = self.address.trim_end_matches('/');
        if base.contains("://") {
            format!("{base}{path}")
        } else {
            format!("http://{base}{path}")
        }
    }
}

/// The static set of miners a validator can sample from.
#[derive(Debug, Clone, Default)]
pub struct MinerRegistry {
    miners: Vec<MinerEndpoint>,
}

impl MinerRegistry {
    /// Keeps the first endpoint for each uid.
    pub fn new(miners: impl IntoIterator<Item = MinerEndpoint>) -> Self {
        let mut seen = HashSet::new();
        let miners = miners
            .into_iter()
            .filter(|miner| {
                let fresh = seen.insert(miner.uid);
                if !fresh {
                    warn!(uid = %miner.uid, address = %miner.address, "Duplicate miner uid, ignoring");
                }
                fresh
            })
            .collect();

        Self { miners }
    }

    /// Reads a JSON array of [`MinerEndpoint`].
    pub fn from_path(path: &Path) -> Result<Self, DispatchError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DispatchError::RegistryIo {
            path: path.to_path_buf(),
            source,
        })?;
        let miners: Vec<MinerEndpoint> =
            serde_json::from_str(&raw).map_err(|source| DispatchError::RegistryParse {
                path: path.to_path_buf(),
                source,
            })?;

        let registry = Self::new(miners);
        info!(path = %path.display(), miners = registry.len(), "Loaded miner registry");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.miners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.miners.is_empty()
    }

    pub fn miners(&self) -> &[MinerEndpoint] {
        &self.miners
    }

    /// Uniform random subset of `min(k, len)` distinct miners. The returned order is the
    /// round's dispatch order.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<MinerEndpoint> {
        self.miners.choose_multiple(rng, k).cloned().collect()
    }
}
