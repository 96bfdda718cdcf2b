use std::path::Path;

use tracing::{info, warn};

use super::{Document, DocumentStore, MinerError};
use crate::vectordb::VectorIndex;

/// What startup seeding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection already had documents; nothing was read.
    AlreadySeeded { existing: u64 },
    /// No seed file; the miner starts empty.
    MissingFile,
    Loaded { documents: usize, skipped_lines: usize },
}

/// Reads a JSON-lines file of `{id, document}` records.
///
/// Blank lines are ignored. Lines that fail to parse are logged and counted, not fatal.
pub fn read_seed_file(path: &Path) -> Result<(Vec<Document>, usize), MinerError> {
    let raw = std::fs::read_to_string(path).map_err(|source| MinerError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Document>(line)
            .map_err(|e| e.to_string())
            .and_then(|doc| doc.check().map(|()| doc).map_err(|e| e.to_string()));

        match parsed {
            Ok(doc) => documents.push(doc),
            Err(reason) => {
                warn!(path = %path.display(), line = line_no + 1, %reason, "Skipping seed line");
                skipped += 1;
            }
        }
    }

    Ok((documents, skipped))
}

/// Loads the seed file into an empty collection, `batch_size` documents per write.
pub async fn seed_from_file<V: VectorIndex>(
    store: &DocumentStore<V>,
    path: &Path,
    batch_size: usize,
) -> Result<SeedOutcome, MinerError> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(existing, collection = store.collection(), "Collection already seeded");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    if !path.exists() {
        warn!(path = %path.display(), "Seed file not found, starting with an empty index");
        return Ok(SeedOutcome::MissingFile);
    }

    let (documents, skipped_lines) = read_seed_file(path)?;
    let total = documents.len();
    let mut loaded = 0usize;

    for chunk in documents.chunks(batch_size.max(1)) {
        loaded += store.upsert_batch(chunk.to_vec()).await?;
        info!(loaded, total, "Seeding documents");
    }

    info!(
        path = %path.display(),
        documents = loaded,
        skipped_lines,
        "Seeding complete"
    );

    Ok(SeedOutcome::Loaded {
        documents: loaded,
        skipped_lines,
    })
}
