//! BLAKE3 helpers for index point ids and API-key checks.
//!
//! Point ids are derived from document ids so that re-upserting a document lands on the
//! same point. API keys are compared as digests: `blake3::Hash` equality is constant-time.

/// Converts the first 8 bytes of a hash into a little-endian `u64`.
#[inline]
pub fn hash_to_u64(hash: &[u8; 32]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Stable index point id for a document id.
pub fn hash_document_id(doc_id: &str) -> u64 {
    hash_to_u64(blake3::hash(doc_id.as_bytes()).as_bytes())
}

/// Digest stored in place of the raw API key.
pub fn hash_api_key(key: &str) -> blake3::Hash {
    blake3::hash(key.as_bytes())
}

/// Constant-time check of a presented key against the stored digest.
pub fn api_key_matches(expected: &blake3::Hash, presented: &str) -> bool {
    *expected == blake3::hash(presented.as_bytes())
}
