//! Word-level helpers behind the stub encoder and stub reranker.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "about", "then", "here",
    "there", "when", "where", "why", "how", "all", "each", "more", "most", "other", "some",
    "such", "no", "not", "only", "so", "than", "too", "very", "just", "and", "but", "if", "or",
    "what", "which", "who", "whom", "this", "that", "these", "those", "am", "it", "its", "i",
    "me", "my", "you", "your", "we", "our",
];

/// Lowercased alphanumeric words of `text`, stop words removed.
pub fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Query-coverage/Jaccard blend squashed through a logistic curve into `(0, 1)`.
pub fn overlap_score(query: &str, candidate: &str) -> f32 {
    let query_words = content_words(query);
    let candidate_words = content_words(candidate);

    if query_words.is_empty() {
        return 0.0;
    }

    let matches = query_words.intersection(&candidate_words).count() as f32;
    let recall = matches / query_words.len() as f32;
    let union = query_words.union(&candidate_words).count() as f32;
    let jaccard = if union > 0.0 { matches / union } else { 0.0 };

    let base = 0.6 * recall + 0.4 * jaccard;
    1.0 / (1.0 + (-8.0 * (base - 0.5)).exp())
}
