//! Shared utility functions.

use std::collections::BTreeSet;

/// Words too common to count as evidence that two texts talk about the same thing.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "are", "was", "were", "will",
    "have", "has", "not", "but", "you", "your", "our", "its", "can", "all", "any", "per",
];

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Lower-cased alphanumeric terms of at least three characters, minus stopwords.
///
/// Used by the grounding judge and the in-process vector store to compare
/// texts without an embedding model.
pub fn significant_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard similarity of the significant terms of two texts (0.0 to 1.0).
pub fn term_similarity(a: &str, b: &str) -> f64 {
    let left = significant_terms(a);
    let right = significant_terms(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}
