//! Semantic memory value types.

use crate::util::term_similarity;
use serde::{Deserialize, Serialize};

/// A document to index in semantic memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
    pub id: String,
    pub score: f64,
}

/// Rank `(id, content)` pairs, given in insertion order, against `query`.
///
/// Scores descend; equal scores keep insertion order (earlier wins).
/// Documents with no overlap at all are dropped. At most `k` hits are returned.
pub fn rank_by_similarity<'a, I>(query: &str, documents: I, k: usize) -> Vec<SemanticHit>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut hits: Vec<SemanticHit> = documents
        .into_iter()
        .filter_map(|(id, content)| {
            let score = term_similarity(query, content);
            (score > 0.0).then(|| SemanticHit {
                id: id.to_string(),
                score,
            })
        })
        .collect();
    // Stable sort preserves insertion order among ties.
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending() {
        let docs = vec![
            ("d1", "cooking pasta recipes"),
            ("d2", "vector database index search"),
            ("d3", "vector search"),
        ];
        let hits = rank_by_similarity("vector search", docs, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "d3");
        assert_eq!(hits[1].id, "d2");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let docs = vec![
            ("late", "vector search"),
            ("early", "vector search"),
        ];
        let hits = rank_by_similarity("vector search", docs, 10);
        assert_eq!(hits[0].id, "late");
        assert_eq!(hits[1].id, "early");
        assert_eq!(hits[0].score, hits[1].score);
    }

    #[test]
    fn test_k_limits_results() {
        let docs = vec![("a", "rust tokio"), ("b", "rust serde"), ("c", "rust clap")];
        assert_eq!(rank_by_similarity("rust", docs, 2).len(), 2);
    }
}
