//! Long-term memory store ports
//!
//! One capability interface per tier. The application depends only on these
//! traits; concrete backends live in the infrastructure layer.

use async_trait::async_trait;
use brain_domain::{
    Document, Entity, GraphMatch, GraphPattern, MemoryTier, Relationship, SemanticHit,
};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Errors surfaced by the memory layer, tagged with the tier that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("{tier} memory unavailable: {reason}")]
    Unavailable { tier: MemoryTier, reason: String },

    #[error("{tier} memory rejected request: {reason}")]
    Rejected { tier: MemoryTier, reason: String },
}

impl MemoryError {
    pub fn tier(&self) -> MemoryTier {
        match self {
            MemoryError::Unavailable { tier, .. } | MemoryError::Rejected { tier, .. } => *tier,
        }
    }

    /// An unavailable backend may come back; a rejected request will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, MemoryError::Unavailable { .. })
    }

    pub fn from_store(tier: MemoryTier, error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(reason) => MemoryError::Unavailable { tier, reason },
            StoreError::Rejected(reason) => MemoryError::Rejected { tier, reason },
        }
    }
}

/// Keyed values with a time-to-live
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Returns whether a live value was removed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Similarity search over indexed documents
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index a document, returning its id
    async fn index(&self, document: Document) -> Result<String, StoreError>;

    /// Best `k` hits, highest score first; ties keep insertion order
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SemanticHit>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;
}

/// Entities, relationships and pattern queries
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn add_entity(&self, entity: Entity) -> Result<(), StoreError>;

    /// Both endpoints must already exist
    async fn add_relationship(&self, relationship: Relationship) -> Result<(), StoreError>;

    async fn query(&self, pattern: &GraphPattern) -> Result<Vec<GraphMatch>, StoreError>;

    /// Shortest edge path from `from` to `to` within `max_hops`
    async fn find_path(
        &self,
        from: &str,
        to: &str,
        max_hops: usize,
    ) -> Result<Option<Vec<Relationship>>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_error_from_store() {
        let err = MemoryError::from_store(
            MemoryTier::Semantic,
            StoreError::Unavailable("connection refused".into()),
        );
        assert_eq!(err.tier(), MemoryTier::Semantic);
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "semantic memory unavailable: connection refused"
        );

        let err = MemoryError::from_store(MemoryTier::Relational, StoreError::Rejected("x".into()));
        assert!(!err.is_transient());
    }
}
