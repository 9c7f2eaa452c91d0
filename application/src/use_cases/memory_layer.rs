//! Memory layer façade
//!
//! Four independently optional tiers behind one handle:
//!
//! - working memory is owned here and never fails
//! - session, semantic and relational memory delegate to store ports, each
//!   call bounded by the configured backend timeout
//!
//! A missing, failing or slow backend surfaces as
//! [`MemoryError::Unavailable`] for that tier only.

use crate::config::MemorySettings;
use crate::ports::memory_store::{GraphStore, MemoryError, SessionStore, StoreError, VectorStore};
use crate::use_cases::shared::{bounded, lock};
use brain_domain::{
    Document, Entity, GraphMatch, GraphPattern, MemoryEntry, MemoryTier, Relationship,
    SemanticHit, WorkingMemory,
};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Point-in-time view of the memory layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryStatus {
    pub working_len: usize,
    pub working_budget: usize,
    pub working_full: bool,
    pub session_enabled: bool,
    pub semantic_enabled: bool,
    pub relational_enabled: bool,
}

pub struct MemoryLayer {
    working: Mutex<WorkingMemory>,
    session: Option<Arc<dyn SessionStore>>,
    semantic: Option<Arc<dyn VectorStore>>,
    relational: Option<Arc<dyn GraphStore>>,
    backend_timeout: Duration,
    session_ttl: Duration,
}

impl MemoryLayer {
    /// Working memory only. Attach long-term tiers with the `with_*` builders.
    pub fn new(settings: &MemorySettings) -> Self {
        Self {
            working: Mutex::new(WorkingMemory::new(settings.working_budget)),
            session: None,
            semantic: None,
            relational: None,
            backend_timeout: settings.backend_timeout,
            session_ttl: settings.session_ttl,
        }
    }

    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.semantic = Some(store);
        self
    }

    pub fn with_graph_store(mut self, store: Arc<dyn GraphStore>) -> Self {
        self.relational = Some(store);
        self
    }

    // ==================== Working memory ====================

    /// Append to working memory, returning the evicted entry if at budget.
    pub fn append(&self, entry: MemoryEntry) -> Option<MemoryEntry> {
        let evicted = lock(&self.working).append(entry);
        if let Some(old) = &evicted {
            debug!("Working memory at budget, evicted {} entry", old.kind);
        }
        evicted
    }

    /// Copy of the last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<MemoryEntry> {
        lock(&self.working).recent(n).cloned().collect()
    }

    /// Run `f` against working memory without copying it.
    pub fn with_working<R>(&self, f: impl FnOnce(&WorkingMemory) -> R) -> R {
        f(&lock(&self.working))
    }

    pub fn render_recent(&self, n: usize) -> String {
        lock(&self.working).render_recent(n)
    }

    pub fn working_len(&self) -> usize {
        lock(&self.working).len()
    }

    pub fn working_budget(&self) -> usize {
        lock(&self.working).budget()
    }

    pub fn is_working_full(&self) -> bool {
        lock(&self.working).is_full()
    }

    pub fn clear_working(&self) {
        lock(&self.working).clear();
    }

    // ==================== Session memory ====================

    /// Store a session value with the configured default TTL.
    pub async fn session_put(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        self.session_put_with_ttl(key, value, self.session_ttl).await
    }

    pub async fn session_put_with_ttl(
        &self,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), MemoryError> {
        let store = Self::tier(&self.session, MemoryTier::Session)?;
        self.call(MemoryTier::Session, store.put(key, value, ttl))
            .await
    }

    pub async fn session_get(&self, key: &str) -> Result<Option<Value>, MemoryError> {
        let store = Self::tier(&self.session, MemoryTier::Session)?;
        self.call(MemoryTier::Session, store.get(key)).await
    }

    pub async fn session_delete(&self, key: &str) -> Result<bool, MemoryError> {
        let store = Self::tier(&self.session, MemoryTier::Session)?;
        self.call(MemoryTier::Session, store.delete(key)).await
    }

    pub async fn session_exists(&self, key: &str) -> Result<bool, MemoryError> {
        let store = Self::tier(&self.session, MemoryTier::Session)?;
        self.call(MemoryTier::Session, store.exists(key)).await
    }

    // ==================== Semantic memory ====================

    pub async fn index(&self, document: Document) -> Result<String, MemoryError> {
        let store = Self::tier(&self.semantic, MemoryTier::Semantic)?;
        self.call(MemoryTier::Semantic, store.index(document)).await
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SemanticHit>, MemoryError> {
        let store = Self::tier(&self.semantic, MemoryTier::Semantic)?;
        self.call(MemoryTier::Semantic, store.search(query, k)).await
    }

    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, MemoryError> {
        let store = Self::tier(&self.semantic, MemoryTier::Semantic)?;
        self.call(MemoryTier::Semantic, store.get(id)).await
    }

    // ==================== Relational memory ====================

    pub async fn add_entity(&self, entity: Entity) -> Result<(), MemoryError> {
        let store = Self::tier(&self.relational, MemoryTier::Relational)?;
        self.call(MemoryTier::Relational, store.add_entity(entity))
            .await
    }

    pub async fn add_relationship(&self, relationship: Relationship) -> Result<(), MemoryError> {
        let store = Self::tier(&self.relational, MemoryTier::Relational)?;
        self.call(MemoryTier::Relational, store.add_relationship(relationship))
            .await
    }

    pub async fn query(&self, pattern: &GraphPattern) -> Result<Vec<GraphMatch>, MemoryError> {
        let store = Self::tier(&self.relational, MemoryTier::Relational)?;
        self.call(MemoryTier::Relational, store.query(pattern)).await
    }

    pub async fn find_path(
        &self,
        from: &str,
        to: &str,
        max_hops: usize,
    ) -> Result<Option<Vec<Relationship>>, MemoryError> {
        let store = Self::tier(&self.relational, MemoryTier::Relational)?;
        self.call(MemoryTier::Relational, store.find_path(from, to, max_hops))
            .await
    }

    // ==================== Status ====================

    pub fn status(&self) -> MemoryStatus {
        let working = lock(&self.working);
        MemoryStatus {
            working_len: working.len(),
            working_budget: working.budget(),
            working_full: working.is_full(),
            session_enabled: self.session.is_some(),
            semantic_enabled: self.semantic.is_some(),
            relational_enabled: self.relational.is_some(),
        }
    }

    fn tier<'a, S: ?Sized>(
        store: &'a Option<Arc<S>>,
        tier: MemoryTier,
    ) -> Result<&'a Arc<S>, MemoryError> {
        store.as_ref().ok_or_else(|| MemoryError::Unavailable {
            tier,
            reason: "no backend configured".to_string(),
        })
    }

    async fn call<T>(
        &self,
        tier: MemoryTier,
        future: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, MemoryError> {
        match bounded(self.backend_timeout, future).await {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => {
                warn!("{} memory call failed: {}", tier, e);
                Err(MemoryError::from_store(tier, e))
            }
            None => {
                warn!(
                    "{} memory call timed out after {:?}",
                    tier, self.backend_timeout
                );
                Err(MemoryError::Unavailable {
                    tier,
                    reason: format!("timed out after {:?}", self.backend_timeout),
                })
            }
        }
    }
}
