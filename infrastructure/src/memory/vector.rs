//! Semantic store ranked by term overlap

use super::{read, write};
use async_trait::async_trait;
use brain_application::{StoreError, VectorStore};
use brain_domain::{Document, SemanticHit, memory::rank_by_similarity};
use std::sync::RwLock;

/// Documents kept in insertion order and ranked by Jaccard similarity of
/// their significant terms. Ids are `doc-1`, `doc-2`, ...
#[derive(Default)]
pub struct InMemoryVectorStore {
    documents: RwLock<Vec<(String, Document)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read(&self.documents).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn index(&self, document: Document) -> Result<String, StoreError> {
        if document.content.trim().is_empty() {
            return Err(StoreError::Rejected("document content cannot be empty".into()));
        }
        let mut documents = write(&self.documents);
        let id = format!("doc-{}", documents.len() + 1);
        documents.push((id.clone(), document));
        Ok(id)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SemanticHit>, StoreError> {
        let documents = read(&self.documents);
        Ok(rank_by_similarity(
            query,
            documents
                .iter()
                .map(|(id, doc)| (id.as_str(), doc.content.as_str())),
            k,
        ))
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(read(&self.documents)
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, doc)| doc.clone()))
    }
}
