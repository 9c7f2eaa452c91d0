//! Memory entries and tier labels.

use crate::core::ids::{ObjectiveId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four memory tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    Working,
    Session,
    Semantic,
    Relational,
}

impl std::fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Session => write!(f, "session"),
            Self::Semantic => write!(f, "semantic"),
            Self::Relational => write!(f, "relational"),
        }
    }
}

/// Kind of working-memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Objective decomposed into sub-goals.
    TaskCreated,
    /// Worker output for one sub-goal.
    WorkerResult,
    /// Worker execution failed.
    TaskFailed,
    /// Supervisor synthesis.
    Synthesis,
    /// Free-form note.
    Note,
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskCreated => write!(f, "task_created"),
            Self::WorkerResult => write!(f, "worker_result"),
            Self::TaskFailed => write!(f, "task_failed"),
            Self::Synthesis => write!(f, "synthesis"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// A single entry in working memory.
///
/// Owned by the memory layer; callers only append and read copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub kind: MemoryKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_id: Option<ObjectiveId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Id of the same content in the semantic tier, if indexed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_id: Option<String>,
    /// Id of a related entity in the relational tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_node: Option<String>,
}

impl MemoryEntry {
    pub fn new(kind: MemoryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Utc::now(),
            objective_id: None,
            task_id: None,
            vector_id: None,
            graph_node: None,
        }
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::new(MemoryKind::Note, content)
    }

    pub fn for_objective(mut self, objective_id: ObjectiveId) -> Self {
        self.objective_id = Some(objective_id);
        self
    }

    pub fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_vector_id(mut self, vector_id: impl Into<String>) -> Self {
        self.vector_id = Some(vector_id.into());
        self
    }

    pub fn with_graph_node(mut self, node: impl Into<String>) -> Self {
        self.graph_node = Some(node.into());
        self
    }
}
