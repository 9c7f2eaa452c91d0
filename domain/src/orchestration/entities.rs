//! Orchestration domain entities

use crate::core::error::InvalidTransition;
use crate::core::ids::{ObjectiveId, TaskId};
use crate::orchestration::role::WorkerRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted high-level goal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
}

impl Objective {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: ObjectiveId::generate(),
            content: content.into(),
            submitted_at: Utc::now(),
        }
    }

    pub fn with_id(id: ObjectiveId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Stage of an objective pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Objective is split into sub-goals
    Decompose,
    /// Sub-goals are executed by the worker pool
    Execute,
    /// Worker results are merged by the supervisor
    Synthesize,
    /// Synthesis is checked against the quality criteria
    Validate,
    /// Voters decide whether the synthesis is final
    Consensus,
}

impl PipelineStage {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStage::Decompose => "decompose",
            PipelineStage::Execute => "execute",
            PipelineStage::Synthesize => "synthesize",
            PipelineStage::Validate => "validate",
            PipelineStage::Consensus => "consensus",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PipelineStage::Decompose => "Decomposition",
            PipelineStage::Execute => "Execution",
            PipelineStage::Synthesize => "Synthesis",
            PipelineStage::Validate => "Quality Gate",
            PipelineStage::Consensus => "Consensus",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifecycle of a [`Task`].
///
/// Ordered `Pending < Assigned < InProgress < {Completed, Failed}`; both
/// terminal states share the highest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    fn rank(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Assigned => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Completed | TaskStatus::Failed => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether moving to `next` keeps the lifecycle monotonic.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-goal routed to a worker role (Entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    objective_id: ObjectiveId,
    sub_goal_index: usize,
    role: WorkerRole,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// A task starts out `Assigned`: it is only created once a role is known.
    pub fn assigned(
        id: TaskId,
        objective_id: ObjectiveId,
        sub_goal_index: usize,
        role: WorkerRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            objective_id,
            sub_goal_index,
            role,
            status: TaskStatus::Assigned,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn objective_id(&self) -> &ObjectiveId {
        &self.objective_id
    }

    pub fn sub_goal_index(&self) -> usize {
        self.sub_goal_index
    }

    pub fn role(&self) -> &WorkerRole {
        &self.role
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move the task forward. Regressions and exits from a terminal state
    /// are rejected and leave the task unchanged.
    pub fn transition(&mut self, next: TaskStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition::new(self.id.as_str(), self.status, next));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
