//! Worker output value objects

use crate::core::ids::{AgentId, TaskId};
use crate::orchestration::entities::TaskStatus;
use crate::orchestration::role::WorkerRole;
use serde::{Deserialize, Serialize};

/// Self-assessment attached to every worker output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReflectionTag {
    /// Output is grounded in the context the worker was given
    Supported,
    /// Output could not be tied to supporting context
    Unsupported,
}

impl ReflectionTag {
    pub fn is_supported(&self) -> bool {
        matches!(self, ReflectionTag::Supported)
    }
}

impl std::fmt::Display for ReflectionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReflectionTag::Supported => write!(f, "Supported"),
            ReflectionTag::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// Output of one completed task execution. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub role: WorkerRole,
    pub sub_goal_index: usize,
    /// The instruction the worker was given (needed to re-run the task)
    pub instruction: String,
    pub output: String,
    pub reflection: ReflectionTag,
    pub status: TaskStatus,
    /// 1 for the first execution, 2 after a supervisor re-retrieval
    pub attempt: u8,
}

impl WorkerResult {
    pub fn is_supported(&self) -> bool {
        self.reflection.is_supported()
    }
}
