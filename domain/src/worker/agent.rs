//! Worker agent entity and its mutual-exclusion state machine.

use crate::core::ids::{AgentId, TaskId};
use crate::orchestration::role::WorkerRole;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
}

/// An agent was asked to start a task while it already holds one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("agent {agent_id} is busy with {current_task}, cannot start {requested_task}")]
pub struct AgentBusy {
    pub agent_id: AgentId,
    pub current_task: TaskId,
    pub requested_task: TaskId,
}

/// A long-lived, role-tagged worker.
///
/// `availability == Busy` if and only if `current_task` is `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAgent {
    id: AgentId,
    role: WorkerRole,
    availability: Availability,
    current_task: Option<TaskId>,
    completed_count: u64,
    failed_count: u64,
}

impl WorkerAgent {
    pub fn new(id: AgentId, role: WorkerRole) -> Self {
        Self {
            id,
            role,
            availability: Availability::Available,
            current_task: None,
            completed_count: 0,
            failed_count: 0,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn role(&self) -> &WorkerRole {
        &self.role
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn current_task(&self) -> Option<&TaskId> {
        self.current_task.as_ref()
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn failed_count(&self) -> u64 {
        self.failed_count
    }

    /// Take a task. Fails if another task is current.
    pub fn begin(&mut self, task_id: TaskId) -> Result<(), AgentBusy> {
        if let Some(current) = &self.current_task {
            return Err(AgentBusy {
                agent_id: self.id.clone(),
                current_task: current.clone(),
                requested_task: task_id,
            });
        }
        self.current_task = Some(task_id);
        self.availability = Availability::Busy;
        Ok(())
    }

    /// Release the current task, counting it as completed or failed.
    /// Returns the released task id; a no-op when idle.
    pub fn finish(&mut self, success: bool) -> Option<TaskId> {
        let task = self.current_task.take()?;
        self.availability = Availability::Available;
        if success {
            self.completed_count += 1;
        } else {
            self.failed_count += 1;
        }
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> WorkerAgent {
        WorkerAgent::new(AgentId::new("research-1"), WorkerRole::Research)
    }

    #[test]
    fn test_begin_and_finish() {
        let mut agent = agent();
        assert!(agent.is_available());

        agent.begin(TaskId::new("t1")).unwrap();
        assert_eq!(agent.availability(), Availability::Busy);
        assert_eq!(agent.current_task(), Some(&TaskId::new("t1")));

        assert_eq!(agent.finish(true), Some(TaskId::new("t1")));
        assert!(agent.is_available());
        assert_eq!(agent.completed_count(), 1);
        assert!(agent.current_task().is_none());
    }

    #[test]
    fn test_second_task_rejected_while_busy() {
        let mut agent = agent();
        agent.begin(TaskId::new("t1")).unwrap();
        let err = agent.begin(TaskId::new("t2")).unwrap_err();
        assert_eq!(err.current_task, TaskId::new("t1"));
        assert_eq!(err.requested_task, TaskId::new("t2"));
        // Still holding the first task
        assert_eq!(agent.current_task(), Some(&TaskId::new("t1")));
    }

    #[test]
    fn test_failure_releases_agent() {
        let mut agent = agent();
        agent.begin(TaskId::new("t1")).unwrap();
        agent.finish(false);
        assert!(agent.is_available());
        assert_eq!(agent.failed_count(), 1);
        assert_eq!(agent.completed_count(), 0);
    }

    #[test]
    fn test_finish_when_idle_is_noop() {
        let mut agent = agent();
        assert_eq!(agent.finish(true), None);
        assert_eq!(agent.completed_count(), 0);
    }
}
