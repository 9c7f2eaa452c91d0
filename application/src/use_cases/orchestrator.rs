//! Orchestrator
//!
//! Decomposes objectives into sub-goals and owns every task record. Task ids
//! are generated here and checked for collisions before a task is stored;
//! task status only moves forward.

use crate::ports::event_logger::{EventLogger, NoEventLogger, PipelineEvent};
use crate::ports::reasoning_provider::{ProviderError, ReasoningProvider};
use crate::use_cases::memory_layer::MemoryLayer;
use crate::use_cases::shared::{bounded, read, write};
use brain_domain::{
    Decomposition, DecompositionKind, InvalidTransition, MemoryEntry, MemoryKind, Objective,
    ObjectiveId, PromptTemplate, Task, TaskId, TaskStatus, WorkerRole, parse_decomposition,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors of the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Objective is empty")]
    EmptyObjective,

    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Decomposition failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Decomposition timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl OrchestratorError {
    /// A task-id collision means id generation is broken.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, OrchestratorError::DuplicateTask(_))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            OrchestratorError::Provider(e) => e.is_transient(),
            OrchestratorError::Timeout(_) => true,
            _ => false,
        }
    }
}

type IdSource = Arc<dyn Fn() -> TaskId + Send + Sync>;

pub struct Orchestrator {
    provider: Arc<dyn ReasoningProvider>,
    memory: Arc<MemoryLayer>,
    roles: Vec<WorkerRole>,
    timeout: Duration,
    tasks: RwLock<HashMap<TaskId, Task>>,
    id_source: IdSource,
    logger: Arc<dyn EventLogger>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ReasoningProvider>,
        memory: Arc<MemoryLayer>,
        roles: Vec<WorkerRole>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            memory,
            roles,
            timeout,
            tasks: RwLock::new(HashMap::new()),
            id_source: Arc::new(TaskId::generate),
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the task id generator.
    pub fn with_id_source(mut self, source: impl Fn() -> TaskId + Send + Sync + 'static) -> Self {
        self.id_source = Arc::new(source);
        self
    }

    /// Turn an objective into 3 to 5 ordered sub-goals.
    ///
    /// Unparseable provider output falls back to the five-step template; a
    /// provider that explicitly returns one or two sub-goals yields the single
    /// degenerate sub-goal; extra sub-goals are truncated and recorded.
    pub async fn decompose(&self, objective: &Objective) -> Result<Decomposition, OrchestratorError> {
        if objective.content.trim().is_empty() {
            return Err(OrchestratorError::EmptyObjective);
        }

        let prompt = PromptTemplate::decomposition_prompt(&objective.content, &self.roles);
        debug!("Decomposing objective {} with {}", objective.id, self.provider.name());

        let text = bounded(
            self.timeout,
            self.provider
                .generate(&prompt, PromptTemplate::decomposition_system()),
        )
        .await
        .ok_or(OrchestratorError::Timeout(self.timeout))??;

        let decomposition = Decomposition::from_drafts(
            objective,
            parse_decomposition(&text),
            &self.roles,
        );
        match &decomposition.kind {
            DecompositionKind::Standard => {}
            DecompositionKind::Truncated { dropped } => warn!(
                "Objective {} produced {} sub-goals, dropped {}: {:?}",
                objective.id,
                decomposition.len() + dropped.len(),
                dropped.len(),
                dropped
            ),
            DecompositionKind::Degenerate { returned } => info!(
                "Objective {} decomposed into {} sub-goal(s), using single degenerate task",
                objective.id, returned
            ),
            DecompositionKind::TemplateFallback => warn!(
                "Could not parse decomposition for {}, using template plan",
                objective.id
            ),
        }

        let plan = decomposition
            .sub_goals
            .iter()
            .map(|g| format!("{}. [{}] {}", g.index + 1, g.role, g.description))
            .collect::<Vec<_>>()
            .join("\n");
        self.memory.append(
            MemoryEntry::new(
                MemoryKind::TaskCreated,
                format!("Objective: {}\n{}", objective.content, plan),
            )
            .for_objective(objective.id.clone()),
        );

        info!(
            "Decomposed objective {} into {} sub-goals",
            objective.id,
            decomposition.len()
        );
        Ok(decomposition)
    }

    /// Create a task for one sub-goal with a freshly generated id.
    pub fn assign_to_worker(
        &self,
        objective_id: &ObjectiveId,
        sub_goal_index: usize,
        role: WorkerRole,
    ) -> Result<Task, OrchestratorError> {
        let task_id = (self.id_source)();
        let task = Task::assigned(task_id.clone(), objective_id.clone(), sub_goal_index, role);

        {
            let mut tasks = write(&self.tasks);
            if tasks.contains_key(&task_id) {
                error!("Task id collision: {}", task_id);
                return Err(OrchestratorError::DuplicateTask(task_id));
            }
            tasks.insert(task_id.clone(), task.clone());
        }

        debug!("Assigned task {} to role {}", task_id, task.role());
        self.logger.log(PipelineEvent::new(
            "task_assigned",
            json!({
                "task_id": task_id,
                "objective_id": objective_id,
                "sub_goal_index": sub_goal_index,
                "role": task.role(),
            }),
        ));
        Ok(task)
    }

    pub fn get_task_status(&self, task_id: &TaskId) -> Result<TaskStatus, OrchestratorError> {
        read(&self.tasks)
            .get(task_id)
            .map(Task::status)
            .ok_or_else(|| OrchestratorError::NotFound(task_id.clone()))
    }

    pub fn get_task(&self, task_id: &TaskId) -> Result<Task, OrchestratorError> {
        read(&self.tasks)
            .get(task_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(task_id.clone()))
    }

    pub fn mark_in_progress(&self, task_id: &TaskId) -> Result<(), OrchestratorError> {
        self.transition(task_id, TaskStatus::InProgress)
    }

    pub fn mark_complete(&self, task_id: &TaskId) -> Result<(), OrchestratorError> {
        self.transition(task_id, TaskStatus::Completed)
    }

    pub fn mark_failed(&self, task_id: &TaskId) -> Result<(), OrchestratorError> {
        self.transition(task_id, TaskStatus::Failed)
    }

    /// Tasks of one objective, ordered by sub-goal index.
    pub fn tasks_for(&self, objective_id: &ObjectiveId) -> Vec<Task> {
        let mut tasks: Vec<Task> = read(&self.tasks)
            .values()
            .filter(|t| t.objective_id() == objective_id)
            .cloned()
            .collect();
        tasks.sort_by_key(Task::sub_goal_index);
        tasks
    }

    /// Tasks not yet in a terminal state.
    pub fn active_tasks(&self) -> usize {
        self.count(|s| !s.is_terminal())
    }

    pub fn completed_tasks(&self) -> usize {
        self.count(|s| s == TaskStatus::Completed)
    }

    pub fn failed_tasks(&self) -> usize {
        self.count(|s| s == TaskStatus::Failed)
    }

    pub fn total_tasks(&self) -> usize {
        read(&self.tasks).len()
    }

    fn count(&self, predicate: impl Fn(TaskStatus) -> bool) -> usize {
        read(&self.tasks)
            .values()
            .filter(|t| predicate(t.status()))
            .count()
    }

    fn transition(&self, task_id: &TaskId, next: TaskStatus) -> Result<(), OrchestratorError> {
        let mut tasks = write(&self.tasks);
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| OrchestratorError::NotFound(task_id.clone()))?;
        task.transition(next)?;
        Ok(())
    }
}
