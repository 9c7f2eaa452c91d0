//! Worker pool
//!
//! Holds the long-lived, role-tagged agents. Each agent runs at most one task
//! at a time: concurrent `execute_task` calls against the same agent wait on
//! that agent's run lock, which is the pool's only backpressure. Distinct
//! agents run fully in parallel.

use crate::config::WorkerSettings;
use crate::ports::event_logger::{EventLogger, NoEventLogger, PipelineEvent};
use crate::ports::reasoning_provider::{ProviderError, ReasoningProvider};
use crate::use_cases::memory_layer::MemoryLayer;
use crate::use_cases::shared::{bounded, lock};
use brain_domain::{
    AgentBusy, AgentId, ContextOverlapJudge, GroundingJudge, MemoryEntry, MemoryKind,
    PromptTemplate, Task, TaskId, TaskStatus, WorkerAgent, WorkerResult, WorkerRole,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Number of semantic hits added to a worker's context
const SEMANTIC_CONTEXT_HITS: usize = 3;

/// Why a task execution failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionCause {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors of the worker pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error("No worker available for role {0}")]
    NoWorkerAvailable(WorkerRole),

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Task {task_id} failed: {cause}")]
    WorkerExecution { task_id: TaskId, cause: ExecutionCause },

    #[error(transparent)]
    AgentBusy(#[from] AgentBusy),
}

impl WorkerError {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, WorkerError::AgentBusy(_))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            WorkerError::NoWorkerAvailable(_) => true,
            WorkerError::WorkerExecution { cause, .. } => match cause {
                ExecutionCause::Timeout(_) => true,
                ExecutionCause::Provider(e) => e.is_transient(),
            },
            _ => false,
        }
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            WorkerError::WorkerExecution { task_id, .. } => Some(task_id),
            WorkerError::AgentBusy(busy) => Some(&busy.requested_task),
            _ => None,
        }
    }
}

/// What to run on an agent.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub task_id: TaskId,
    pub role: WorkerRole,
    pub sub_goal_index: usize,
    pub instruction: String,
    /// Explicit context. When `None` the pool gathers it from memory.
    pub context: Option<String>,
    pub attempt: u8,
}

impl ExecutionRequest {
    pub fn for_task(task: &Task, instruction: impl Into<String>) -> Self {
        Self {
            task_id: task.id().clone(),
            role: task.role().clone(),
            sub_goal_index: task.sub_goal_index(),
            instruction: instruction.into(),
            context: None,
            attempt: 1,
        }
    }

    /// Second attempt for an earlier result, with augmented context.
    pub fn retry(previous: &WorkerResult, context: String) -> Self {
        Self {
            task_id: previous.task_id.clone(),
            role: previous.role.clone(),
            sub_goal_index: previous.sub_goal_index,
            instruction: previous.instruction.clone(),
            context: Some(context),
            attempt: previous.attempt.saturating_add(1),
        }
    }
}

struct AgentSlot {
    run_lock: tokio::sync::Mutex<()>,
    state: Mutex<WorkerAgent>,
}

/// Marks an agent busy for its lifetime; dropping without `finish` counts the
/// task as failed so that a cancelled execution never leaves the agent stuck.
struct BusyGuard<'a> {
    slot: &'a AgentSlot,
    done: bool,
}

impl<'a> BusyGuard<'a> {
    fn begin(slot: &'a AgentSlot, task_id: TaskId) -> Result<Self, AgentBusy> {
        lock(&slot.state).begin(task_id)?;
        Ok(Self { slot, done: false })
    }

    fn finish(mut self, success: bool) {
        lock(&self.slot.state).finish(success);
        self.done = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            lock(&self.slot.state).finish(false);
        }
    }
}

pub struct WorkerPool {
    agents: Vec<Arc<AgentSlot>>,
    provider: Arc<dyn ReasoningProvider>,
    memory: Arc<MemoryLayer>,
    judge: Arc<dyn GroundingJudge>,
    timeout: Duration,
    context_window: usize,
    logger: Arc<dyn EventLogger>,
}

impl WorkerPool {
    /// Create `workers_per_role` agents for every configured role, named
    /// `<role slug>-<n>` (e.g. `research-1`, `data-science-2`). Roles sharing a
    /// slug are staffed once.
    pub fn new(
        settings: &WorkerSettings,
        provider: Arc<dyn ReasoningProvider>,
        memory: Arc<MemoryLayer>,
    ) -> Self {
        let mut slugs = HashSet::new();
        let agents = settings
            .roles
            .iter()
            .filter(|role| {
                let fresh = slugs.insert(role.slug());
                if !fresh {
                    warn!("Role {} duplicates an earlier role, not staffed twice", role);
                }
                fresh
            })
            .flat_map(|role| {
                (1..=settings.workers_per_role).map(move |n| {
                    let id = AgentId::new(format!("{}-{}", role.slug(), n));
                    Arc::new(AgentSlot {
                        run_lock: tokio::sync::Mutex::new(()),
                        state: Mutex::new(WorkerAgent::new(id, role.clone())),
                    })
                })
            })
            .collect();

        Self {
            agents,
            provider,
            memory,
            judge: Arc::new(ContextOverlapJudge::default()),
            timeout: settings.task_timeout,
            context_window: 5,
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_judge(mut self, judge: Arc<dyn GroundingJudge>) -> Self {
        self.judge = judge;
        self
    }

    pub fn with_context_window(mut self, entries: usize) -> Self {
        self.context_window = entries;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// First available agent with `role`. Does not reserve it.
    pub fn get_available_worker(&self, role: &WorkerRole) -> Result<WorkerAgent, WorkerError> {
        self.agents
            .iter()
            .map(|slot| lock(&slot.state).clone())
            .find(|agent| agent.role() == role && agent.is_available())
            .ok_or_else(|| WorkerError::NoWorkerAvailable(role.clone()))
    }

    /// Some agent with `role`, available or not. Executing on it waits for
    /// the agent to become free.
    pub fn any_worker(&self, role: &WorkerRole) -> Result<WorkerAgent, WorkerError> {
        self.get_available_worker(role).or_else(|_| {
            self.agents
                .iter()
                .map(|slot| lock(&slot.state).clone())
                .find(|agent| agent.role() == role)
                .ok_or_else(|| WorkerError::NoWorkerAvailable(role.clone()))
        })
    }

    /// Run one task on `agent_id`.
    ///
    /// Waits while the agent is busy with another task. The provider call is
    /// bounded by the task timeout. Success and failure both release the
    /// agent and are recorded in working memory.
    pub async fn execute_task(
        &self,
        agent_id: &AgentId,
        request: ExecutionRequest,
    ) -> Result<WorkerResult, WorkerError> {
        let slot = self.slot(agent_id)?;
        let _running = slot.run_lock.lock().await;

        let guard = BusyGuard::begin(&slot, request.task_id.clone()).map_err(|busy| {
            error!("Agent mutual exclusion violated: {}", busy);
            WorkerError::from(busy)
        })?;

        let context = match &request.context {
            Some(context) => context.clone(),
            None => self.gather_context(&request.instruction).await,
        };
        let prompt = PromptTemplate::worker_prompt(&request.role, &request.instruction);
        debug!(
            "Agent {} executing task {} (attempt {})",
            agent_id, request.task_id, request.attempt
        );

        let outcome = match bounded(self.timeout, self.provider.generate(&prompt, &context)).await {
            Some(Ok(output)) => Ok(output),
            Some(Err(e)) => Err(ExecutionCause::Provider(e)),
            None => Err(ExecutionCause::Timeout(self.timeout)),
        };

        match outcome {
            Ok(output) => {
                let reflection = self.judge.judge(&output, &context);
                guard.finish(true);

                let result = WorkerResult {
                    task_id: request.task_id,
                    agent_id: agent_id.clone(),
                    role: request.role,
                    sub_goal_index: request.sub_goal_index,
                    instruction: request.instruction,
                    output,
                    reflection,
                    status: TaskStatus::Completed,
                    attempt: request.attempt,
                };
                self.memory.append(
                    MemoryEntry::new(
                        MemoryKind::WorkerResult,
                        format!("[{}] {}", result.role, result.output),
                    )
                    .for_task(result.task_id.clone()),
                );
                info!(
                    "Task {} completed by {} ({})",
                    result.task_id, agent_id, reflection
                );
                self.logger.log(PipelineEvent::new(
                    "task_completed",
                    json!({
                        "task_id": result.task_id,
                        "agent_id": agent_id,
                        "role": result.role,
                        "reflection": reflection.to_string(),
                        "attempt": result.attempt,
                    }),
                ));
                Ok(result)
            }
            Err(cause) => {
                guard.finish(false);
                warn!("Task {} failed on {}: {}", request.task_id, agent_id, cause);
                self.memory.append(
                    MemoryEntry::new(MemoryKind::TaskFailed, cause.to_string())
                        .for_task(request.task_id.clone()),
                );
                self.logger.log(PipelineEvent::new(
                    "task_failed",
                    json!({
                        "task_id": request.task_id,
                        "agent_id": agent_id,
                        "error": cause.to_string(),
                    }),
                ));
                Err(WorkerError::WorkerExecution {
                    task_id: request.task_id,
                    cause,
                })
            }
        }
    }

    /// Snapshot of every agent, in creation order.
    pub fn agents(&self) -> Vec<WorkerAgent> {
        self.agents
            .iter()
            .map(|slot| lock(&slot.state).clone())
            .collect()
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<WorkerAgent> {
        let slot = self.slot(agent_id).ok()?;
        let agent = lock(&slot.state).clone();
        Some(agent)
    }

    pub fn available_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|slot| lock(&slot.state).is_available())
            .count()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn slot(&self, agent_id: &AgentId) -> Result<Arc<AgentSlot>, WorkerError> {
        self.agents
            .iter()
            .find(|slot| lock(&slot.state).id() == agent_id)
            .cloned()
            .ok_or_else(|| WorkerError::UnknownAgent(agent_id.clone()))
    }

    /// Recent working memory plus related semantic documents. An unavailable
    /// tier contributes nothing.
    async fn gather_context(&self, instruction: &str) -> String {
        let mut parts = vec![self.memory.render_recent(self.context_window)];

        match self.memory.search(instruction, SEMANTIC_CONTEXT_HITS).await {
            Ok(hits) => {
                for hit in hits {
                    if let Ok(Some(document)) = self.memory.get_document(&hit.id).await {
                        parts.push(document.content);
                    }
                }
            }
            Err(e) => debug!("No semantic context: {}", e),
        }

        parts.retain(|p| !p.trim().is_empty());
        parts.join("\n")
    }
}
