//! Brain configuration container.
//!
//! [`BrainConfig`] groups the typed settings each core service is built from.
//! The infrastructure loader produces it from files and environment; the
//! application never reads either itself.
//!
//! | Type | Consumed by |
//! |------|-------------|
//! | [`MemorySettings`] | `MemoryLayer` |
//! | [`ConsensusSettings`] | `ConsensusEngine` |
//! | [`WorkerSettings`] | `WorkerPool`, `Orchestrator` |
//! | [`QualityCriteria`] | `Supervisor` |
//! | [`ExecutionParams`] | `ProcessObjectiveUseCase` |

use crate::config::ExecutionParams;
use brain_domain::{IntegrityPolicy, QualityCriteria, QuorumRule, WorkerRole};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySettings {
    /// Maximum working-memory entries before FIFO eviction
    pub working_budget: usize,
    /// Upper bound on every long-term store call
    pub backend_timeout: Duration,
    /// Default time-to-live for session values
    pub session_ttl: Duration,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            working_budget: 50,
            backend_timeout: Duration::from_millis(2000),
            session_ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusSettings {
    /// `f` in `N = 3f + 1`
    pub max_faulty_voters: usize,
    pub quorum_rule: QuorumRule,
    pub integrity: IntegrityPolicy,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            max_faulty_voters: 1,
            quorum_rule: QuorumRule::SuperMajority,
            integrity: IntegrityPolicy::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    pub roles: Vec<WorkerRole>,
    pub workers_per_role: usize,
    /// Upper bound on every reasoning provider call
    pub task_timeout: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            roles: WorkerRole::defaults(),
            workers_per_role: 1,
            task_timeout: Duration::from_secs(600),
        }
    }
}

/// Configuration container handed to the binary's wiring code.
#[derive(Debug, Clone, Default)]
pub struct BrainConfig {
    pub memory: MemorySettings,
    pub consensus: ConsensusSettings,
    pub workers: WorkerSettings,
    pub quality: QualityCriteria,
    pub execution: ExecutionParams,
}

impl BrainConfig {
    /// Total number of agents the pool will be created with.
    pub fn agent_count(&self) -> usize {
        self.workers.roles.len() * self.workers.workers_per_role
    }

    /// Whether the default voter panel (one voter per agent) satisfies `3f + 1`.
    pub fn pool_can_vote(&self) -> bool {
        self.agent_count() >= brain_domain::min_required_voters(self.consensus.max_faulty_voters)
    }

    // ==================== Builder Methods ====================

    pub fn with_working_budget(mut self, budget: usize) -> Self {
        self.memory.working_budget = budget;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.workers.task_timeout = timeout;
        self
    }

    pub fn with_max_faulty_voters(mut self, f: usize) -> Self {
        self.consensus.max_faulty_voters = f;
        self
    }

    pub fn without_consensus(mut self) -> Self {
        self.execution.require_consensus = false;
        self
    }
}
