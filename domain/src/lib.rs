//! Domain layer for collective-brain
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Orchestration
//!
//! An objective is decomposed into 3 to 5 sub-goals. Each sub-goal is routed
//! deterministically to a worker role and tracked as a task whose status only
//! moves forward.
//!
//! ## Workers
//!
//! Long-lived, role-tagged agents hold at most one task at a time and tag each
//! output `Supported` or `Unsupported`.
//!
//! ## Memory
//!
//! A bounded FIFO working buffer plus value types for the session, semantic
//! and relational tiers.
//!
//! ## Quorum
//!
//! Vote sessions with `N = 3f + 1` fault-tolerance arithmetic and a
//! super-majority threshold gate the final decision.

pub mod core;
pub mod memory;
pub mod orchestration;
pub mod prompt;
pub mod quorum;
pub mod synthesis;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use core::{
    error::InvalidTransition,
    ids::{AgentId, DecisionId, ObjectiveId, TaskId, VoterId},
};
pub use memory::{
    Document, Entity, GraphMatch, GraphPattern, MemoryEntry, MemoryKind, MemoryTier, Relationship,
    SemanticHit, WorkingMemory,
};
pub use orchestration::{
    Decomposition, DecompositionKind, DraftSubGoal, Objective, PipelineStage, SubGoal, Task,
    TaskStatus, WorkerRole, parse_decomposition,
};
pub use prompt::PromptTemplate;
pub use quorum::{
    Ballot, CastReceipt, ConsensusError, ConsensusOutcome, DecisionSnapshot, DecisionStatus,
    IntegrityCheck, IntegrityPolicy, QuorumRule, TallyReport, VoteBreakdown, VoteChoice,
    VoteSession, min_required_voters,
};
pub use synthesis::{QualityCheck, QualityCriteria, QualityReport, SynthesisEntry, SynthesisResult};
pub use worker::{
    AgentBusy, Availability, ContextOverlapJudge, GroundingJudge, ReflectionTag, WorkerAgent,
    WorkerResult,
};
