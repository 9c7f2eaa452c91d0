//! Application layer for collective-brain
//!
//! This crate contains the core services, the objective pipeline, port
//! definitions and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BrainConfig, ConsensusSettings, ExecutionParams, MemorySettings, WorkerSettings};
pub use ports::{
    event_logger::{EventLogger, NoEventLogger, PipelineEvent},
    memory_store::{GraphStore, MemoryError, SessionStore, StoreError, VectorStore},
    progress::{NoProgress, ProgressNotifier},
    reasoning_provider::{ProviderError, ReasoningProvider},
    voter_panel::{PanelBallot, QualityVoterPanel, VoterPanel},
};
pub use use_cases::consensus_engine::ConsensusEngine;
pub use use_cases::memory_layer::{MemoryLayer, MemoryStatus};
pub use use_cases::orchestrator::{Orchestrator, OrchestratorError};
pub use use_cases::process_objective::{
    ExecutionRecord, PipelineReport, PipelineStatus, ProcessObjectiveError, ProcessObjectiveInput,
    ProcessObjectiveUseCase, SystemStatus, TaskFailure,
};
pub use use_cases::supervisor::{Supervisor, SupervisorError};
pub use use_cases::worker_pool::{ExecutionCause, ExecutionRequest, WorkerError, WorkerPool};
