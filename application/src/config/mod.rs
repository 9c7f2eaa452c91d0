//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`BrainConfig`]: container for the per-service settings
//! - [`ExecutionParams`]: pipeline control (consensus gating, context window)

pub mod brain_config;
pub mod execution_params;

pub use brain_config::{BrainConfig, ConsensusSettings, MemorySettings, WorkerSettings};
pub use execution_params::ExecutionParams;
