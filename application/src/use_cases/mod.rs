//! Use cases
//!
//! The core services and the pipeline that drives them.

pub mod consensus_engine;
pub mod memory_layer;
pub mod orchestrator;
pub mod process_objective;
pub(crate) mod shared;
pub mod supervisor;
pub mod worker_pool;
