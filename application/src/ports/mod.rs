//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod event_logger;
pub mod memory_store;
pub mod progress;
pub mod reasoning_provider;
pub mod voter_panel;
