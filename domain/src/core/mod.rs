//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: process-unique identifiers (objectives, tasks, agents, decisions)
//! - [`error::InvalidTransition`]: rejected status transitions

pub mod error;
pub mod ids;
