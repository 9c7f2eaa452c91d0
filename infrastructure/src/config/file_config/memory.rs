//! Memory configuration from TOML (`[memory]` section)

use serde::{Deserialize, Serialize};

/// Memory tier settings
///
/// # Example
///
/// ```toml
/// [memory]
/// working_budget = 50
/// backend_timeout_ms = 2000
/// session_ttl_seconds = 3600
/// relational_enabled = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    /// Working-memory entries kept before FIFO eviction
    pub working_budget: usize,
    /// Timeout for every session/semantic/relational backend call
    pub backend_timeout_ms: u64,
    pub session_enabled: bool,
    pub semantic_enabled: bool,
    pub relational_enabled: bool,
    /// Default time-to-live for session values
    pub session_ttl_seconds: u64,
    /// Recent working-memory entries handed to a worker as context
    pub context_window: usize,
    /// Traversal depth when the supervisor re-retrieves from relational memory
    pub re_retrieval_hops: usize,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            working_budget: 50,
            backend_timeout_ms: 2000,
            session_enabled: true,
            semantic_enabled: true,
            relational_enabled: true,
            session_ttl_seconds: 3600,
            context_window: 5,
            re_retrieval_hops: 2,
        }
    }
}
