//! Execution parameters: pipeline control.
//!
//! [`ExecutionParams`] groups the static parameters that control how
//! [`ProcessObjectiveUseCase`](crate::use_cases::process_objective::ProcessObjectiveUseCase)
//! runs an objective. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Gate every run behind a consensus vote unless the caller opts out.
    pub require_consensus: bool,
    /// Number of recent working-memory entries handed to a worker as context.
    pub context_window: usize,
    /// Hops allowed when the supervisor re-retrieves from relational memory.
    pub re_retrieval_hops: usize,
    /// Completed runs kept in the execution history.
    pub history_limit: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            require_consensus: true,
            context_window: 5,
            re_retrieval_hops: 2,
            history_limit: 100,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_require_consensus(mut self, require: bool) -> Self {
        self.require_consensus = require;
        self
    }

    pub fn with_context_window(mut self, entries: usize) -> Self {
        self.context_window = entries;
        self
    }

    pub fn with_re_retrieval_hops(mut self, hops: usize) -> Self {
        self.re_retrieval_hops = hops;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert!(params.require_consensus);
        assert_eq!(params.context_window, 5);
        assert_eq!(params.re_retrieval_hops, 2);
        assert_eq!(params.history_limit, 100);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_require_consensus(false)
            .with_context_window(10)
            .with_history_limit(0);

        assert!(!params.require_consensus);
        assert_eq!(params.context_window, 10);
        assert_eq!(params.history_limit, 1);
    }
}
