//! Reasoning Provider port
//!
//! Defines the interface for the opaque text-generation capability used to
//! decompose objectives and produce worker outputs.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during provider calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Network failures and rate limits may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::RateLimited { .. }
        )
    }
}

/// Text generation capability
///
/// Calls may be slow, may fail, and are not deterministic. Callers apply
/// their own timeout.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Short provider name for logs (e.g. `template`, `openai:gpt-4o-mini`)
    fn name(&self) -> &str;

    /// Generate text for `prompt` given supporting `context`
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ProviderError>;
}
