//! Port for structured pipeline event logging.
//!
//! Defines the [`EventLogger`] trait for recording pipeline events (objective
//! received, task assigned/completed/failed, re-retrieval, synthesis, quality,
//! votes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable audit trail (JSONL).

use serde_json::Value;

/// A structured pipeline event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. Adapters add the timestamp when writing.
#[derive(Debug, Clone)]
pub struct PipelineEvent {
    /// Event type identifier (e.g., "task_assigned", "vote_cast").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl PipelineEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging pipeline events to a structured log.
///
/// The `log` method is synchronous and non-fallible; a failing sink must not
/// disrupt the pipeline.
pub trait EventLogger: Send + Sync {
    fn log(&self, event: PipelineEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: PipelineEvent) {}
}
