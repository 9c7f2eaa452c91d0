//! Progress notification port
//!
//! Defines the interface for reporting progress while an objective moves
//! through the pipeline.

use brain_domain::{PipelineStage, WorkerRole};

/// Callback for progress updates during pipeline execution
///
/// Implementations live in the binary and can display progress however they
/// like (console, spinner, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: &PipelineStage, total_tasks: usize);

    /// Called when a task completes within a stage
    fn on_task_complete(&self, stage: &PipelineStage, role: &WorkerRole, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &PipelineStage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &PipelineStage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: &PipelineStage, _role: &WorkerRole, _success: bool) {}
    fn on_stage_complete(&self, _stage: &PipelineStage) {}
}
