//! Progress reporting for pipeline execution

use brain_application::ProgressNotifier;
use brain_domain::{PipelineStage, WorkerRole};
use colored::Colorize;

/// Line-based progress on stdout
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &PipelineStage, total_tasks: usize) {
        println!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage.display_name().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: &PipelineStage, role: &WorkerRole, success: bool) {
        if success {
            println!("  {} {}", "v".green(), role);
        } else {
            println!("  {} {} (failed)", "x".red(), role);
        }
    }

    fn on_stage_complete(&self, _stage: &PipelineStage) {}
}
