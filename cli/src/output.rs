//! Console output for pipeline reports, tallies and status

use brain_application::{BrainConfig, PipelineReport, PipelineStatus, SystemStatus};
use brain_domain::{ConsensusOutcome, TallyReport};
use colored::Colorize;

pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_report(report: &PipelineReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Collective Brain Results"));
        output.push_str(&format!(
            "\n{} {}\n",
            "Objective:".cyan().bold(),
            report.objective.content
        ));

        output.push_str(&Self::section_header("Plan"));
        for goal in &report.decomposition.sub_goals {
            output.push_str(&format!(
                "  {}. [{}] {}\n",
                goal.index + 1,
                goal.role.to_string().yellow(),
                goal.description
            ));
        }

        if !report.failures.is_empty() {
            output.push_str(&Self::section_header("Failed Tasks"));
            for failure in &report.failures {
                output.push_str(&format!(
                    "  {} [{}] {}\n",
                    "x".red(),
                    failure.role,
                    failure.error
                ));
            }
        }

        output.push_str(&Self::section_header("Synthesis"));
        output.push_str(&format!("\n{}\n", report.synthesis.combined_output));

        output.push_str(&Self::section_header("Quality"));
        for check in &report.quality.checks {
            let mark = if check.passed { "v".green() } else { "x".red() };
            output.push_str(&format!(
                "  {} {} (expected {}, got {})\n",
                mark, check.criterion, check.expected, check.actual
            ));
        }

        if let Some(tally) = &report.consensus {
            output.push_str(&Self::section_header("Consensus"));
            output.push_str(&format!("  {}\n", Self::outcome_line(tally)));
        } else if let Some(error) = &report.consensus_error {
            output.push_str(&Self::section_header("Consensus"));
            output.push_str(&format!("  {} {}\n", "x".red(), error));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Status:".cyan().bold(),
            Self::status_label(report.status)
        ));
        output
    }

    pub fn format_tally(report: &TallyReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            "Decision:".cyan().bold(),
            report.decision_id
        ));
        output.push_str(&format!("  {}\n", Self::outcome_line(report)));
        output.push_str(&format!(
            "  approval {:.1}% of {} votes cast\n",
            report.consensus_percentage, report.votes_cast
        ));
        for violation in &report.violations {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "!".red().bold(),
                violation.voter_id,
                violation.reason
            ));
        }
        output
    }

    pub fn format_status(status: &SystemStatus, config: &BrainConfig, provider: &str) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Collective Brain Status"));
        output.push_str(&format!("\n{} {}\n", "Provider:".cyan().bold(), provider));
        output.push_str(&format!(
            "{} {} ({} available)\n",
            "Workers:".cyan().bold(),
            status.workers,
            status.available_workers
        ));
        output.push_str(&format!(
            "{} f = {}, N = {}, rule = {}\n",
            "Consensus:".cyan().bold(),
            config.consensus.max_faulty_voters,
            brain_domain::min_required_voters(config.consensus.max_faulty_voters),
            config.consensus.quorum_rule
        ));
        output.push_str(&format!(
            "{} working {}/{}{}, session {}, semantic {}, relational {}\n",
            "Memory:".cyan().bold(),
            status.memory.working_len,
            status.memory.working_budget,
            if status.memory.working_full { " (full)" } else { "" },
            Self::on_off(status.memory.session_enabled),
            Self::on_off(status.memory.semantic_enabled),
            Self::on_off(status.memory.relational_enabled)
        ));
        output.push_str(&format!(
            "{} {} total, {} active, {} completed, {} failed\n",
            "Tasks:".cyan().bold(),
            status.total_tasks,
            status.active_tasks,
            status.completed_tasks,
            status.failed_tasks
        ));
        output.push_str(&format!(
            "{} {} pending, {} finalized\n",
            "Decisions:".cyan().bold(),
            status.pending_decisions,
            status.finalized_decisions
        ));
        output
    }

    fn outcome_line(report: &TallyReport) -> String {
        let label = report.outcome.to_string();
        let outcome = match report.outcome {
            ConsensusOutcome::ConsensusReached => label.green().bold(),
            ConsensusOutcome::ByzantineDetected => label.red().bold(),
            _ => label.yellow().bold(),
        };
        format!(
            "{} ({} approve / {} reject / {} abstain, quorum {} of {})",
            outcome,
            report.breakdown.approve,
            report.breakdown.reject,
            report.breakdown.abstain,
            report.quorum_threshold,
            report.required_voters
        )
    }

    fn status_label(status: PipelineStatus) -> colored::ColoredString {
        if status.is_success() {
            status.as_str().green().bold()
        } else {
            status.as_str().red().bold()
        }
    }

    fn on_off(enabled: bool) -> &'static str {
        if enabled { "on" } else { "off" }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{}\n{}\n", line, title.bold(), line)
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).yellow().bold())
    }
}
