//! Voter panel port
//!
//! Supplies ballots when the pipeline finalizes a synthesis through the
//! consensus engine.

use async_trait::async_trait;
use brain_domain::{SynthesisResult, VoteChoice, VoterId};

/// One ballot proposed by a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelBallot {
    pub voter_id: VoterId,
    pub choice: VoteChoice,
    pub justification: String,
}

/// Source of ballots for a finalization vote
#[async_trait]
pub trait VoterPanel: Send + Sync {
    /// Ballots for `synthesis` from (a subset of) `voters`. Voters left out
    /// count as unreachable.
    async fn collect(&self, synthesis: &SynthesisResult, voters: &[VoterId]) -> Vec<PanelBallot>;
}

/// Every voter approves a synthesis that passed its quality gate and rejects
/// one that did not (or was never validated).
pub struct QualityVoterPanel;

#[async_trait]
impl VoterPanel for QualityVoterPanel {
    async fn collect(&self, synthesis: &SynthesisResult, voters: &[VoterId]) -> Vec<PanelBallot> {
        let (choice, justification) = match &synthesis.quality {
            Some(report) if report.passed => (
                VoteChoice::Approve,
                format!("all {} quality checks passed", report.checks.len()),
            ),
            Some(report) => (
                VoteChoice::Reject,
                format!("quality checks failed: {}", report.failure_summary()),
            ),
            None => (VoteChoice::Reject, "synthesis was not validated".to_string()),
        };

        voters
            .iter()
            .map(|voter_id| PanelBallot {
                voter_id: voter_id.clone(),
                choice,
                justification: justification.clone(),
            })
            .collect()
    }
}
