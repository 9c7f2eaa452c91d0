//! Consensus outcomes and tally reports

use super::integrity::IntegrityViolation;
use super::vote::VoteBreakdown;
use crate::core::ids::DecisionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusOutcome {
    /// Approve count reached the quorum threshold
    ConsensusReached,
    /// Reject count reached the quorum threshold
    ConsensusFailed,
    /// Quorum participated but neither side reached the threshold
    Split,
    /// Fewer ballots than the quorum threshold. Never stored on a session;
    /// reported by callers that map [`ConsensusError::InsufficientVotes`](super::ConsensusError::InsufficientVotes).
    Insufficient,
    /// An integrity check flagged at least one voter
    ByzantineDetected,
}

impl ConsensusOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, ConsensusOutcome::ConsensusReached)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusOutcome::ConsensusReached => "consensus_reached",
            ConsensusOutcome::ConsensusFailed => "consensus_failed",
            ConsensusOutcome::Split => "split",
            ConsensusOutcome::Insufficient => "insufficient",
            ConsensusOutcome::ByzantineDetected => "byzantine_detected",
        }
    }
}

impl std::fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusOutcome::ConsensusReached => write!(f, "Consensus reached"),
            ConsensusOutcome::ConsensusFailed => write!(f, "Consensus failed"),
            ConsensusOutcome::Split => write!(f, "Split"),
            ConsensusOutcome::Insufficient => write!(f, "Insufficient votes"),
            ConsensusOutcome::ByzantineDetected => write!(f, "Byzantine behaviour detected"),
        }
    }
}

/// The recorded result of a finalized decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyReport {
    pub decision_id: DecisionId,
    pub outcome: ConsensusOutcome,
    pub breakdown: VoteBreakdown,
    pub votes_cast: usize,
    pub required_voters: usize,
    pub quorum_threshold: usize,
    /// Approve share of ballots cast, in percent.
    pub consensus_percentage: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<IntegrityViolation>,
    pub tallied_at: DateTime<Utc>,
}

impl TallyReport {
    pub fn is_reached(&self) -> bool {
        self.outcome.is_reached()
    }

    /// Short summary line, e.g. `Consensus reached (3 approve / 1 reject / 0 abstain, quorum 3 of 4)`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({} approve / {} reject / {} abstain, quorum {} of {})",
            self.outcome,
            self.breakdown.approve,
            self.breakdown.reject,
            self.breakdown.abstain,
            self.quorum_threshold,
            self.required_voters
        )
    }
}
