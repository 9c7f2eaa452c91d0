//! Vote types for quorum consensus

use crate::core::ids::VoterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A voter's choice on a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Approve,
    Reject,
    /// Counts toward participation, never toward a threshold.
    Abstain,
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteChoice::Approve => write!(f, "approve"),
            VoteChoice::Reject => write!(f, "reject"),
            VoteChoice::Abstain => write!(f, "abstain"),
        }
    }
}

impl std::str::FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "yes" | "a" => Ok(VoteChoice::Approve),
            "reject" | "no" | "r" => Ok(VoteChoice::Reject),
            "abstain" | "skip" => Ok(VoteChoice::Abstain),
            other => Err(format!(
                "Unknown vote choice: {}. Valid: approve, reject, abstain",
                other
            )),
        }
    }
}

/// A recorded ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub choice: VoteChoice,
    pub justification: String,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(choice: VoteChoice, justification: impl Into<String>) -> Self {
        Self {
            choice,
            justification: justification.into(),
            cast_at: Utc::now(),
        }
    }
}

/// Per-choice counts of the current ballots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBreakdown {
    pub approve: usize,
    pub reject: usize,
    pub abstain: usize,
}

impl VoteBreakdown {
    pub fn from_ballots<'a>(ballots: impl IntoIterator<Item = (&'a VoterId, &'a Ballot)>) -> Self {
        let mut breakdown = Self::default();
        for (_, ballot) in ballots {
            match ballot.choice {
                VoteChoice::Approve => breakdown.approve += 1,
                VoteChoice::Reject => breakdown.reject += 1,
                VoteChoice::Abstain => breakdown.abstain += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.approve + self.reject + self.abstain
    }

    /// Approve share of ballots cast, in percent.
    pub fn approval_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.approve as f64 / total as f64 * 100.0
        }
    }

    pub fn is_unanimous(&self) -> bool {
        let total = self.total();
        total > 0 && (self.approve == total || self.reject == total)
    }
}
