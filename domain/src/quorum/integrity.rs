//! Pluggable integrity checks run at tally time.
//!
//! A check inspects the full ballot history of a session (every cast, in
//! order, including overwritten ones) and reports voters whose behaviour
//! contradicts the policy. Any violation turns the outcome into
//! [`ConsensusOutcome::ByzantineDetected`](super::ConsensusOutcome::ByzantineDetected).

use crate::core::ids::VoterId;
use crate::quorum::vote::{Ballot, VoteChoice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityViolation {
    pub voter_id: VoterId,
    pub reason: String,
}

pub trait IntegrityCheck: Send + Sync {
    fn name(&self) -> &str;

    fn inspect(&self, history: &[(VoterId, Ballot)]) -> Vec<IntegrityViolation>;
}

/// Accepts every history. Re-votes simply overwrite.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveIntegrity;

impl IntegrityCheck for PermissiveIntegrity {
    fn name(&self) -> &str {
        "none"
    }

    fn inspect(&self, _history: &[(VoterId, Ballot)]) -> Vec<IntegrityViolation> {
        Vec::new()
    }
}

/// Flags a voter who cast both Approve and Reject within one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContradictoryRevoteCheck;

impl IntegrityCheck for ContradictoryRevoteCheck {
    fn name(&self) -> &str {
        "contradictory_revote"
    }

    fn inspect(&self, history: &[(VoterId, Ballot)]) -> Vec<IntegrityViolation> {
        let mut seen: BTreeMap<&VoterId, (bool, bool)> = BTreeMap::new();
        for (voter, ballot) in history {
            let entry = seen.entry(voter).or_default();
            match ballot.choice {
                VoteChoice::Approve => entry.0 = true,
                VoteChoice::Reject => entry.1 = true,
                VoteChoice::Abstain => {}
            }
        }
        seen.into_iter()
            .filter(|(_, (approved, rejected))| *approved && *rejected)
            .map(|(voter, _)| IntegrityViolation {
                voter_id: voter.clone(),
                reason: "cast both approve and reject in one tally window".to_string(),
            })
            .collect()
    }
}

/// Named integrity policy, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityPolicy {
    #[default]
    None,
    ContradictoryRevote,
}

impl IntegrityPolicy {
    pub fn into_check(self) -> Box<dyn IntegrityCheck> {
        match self {
            IntegrityPolicy::None => Box::new(PermissiveIntegrity),
            IntegrityPolicy::ContradictoryRevote => Box::new(ContradictoryRevoteCheck),
        }
    }
}

impl std::str::FromStr for IntegrityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "permissive" => Ok(IntegrityPolicy::None),
            "contradictory_revote" | "contradictory-revote" => {
                Ok(IntegrityPolicy::ContradictoryRevote)
            }
            _ => Err(format!(
                "Unknown integrity check: {}. Valid: none, contradictory_revote",
                s
            )),
        }
    }
}
