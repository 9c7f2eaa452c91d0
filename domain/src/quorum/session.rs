//! Vote session state machine

use super::consensus::{ConsensusOutcome, TallyReport};
use super::integrity::IntegrityCheck;
use super::rule::{QuorumRule, min_required_voters};
use super::vote::{Ballot, VoteBreakdown, VoteChoice};
use crate::core::ids::{DecisionId, VoterId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors of the consensus engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("decision already exists: {0}")]
    DuplicateDecision(DecisionId),

    #[error(
        "insufficient voters: {provided} provided, {required} required to tolerate {max_faulty} faulty"
    )]
    InsufficientVoters {
        provided: usize,
        required: usize,
        max_faulty: usize,
    },

    #[error("unknown decision: {0}")]
    UnknownDecision(DecisionId),

    #[error("voter {voter_id} is not a required voter of {decision_id}")]
    UnauthorizedVoter {
        decision_id: DecisionId,
        voter_id: VoterId,
    },

    #[error("decision {0} is already finalized")]
    DecisionAlreadyFinalized(DecisionId),

    #[error("quorum rule {rule} gives threshold {threshold} of {voters} voters; approve and reject could both reach it")]
    AmbiguousQuorum {
        rule: QuorumRule,
        threshold: usize,
        voters: usize,
    },

    #[error("insufficient votes on {decision_id}: {cast} cast, quorum is {required}")]
    InsufficientVotes {
        decision_id: DecisionId,
        cast: usize,
        required: usize,
    },
}

impl ConsensusError {
    /// Vote after finalization breaks the one-way state machine.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ConsensusError::DecisionAlreadyFinalized(_))
    }

    /// No consensus error is transient: retrying the same call fails the same way.
    pub fn is_transient(&self) -> bool {
        false
    }

    /// Outcome a caller reports when it gives up on a decision after this error.
    pub fn as_outcome(&self) -> Option<ConsensusOutcome> {
        match self {
            ConsensusError::InsufficientVotes { .. } => Some(ConsensusOutcome::Insufficient),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Finalized,
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionStatus::Pending => write!(f, "pending"),
            DecisionStatus::Finalized => write!(f, "finalized"),
        }
    }
}

/// Acknowledgement of an accepted ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastReceipt {
    pub decision_id: DecisionId,
    pub voter_id: VoterId,
    pub choice: VoteChoice,
    /// Choice this ballot overwrote, if the voter had already voted.
    pub replaced: Option<VoteChoice>,
    pub votes_cast: usize,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub decision_id: DecisionId,
    pub description: String,
    pub status: DecisionStatus,
    pub required_voters: Vec<VoterId>,
    pub quorum_threshold: usize,
    pub votes_cast: usize,
    pub outcome: Option<ConsensusOutcome>,
}

/// One decision: required voters, ballots and (once tallied) the outcome.
#[derive(Debug, Clone)]
pub struct VoteSession {
    decision_id: DecisionId,
    description: String,
    required_voters: BTreeSet<VoterId>,
    quorum_threshold: usize,
    votes: BTreeMap<VoterId, Ballot>,
    history: Vec<(VoterId, Ballot)>,
    report: Option<TallyReport>,
}

impl VoteSession {
    /// Open a pending session.
    ///
    /// Duplicate voter ids collapse into one; the deduplicated set must hold at
    /// least `3 * max_faulty + 1` voters. Rules whose threshold is at most half
    /// the voters are rejected.
    pub fn new(
        decision_id: DecisionId,
        description: impl Into<String>,
        required_voters: impl IntoIterator<Item = VoterId>,
        max_faulty: usize,
        rule: QuorumRule,
    ) -> Result<Self, ConsensusError> {
        let required_voters: BTreeSet<VoterId> = required_voters.into_iter().collect();
        let required = min_required_voters(max_faulty);
        if required_voters.len() < required {
            return Err(ConsensusError::InsufficientVoters {
                provided: required_voters.len(),
                required,
                max_faulty,
            });
        }

        if !rule.is_exclusive_for(required_voters.len()) {
            return Err(ConsensusError::AmbiguousQuorum {
                rule,
                threshold: rule.threshold(required_voters.len()),
                voters: required_voters.len(),
            });
        }

        let quorum_threshold = rule.threshold(required_voters.len());
        Ok(Self {
            decision_id,
            description: description.into(),
            required_voters,
            quorum_threshold,
            votes: BTreeMap::new(),
            history: Vec::new(),
            report: None,
        })
    }

    pub fn decision_id(&self) -> &DecisionId {
        &self.decision_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quorum_threshold(&self) -> usize {
        self.quorum_threshold
    }

    pub fn required_voters(&self) -> &BTreeSet<VoterId> {
        &self.required_voters
    }

    pub fn votes_cast(&self) -> usize {
        self.votes.len()
    }

    pub fn ballot(&self, voter_id: &VoterId) -> Option<&Ballot> {
        self.votes.get(voter_id)
    }

    pub fn status(&self) -> DecisionStatus {
        if self.report.is_some() {
            DecisionStatus::Finalized
        } else {
            DecisionStatus::Pending
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.report.is_some()
    }

    pub fn report(&self) -> Option<&TallyReport> {
        self.report.as_ref()
    }

    /// Record a ballot. A second ballot from the same voter overwrites the first.
    pub fn cast(
        &mut self,
        voter_id: VoterId,
        choice: VoteChoice,
        justification: impl Into<String>,
    ) -> Result<CastReceipt, ConsensusError> {
        if self.is_finalized() {
            return Err(ConsensusError::DecisionAlreadyFinalized(
                self.decision_id.clone(),
            ));
        }
        if !self.required_voters.contains(&voter_id) {
            return Err(ConsensusError::UnauthorizedVoter {
                decision_id: self.decision_id.clone(),
                voter_id,
            });
        }

        let ballot = Ballot::new(choice, justification);
        self.history.push((voter_id.clone(), ballot.clone()));
        let replaced = self
            .votes
            .insert(voter_id.clone(), ballot)
            .map(|previous| previous.choice);

        Ok(CastReceipt {
            decision_id: self.decision_id.clone(),
            voter_id,
            choice,
            replaced,
            votes_cast: self.votes.len(),
        })
    }

    /// Finalize the decision.
    ///
    /// Tallying a finalized session returns the stored report unchanged. With
    /// fewer ballots than the quorum threshold the session stays pending and
    /// `InsufficientVotes` is returned.
    pub fn tally(&mut self, integrity: &dyn IntegrityCheck) -> Result<TallyReport, ConsensusError> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }

        let votes_cast = self.votes.len();
        if votes_cast < self.quorum_threshold {
            return Err(ConsensusError::InsufficientVotes {
                decision_id: self.decision_id.clone(),
                cast: votes_cast,
                required: self.quorum_threshold,
            });
        }

        let breakdown = VoteBreakdown::from_ballots(&self.votes);
        let violations = integrity.inspect(&self.history);
        let outcome = if !violations.is_empty() {
            ConsensusOutcome::ByzantineDetected
        } else if breakdown.approve >= self.quorum_threshold {
            ConsensusOutcome::ConsensusReached
        } else if breakdown.reject >= self.quorum_threshold {
            ConsensusOutcome::ConsensusFailed
        } else {
            ConsensusOutcome::Split
        };

        let report = TallyReport {
            decision_id: self.decision_id.clone(),
            outcome,
            breakdown,
            votes_cast,
            required_voters: self.required_voters.len(),
            quorum_threshold: self.quorum_threshold,
            consensus_percentage: breakdown.approval_percentage(),
            violations,
            tallied_at: Utc::now(),
        };
        self.report = Some(report.clone());
        Ok(report)
    }

    pub fn snapshot(&self) -> DecisionSnapshot {
        DecisionSnapshot {
            decision_id: self.decision_id.clone(),
            description: self.description.clone(),
            status: self.status(),
            required_voters: self.required_voters.iter().cloned().collect(),
            quorum_threshold: self.quorum_threshold,
            votes_cast: self.votes.len(),
            outcome: self.report.as_ref().map(|r| r.outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::integrity::{ContradictoryRevoteCheck, PermissiveIntegrity};

    fn voters(ids: &[&str]) -> Vec<VoterId> {
        ids.iter().map(|id| VoterId::new(*id)).collect()
    }

    fn session() -> VoteSession {
        VoteSession::new(
            DecisionId::new("d1"),
            "Adopt Milvus",
            voters(&["a", "b", "c", "d"]),
            1,
            QuorumRule::SuperMajority,
        )
        .unwrap()
    }

    fn cast_all(session: &mut VoteSession, ballots: &[(&str, VoteChoice)]) {
        for (voter, choice) in ballots {
            session.cast(VoterId::new(*voter), *choice, "").unwrap();
        }
    }

    #[test]
    fn test_quorum_threshold_for_four_voters() {
        let session = session();
        assert_eq!(session.quorum_threshold(), 3);
        assert_eq!(session.status(), DecisionStatus::Pending);
    }

    #[test]
    fn test_consensus_reached() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Approve),
                ("d", VoteChoice::Reject),
            ],
        );
        let report = session.tally(&PermissiveIntegrity).unwrap();
        assert_eq!(report.outcome, ConsensusOutcome::ConsensusReached);
        assert_eq!(report.votes_cast, 4);
        assert_eq!(report.consensus_percentage, 75.0);
        assert!(session.is_finalized());
    }

    #[test]
    fn test_consensus_failed() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Reject),
                ("c", VoteChoice::Reject),
                ("d", VoteChoice::Reject),
            ],
        );
        let report = session.tally(&PermissiveIntegrity).unwrap();
        assert_eq!(report.outcome, ConsensusOutcome::ConsensusFailed);
    }

    #[test]
    fn test_split_when_quorum_participates_without_threshold() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Abstain),
            ],
        );
        let report = session.tally(&PermissiveIntegrity).unwrap();
        assert_eq!(report.outcome, ConsensusOutcome::Split);
        assert_eq!(report.breakdown.abstain, 1);
    }

    #[test]
    fn test_insufficient_votes_keeps_session_pending() {
        let mut session = session();
        cast_all(
            &mut session,
            &[("a", VoteChoice::Approve), ("b", VoteChoice::Approve)],
        );
        let err = session.tally(&PermissiveIntegrity).unwrap_err();
        assert_eq!(
            err,
            ConsensusError::InsufficientVotes {
                decision_id: DecisionId::new("d1"),
                cast: 2,
                required: 3,
            }
        );
        assert_eq!(err.as_outcome(), Some(ConsensusOutcome::Insufficient));
        assert_eq!(session.status(), DecisionStatus::Pending);

        // Still accepts ballots and can finalize later
        cast_all(&mut session, &[("c", VoteChoice::Approve)]);
        assert!(session.tally(&PermissiveIntegrity).unwrap().is_reached());
    }

    #[test]
    fn test_revote_overwrites() {
        let mut session = session();
        session.cast(VoterId::new("a"), VoteChoice::Reject, "first").unwrap();
        let receipt = session
            .cast(VoterId::new("a"), VoteChoice::Approve, "changed mind")
            .unwrap();
        assert_eq!(receipt.replaced, Some(VoteChoice::Reject));
        assert_eq!(receipt.votes_cast, 1);

        cast_all(
            &mut session,
            &[("b", VoteChoice::Approve), ("c", VoteChoice::Approve)],
        );
        let report = session.tally(&PermissiveIntegrity).unwrap();
        assert_eq!(report.breakdown.approve, 3);
        assert_eq!(report.breakdown.reject, 0);
        assert_eq!(report.outcome, ConsensusOutcome::ConsensusReached);
    }

    #[test]
    fn test_vote_after_finalize_fails() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Approve),
            ],
        );
        session.tally(&PermissiveIntegrity).unwrap();

        let err = session
            .cast(VoterId::new("d"), VoteChoice::Reject, "late")
            .unwrap_err();
        assert_eq!(
            err,
            ConsensusError::DecisionAlreadyFinalized(DecisionId::new("d1"))
        );
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_tally_after_finalize_returns_stored_report() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Approve),
            ],
        );
        let first = session.tally(&PermissiveIntegrity).unwrap();
        let second = session.tally(&ContradictoryRevoteCheck).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unauthorized_voter() {
        let mut session = session();
        let err = session
            .cast(VoterId::new("mallory"), VoteChoice::Approve, "")
            .unwrap_err();
        assert!(matches!(err, ConsensusError::UnauthorizedVoter { .. }));
        assert_eq!(session.votes_cast(), 0);
    }

    #[test]
    fn test_insufficient_voters() {
        let err = VoteSession::new(
            DecisionId::new("d2"),
            "too few",
            voters(&["a", "b", "c"]),
            1,
            QuorumRule::SuperMajority,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConsensusError::InsufficientVoters {
                provided: 3,
                required: 4,
                max_faulty: 1,
            }
        );
    }

    #[test]
    fn test_half_threshold_rule_rejected() {
        let err = VoteSession::new(
            DecisionId::new("d4"),
            "half",
            voters(&["a", "b", "c", "d"]),
            1,
            QuorumRule::Percentage(50),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConsensusError::AmbiguousQuorum {
                rule: QuorumRule::Percentage(50),
                threshold: 2,
                voters: 4,
            }
        );
    }

    #[test]
    fn test_zero_percent_rule_never_passes_without_ballots() {
        // threshold floors at 1, and 1 of 4 cannot be exclusive
        let err = VoteSession::new(
            DecisionId::new("d5"),
            "zero",
            voters(&["a", "b", "c", "d"]),
            1,
            QuorumRule::Percentage(0),
        )
        .unwrap_err();
        assert!(matches!(err, ConsensusError::AmbiguousQuorum { threshold: 1, .. }));

        // a single voter with f = 0 still needs its ballot
        let mut solo = VoteSession::new(
            DecisionId::new("d6"),
            "solo",
            voters(&["a"]),
            0,
            QuorumRule::Percentage(0),
        )
        .unwrap();
        assert!(matches!(
            solo.tally(&PermissiveIntegrity),
            Err(ConsensusError::InsufficientVotes { cast: 0, required: 1, .. })
        ));
    }

    #[test]
    fn test_majority_rule_decides_even_split_only_by_threshold() {
        let mut session = VoteSession::new(
            DecisionId::new("d7"),
            "majority",
            voters(&["a", "b", "c", "d"]),
            1,
            QuorumRule::Majority,
        )
        .unwrap();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Reject),
                ("d", VoteChoice::Reject),
            ],
        );
        assert_eq!(
            session.tally(&PermissiveIntegrity).unwrap().outcome,
            ConsensusOutcome::Split
        );
    }

    #[test]
    fn test_duplicate_voter_ids_collapse() {
        let err = VoteSession::new(
            DecisionId::new("d3"),
            "dupes",
            voters(&["a", "a", "b", "c"]),
            1,
            QuorumRule::SuperMajority,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConsensusError::InsufficientVoters { provided: 3, .. }
        ));
    }

    #[test]
    fn test_byzantine_detected_with_integrity_check() {
        let mut session = session();
        cast_all(
            &mut session,
            &[
                ("a", VoteChoice::Reject),
                ("a", VoteChoice::Approve),
                ("b", VoteChoice::Approve),
                ("c", VoteChoice::Approve),
            ],
        );
        let report = session.tally(&ContradictoryRevoteCheck).unwrap();
        assert_eq!(report.outcome, ConsensusOutcome::ByzantineDetected);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].voter_id, VoterId::new("a"));
    }

    #[test]
    fn test_snapshot() {
        let mut session = session();
        cast_all(&mut session, &[("a", VoteChoice::Approve)]);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, DecisionStatus::Pending);
        assert_eq!(snapshot.votes_cast, 1);
        assert_eq!(snapshot.required_voters.len(), 4);
        assert_eq!(snapshot.outcome, None);
    }
}
