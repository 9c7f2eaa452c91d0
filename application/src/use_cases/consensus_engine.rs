//! Consensus engine
//!
//! Registry of vote sessions. Each session sits behind its own mutex so that
//! ballots on one decision are applied one at a time while independent
//! decisions proceed without contention.

use crate::config::ConsensusSettings;
use crate::ports::event_logger::{EventLogger, NoEventLogger, PipelineEvent};
use crate::use_cases::shared::{lock, read, write};
use brain_domain::quorum::IntegrityCheck;
use brain_domain::{
    CastReceipt, ConsensusError, DecisionId, DecisionSnapshot, QuorumRule, TallyReport,
    VoteChoice, VoteSession, VoterId, min_required_voters,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{error, info};

pub struct ConsensusEngine {
    sessions: RwLock<HashMap<DecisionId, Arc<Mutex<VoteSession>>>>,
    max_faulty: usize,
    rule: QuorumRule,
    integrity: Box<dyn IntegrityCheck>,
    logger: Arc<dyn EventLogger>,
}

impl ConsensusEngine {
    pub fn new(settings: &ConsensusSettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_faulty: settings.max_faulty_voters,
            rule: settings.quorum_rule,
            integrity: settings.integrity.into_check(),
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_integrity_check(mut self, check: Box<dyn IntegrityCheck>) -> Self {
        self.integrity = check;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Required voters for the configured number of tolerated faults.
    pub fn min_required_voters(&self) -> usize {
        min_required_voters(self.max_faulty)
    }

    pub fn max_faulty_voters(&self) -> usize {
        self.max_faulty
    }

    /// Open a new pending decision.
    pub fn initiate_vote(
        &self,
        decision_id: DecisionId,
        description: impl Into<String>,
        required_voters: impl IntoIterator<Item = VoterId>,
    ) -> Result<DecisionSnapshot, ConsensusError> {
        let mut sessions = write(&self.sessions);
        if sessions.contains_key(&decision_id) {
            return Err(ConsensusError::DuplicateDecision(decision_id));
        }

        let session = VoteSession::new(
            decision_id.clone(),
            description,
            required_voters,
            self.max_faulty,
            self.rule,
        )?;
        let snapshot = session.snapshot();
        sessions.insert(decision_id.clone(), Arc::new(Mutex::new(session)));
        drop(sessions);

        info!(
            "Vote {} initiated: {} voters, quorum {}",
            decision_id,
            snapshot.required_voters.len(),
            snapshot.quorum_threshold
        );
        self.logger.log(PipelineEvent::new(
            "vote_initiated",
            json!({
                "decision_id": decision_id,
                "description": snapshot.description,
                "required_voters": snapshot.required_voters,
                "quorum_threshold": snapshot.quorum_threshold,
            }),
        ));
        Ok(snapshot)
    }

    /// Record a ballot. Re-voting before the tally overwrites.
    pub fn cast_vote(
        &self,
        decision_id: &DecisionId,
        voter_id: VoterId,
        choice: VoteChoice,
        justification: impl Into<String>,
    ) -> Result<CastReceipt, ConsensusError> {
        let session = self.session(decision_id)?;
        let receipt = lock(&session)
            .cast(voter_id, choice, justification)
            .inspect_err(|e| {
                if e.is_invariant_violation() {
                    error!("Rejected ballot on {}: {}", decision_id, e);
                }
            })?;

        self.logger.log(PipelineEvent::new(
            "vote_cast",
            json!({
                "decision_id": decision_id,
                "voter_id": receipt.voter_id,
                "choice": receipt.choice,
                "replaced": receipt.replaced,
            }),
        ));
        Ok(receipt)
    }

    /// Finalize a decision, or return its stored report if already finalized.
    pub fn tally_votes(&self, decision_id: &DecisionId) -> Result<TallyReport, ConsensusError> {
        let session = self.session(decision_id)?;
        let mut session = lock(&session);
        let already_final = session.is_finalized();
        let report = session.tally(self.integrity.as_ref())?;
        drop(session);

        if !already_final {
            info!("Vote {} tallied: {}", decision_id, report.summary());
            self.logger.log(PipelineEvent::new(
                "consensus_tallied",
                json!({
                    "decision_id": decision_id,
                    "outcome": report.outcome,
                    "approve": report.breakdown.approve,
                    "reject": report.breakdown.reject,
                    "abstain": report.breakdown.abstain,
                    "quorum_threshold": report.quorum_threshold,
                    "consensus_percentage": report.consensus_percentage,
                }),
            ));
        }
        Ok(report)
    }

    pub fn get_decision_status(
        &self,
        decision_id: &DecisionId,
    ) -> Result<DecisionSnapshot, ConsensusError> {
        let session = self.session(decision_id)?;
        let snapshot = lock(&session).snapshot();
        Ok(snapshot)
    }

    pub fn pending_count(&self) -> usize {
        self.count(|s| !s.is_finalized())
    }

    pub fn finalized_count(&self) -> usize {
        self.count(VoteSession::is_finalized)
    }

    /// Snapshots of every decision, ordered by id.
    pub fn decisions(&self) -> Vec<DecisionSnapshot> {
        let sessions: Vec<_> = read(&self.sessions).values().cloned().collect();
        let mut snapshots: Vec<_> = sessions.iter().map(|s| lock(s).snapshot()).collect();
        snapshots.sort_by(|a, b| a.decision_id.cmp(&b.decision_id));
        snapshots
    }

    fn count(&self, predicate: impl Fn(&VoteSession) -> bool) -> usize {
        let sessions: Vec<_> = read(&self.sessions).values().cloned().collect();
        sessions.iter().filter(|s| predicate(&lock(s))).count()
    }

    fn session(&self, decision_id: &DecisionId) -> Result<Arc<Mutex<VoteSession>>, ConsensusError> {
        read(&self.sessions)
            .get(decision_id)
            .cloned()
            .ok_or_else(|| ConsensusError::UnknownDecision(decision_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_domain::{ConsensusOutcome, DecisionStatus, IntegrityPolicy};

    fn engine() -> ConsensusEngine {
        ConsensusEngine::new(&ConsensusSettings::default())
    }

    fn voters(ids: &[&str]) -> Vec<VoterId> {
        ids.iter().map(|id| VoterId::new(*id)).collect()
    }

    fn vote(engine: &ConsensusEngine, id: &DecisionId, voter: &str, choice: VoteChoice) {
        engine
            .cast_vote(id, VoterId::new(voter), choice, "because")
            .unwrap();
    }

    #[test]
    fn test_full_vote_flow() {
        let engine = engine();
        let id = DecisionId::new("adopt-milvus");
        let snapshot = engine
            .initiate_vote(id.clone(), "Adopt Milvus", voters(&["a", "b", "c", "d"]))
            .unwrap();
        assert_eq!(snapshot.quorum_threshold, 3);
        assert_eq!(engine.pending_count(), 1);

        vote(&engine, &id, "a", VoteChoice::Approve);
        vote(&engine, &id, "b", VoteChoice::Approve);
        vote(&engine, &id, "c", VoteChoice::Approve);
        vote(&engine, &id, "d", VoteChoice::Reject);

        let report = engine.tally_votes(&id).unwrap();
        assert_eq!(report.outcome, ConsensusOutcome::ConsensusReached);
        assert_eq!(engine.finalized_count(), 1);
        assert_eq!(engine.pending_count(), 0);

        let status = engine.get_decision_status(&id).unwrap();
        assert_eq!(status.status, DecisionStatus::Finalized);
        assert_eq!(status.outcome, Some(ConsensusOutcome::ConsensusReached));
    }

    #[test]
    fn test_duplicate_decision() {
        let engine = engine();
        let id = DecisionId::new("d");
        engine
            .initiate_vote(id.clone(), "first", voters(&["a", "b", "c", "d"]))
            .unwrap();
        let err = engine
            .initiate_vote(id.clone(), "second", voters(&["a", "b", "c", "d"]))
            .unwrap_err();
        assert_eq!(err, ConsensusError::DuplicateDecision(id));
    }

    #[test]
    fn test_insufficient_voters_not_registered() {
        let engine = engine();
        let id = DecisionId::new("small");
        let err = engine
            .initiate_vote(id.clone(), "too small", voters(&["a", "b", "c"]))
            .unwrap_err();
        assert!(matches!(err, ConsensusError::InsufficientVoters { .. }));
        assert!(matches!(
            engine.get_decision_status(&id),
            Err(ConsensusError::UnknownDecision(_))
        ));
    }

    #[test]
    fn test_unknown_decision() {
        let engine = engine();
        let id = DecisionId::new("missing");
        assert_eq!(
            engine
                .cast_vote(&id, VoterId::new("a"), VoteChoice::Approve, "")
                .unwrap_err(),
            ConsensusError::UnknownDecision(id.clone())
        );
        assert!(engine.tally_votes(&id).is_err());
    }

    #[test]
    fn test_vote_after_finalize_rejected() {
        let engine = engine();
        let id = DecisionId::new("d");
        engine
            .initiate_vote(id.clone(), "x", voters(&["a", "b", "c", "d"]))
            .unwrap();
        for v in ["a", "b", "c"] {
            vote(&engine, &id, v, VoteChoice::Reject);
        }
        assert_eq!(
            engine.tally_votes(&id).unwrap().outcome,
            ConsensusOutcome::ConsensusFailed
        );
        let err = engine
            .cast_vote(&id, VoterId::new("d"), VoteChoice::Approve, "late")
            .unwrap_err();
        assert_eq!(err, ConsensusError::DecisionAlreadyFinalized(id.clone()));

        // re-tally returns the stored outcome
        assert_eq!(
            engine.tally_votes(&id).unwrap().outcome,
            ConsensusOutcome::ConsensusFailed
        );
    }

    #[test]
    fn test_configured_fault_tolerance() {
        let engine = ConsensusEngine::new(&ConsensusSettings {
            max_faulty_voters: 2,
            ..ConsensusSettings::default()
        });
        assert_eq!(engine.min_required_voters(), 7);
        let err = engine
            .initiate_vote(
                DecisionId::new("d"),
                "x",
                voters(&["a", "b", "c", "d", "e", "f"]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConsensusError::InsufficientVoters {
                provided: 6,
                required: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_configured_integrity_policy() {
        let engine = ConsensusEngine::new(&ConsensusSettings {
            integrity: IntegrityPolicy::ContradictoryRevote,
            ..ConsensusSettings::default()
        });
        let id = DecisionId::new("d");
        engine
            .initiate_vote(id.clone(), "x", voters(&["a", "b", "c", "d"]))
            .unwrap();
        vote(&engine, &id, "a", VoteChoice::Approve);
        vote(&engine, &id, "a", VoteChoice::Reject);
        vote(&engine, &id, "b", VoteChoice::Reject);
        vote(&engine, &id, "c", VoteChoice::Reject);
        assert_eq!(
            engine.tally_votes(&id).unwrap().outcome,
            ConsensusOutcome::ByzantineDetected
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_are_not_lost() {
        let engine = Arc::new(engine());
        let id = DecisionId::new("big");
        let all: Vec<VoterId> = (0..100).map(|i| VoterId::new(format!("v{}", i))).collect();
        engine.initiate_vote(id.clone(), "big vote", all.clone()).unwrap();

        let mut handles = Vec::new();
        for voter in all {
            let engine = Arc::clone(&engine);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                engine.cast_vote(&id, voter, VoteChoice::Approve, "yes")
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let report = engine.tally_votes(&id).unwrap();
        assert_eq!(report.votes_cast, 100);
        assert_eq!(report.breakdown.approve, 100);
        assert_eq!(report.outcome, ConsensusOutcome::ConsensusReached);
    }

    #[test]
    fn test_independent_decisions() {
        let engine = engine();
        for name in ["one", "two"] {
            engine
                .initiate_vote(DecisionId::new(name), name, voters(&["a", "b", "c", "d"]))
                .unwrap();
        }
        vote(&engine, &DecisionId::new("one"), "a", VoteChoice::Approve);
        let decisions = engine.decisions();
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].decision_id.as_str(), "one");
        assert_eq!(decisions[0].votes_cast, 1);
        assert_eq!(decisions[1].votes_cast, 0);
    }
}
