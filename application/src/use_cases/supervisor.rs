//! Supervisor
//!
//! Merges worker results, re-retrieves context once for every result tagged
//! `Unsupported`, grades the synthesis against the quality criteria and, when
//! asked, finalizes it through the consensus engine.

use crate::ports::event_logger::{EventLogger, NoEventLogger, PipelineEvent};
use crate::ports::voter_panel::VoterPanel;
use crate::use_cases::consensus_engine::ConsensusEngine;
use crate::use_cases::memory_layer::MemoryLayer;
use crate::use_cases::shared::lock;
use crate::use_cases::worker_pool::{ExecutionRequest, WorkerPool};
use brain_domain::{
    ConsensusError, DecisionId, GraphPattern, MemoryEntry, MemoryKind, ObjectiveId,
    PromptTemplate, QualityCriteria, QualityReport, SynthesisEntry, SynthesisResult, TallyReport,
    VoterId, WorkerResult,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors of the supervisor
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Quality gate failed: {}", .0.failure_summary())]
    QualityGateFailed(QualityReport),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

impl SupervisorError {
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            SupervisorError::Consensus(e) => e.is_invariant_violation(),
            SupervisorError::QualityGateFailed(_) => false,
        }
    }
}

pub struct Supervisor {
    pool: Arc<WorkerPool>,
    memory: Arc<MemoryLayer>,
    consensus: Arc<ConsensusEngine>,
    criteria: QualityCriteria,
    re_retrieval_hops: usize,
    context_window: usize,
    history: Mutex<Vec<SynthesisResult>>,
    logger: Arc<dyn EventLogger>,
}

impl Supervisor {
    pub fn new(
        pool: Arc<WorkerPool>,
        memory: Arc<MemoryLayer>,
        consensus: Arc<ConsensusEngine>,
        criteria: QualityCriteria,
    ) -> Self {
        Self {
            pool,
            memory,
            consensus,
            criteria,
            re_retrieval_hops: 2,
            context_window: 5,
            history: Mutex::new(Vec::new()),
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_re_retrieval_hops(mut self, hops: usize) -> Self {
        self.re_retrieval_hops = hops;
        self
    }

    pub fn with_context_window(mut self, entries: usize) -> Self {
        self.context_window = entries;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Configured quality criteria.
    pub fn criteria(&self) -> &QualityCriteria {
        &self.criteria
    }

    /// Merge `results` in the order given.
    ///
    /// Each `Unsupported` result gets exactly one re-retrieval from relational
    /// memory and one re-run on its originating agent. A result still
    /// unsupported afterwards (or whose re-run failed) is kept and flagged.
    pub async fn synthesize_outputs(
        &self,
        task_group_id: &ObjectiveId,
        results: Vec<WorkerResult>,
    ) -> SynthesisResult {
        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            let entry = if result.is_supported() {
                SynthesisEntry::accepted(result)
            } else {
                self.re_retrieve(result).await
            };
            entries.push(entry);
        }

        let synthesis = SynthesisResult::combine(task_group_id.clone(), entries);
        self.memory.append(
            MemoryEntry::new(MemoryKind::Synthesis, synthesis.combined_output.clone())
                .for_objective(task_group_id.clone()),
        );
        info!(
            "Synthesized {} results for {} ({} flagged)",
            synthesis.entries.len(),
            task_group_id,
            synthesis.flagged_count()
        );
        self.logger.log(PipelineEvent::new(
            "synthesis_created",
            json!({
                "task_group_id": task_group_id,
                "results": synthesis.entries.len(),
                "flagged": synthesis.flagged_count(),
                "re_retrieved": synthesis.re_retrieved_count(),
            }),
        ));

        lock(&self.history).push(synthesis.clone());
        synthesis
    }

    /// Grade `synthesis`. The report is also attached to the stored history
    /// entry for the same synthesis.
    pub fn validate_quality(
        &self,
        synthesis: &SynthesisResult,
        criteria: &QualityCriteria,
    ) -> QualityReport {
        let report = criteria.evaluate(synthesis);

        if let Some(stored) = lock(&self.history).iter_mut().rev().find(|s| {
            s.task_group_id == synthesis.task_group_id && s.created_at == synthesis.created_at
        }) {
            stored.quality = Some(report.clone());
        }

        if report.passed {
            info!("Quality gate passed for {}", synthesis.task_group_id);
        } else {
            warn!(
                "Quality gate failed for {}: {}",
                synthesis.task_group_id,
                report.failure_summary()
            );
        }
        self.logger.log(PipelineEvent::new(
            "quality_validated",
            json!({
                "task_group_id": synthesis.task_group_id,
                "passed": report.passed,
                "checks": report.checks,
            }),
        ));
        report
    }

    /// Put a validated synthesis to a vote.
    ///
    /// Fails fast with `QualityGateFailed` (no vote is opened) when the
    /// quality report did not pass. Otherwise the outcome of the consensus
    /// engine is returned as-is.
    pub async fn finalize_with_consensus(
        &self,
        decision_id: DecisionId,
        synthesis: &SynthesisResult,
        quality: &QualityReport,
        voters: &[VoterId],
        panel: &dyn VoterPanel,
    ) -> Result<TallyReport, SupervisorError> {
        if !quality.passed {
            return Err(SupervisorError::QualityGateFailed(quality.clone()));
        }

        self.consensus.initiate_vote(
            decision_id.clone(),
            format!("Finalize synthesis of {}", synthesis.task_group_id),
            voters.iter().cloned(),
        )?;

        for ballot in panel.collect(synthesis, voters).await {
            self.consensus.cast_vote(
                &decision_id,
                ballot.voter_id,
                ballot.choice,
                ballot.justification,
            )?;
        }

        Ok(self.consensus.tally_votes(&decision_id)?)
    }

    /// Past syntheses, optionally limited to one task group, oldest first.
    pub fn synthesis_history(&self, task_group_id: Option<&ObjectiveId>) -> Vec<SynthesisResult> {
        lock(&self.history)
            .iter()
            .filter(|s| task_group_id.is_none_or(|id| &s.task_group_id == id))
            .cloned()
            .collect()
    }

    pub fn synthesis_count(&self) -> usize {
        lock(&self.history).len()
    }

    async fn re_retrieve(&self, result: WorkerResult) -> SynthesisEntry {
        let pattern =
            GraphPattern::keyword(result.instruction.clone()).with_max_hops(self.re_retrieval_hops);
        let mut facts: Vec<String> = match self.memory.query(&pattern).await {
            Ok(matches) => matches.iter().map(|m| m.describe()).collect(),
            Err(e) => {
                debug!("Re-retrieval found no context: {}", e);
                Vec::new()
            }
        };
        facts.dedup();

        info!(
            "Re-retrieval for task {}: {} facts",
            result.task_id,
            facts.len()
        );
        self.logger.log(PipelineEvent::new(
            "re_retrieval",
            json!({
                "task_id": result.task_id,
                "agent_id": result.agent_id,
                "facts": facts.len(),
            }),
        ));

        let context = PromptTemplate::re_retrieval_context(
            &self.memory.render_recent(self.context_window),
            &facts,
        );
        match self
            .pool
            .execute_task(&result.agent_id, ExecutionRequest::retry(&result, context))
            .await
        {
            Ok(second) => SynthesisEntry::after_re_retrieval(second),
            Err(e) => {
                warn!("Re-run of task {} failed: {}", result.task_id, e);
                SynthesisEntry {
                    result,
                    flagged: true,
                    re_retrieved: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsensusSettings, MemorySettings, WorkerSettings};
    use crate::ports::memory_store::{GraphStore, StoreError};
    use crate::ports::reasoning_provider::{ProviderError, ReasoningProvider};
    use crate::ports::voter_panel::QualityVoterPanel;
    use async_trait::async_trait;
    use brain_domain::{
        AgentId, ConsensusOutcome, Entity, GraphMatch, GroundingJudge, ReflectionTag,
        Relationship, TaskId, TaskStatus, WorkerRole,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers with the first retrieved fact when there is one.
    struct FactProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReasoningProvider for FactProvider {
        fn name(&self) -> &str {
            "fact"
        }

        async fn generate(&self, _prompt: &str, context: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fact = PromptTemplate::retrieved_facts(context).first().copied();
            Ok(match fact {
                Some(fact) => format!("VERIFIED {}", fact),
                None => "guess".to_string(),
            })
        }
    }

    struct MarkerJudge;

    impl GroundingJudge for MarkerJudge {
        fn judge(&self, output: &str, _context: &str) -> ReflectionTag {
            if output.starts_with("VERIFIED") {
                ReflectionTag::Supported
            } else {
                ReflectionTag::Unsupported
            }
        }
    }

    /// Returns a fixed set of matches (or an outage) and counts queries.
    struct FixedGraph {
        matches: Option<Vec<GraphMatch>>,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl GraphStore for FixedGraph {
        async fn add_entity(&self, _entity: Entity) -> Result<(), StoreError> {
            Ok(())
        }

        async fn add_relationship(&self, _r: Relationship) -> Result<(), StoreError> {
            Ok(())
        }

        async fn query(&self, _p: &GraphPattern) -> Result<Vec<GraphMatch>, StoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.matches
                .clone()
                .ok_or_else(|| StoreError::Unavailable("graph offline".into()))
        }

        async fn find_path(
            &self,
            _from: &str,
            _to: &str,
            _max_hops: usize,
        ) -> Result<Option<Vec<Relationship>>, StoreError> {
            Ok(None)
        }
    }

    struct Fixture {
        supervisor: Supervisor,
        provider: Arc<FactProvider>,
        graph: Arc<FixedGraph>,
        consensus: Arc<ConsensusEngine>,
    }

    fn fixture(matches: Option<Vec<GraphMatch>>) -> Fixture {
        let provider = Arc::new(FactProvider {
            calls: AtomicUsize::new(0),
        });
        let graph = Arc::new(FixedGraph {
            matches,
            queries: AtomicUsize::new(0),
        });
        let memory = Arc::new(
            MemoryLayer::new(&MemorySettings::default()).with_graph_store(graph.clone()),
        );
        let pool = Arc::new(
            WorkerPool::new(
                &WorkerSettings {
                    task_timeout: Duration::from_secs(5),
                    ..WorkerSettings::default()
                },
                provider.clone(),
                memory.clone(),
            )
            .with_judge(Arc::new(MarkerJudge)),
        );
        let consensus = Arc::new(ConsensusEngine::new(&ConsensusSettings::default()));
        let supervisor = Supervisor::new(
            pool,
            memory,
            consensus.clone(),
            QualityCriteria {
                min_workers: 1,
                ..QualityCriteria::default()
            },
        );
        Fixture {
            supervisor,
            provider,
            graph,
            consensus,
        }
    }

    fn result(role: WorkerRole, output: &str, reflection: ReflectionTag) -> WorkerResult {
        WorkerResult {
            task_id: TaskId::generate(),
            agent_id: AgentId::new(format!("{}-1", role.as_str().to_lowercase())),
            role,
            sub_goal_index: 0,
            instruction: "compare milvus and qdrant".to_string(),
            output: output.to_string(),
            reflection,
            status: TaskStatus::Completed,
            attempt: 1,
        }
    }

    fn voters() -> Vec<VoterId> {
        ["a", "b", "c", "d"].iter().map(|v| VoterId::new(*v)).collect()
    }

    #[tokio::test]
    async fn test_supported_results_pass_through() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Research, "VERIFIED found it", ReflectionTag::Supported)],
            )
            .await;
        assert_eq!(synthesis.flagged_count(), 0);
        assert_eq!(synthesis.re_retrieved_count(), 0);
        assert_eq!(f.graph.queries.load(Ordering::SeqCst), 0);
        assert_eq!(f.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_result_recovers_after_re_retrieval() {
        let fact = GraphMatch {
            entity: Entity::new("milvus", "database").with_property("index", "hnsw"),
            path: vec![],
        };
        let f = fixture(Some(vec![fact]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Research, "guess", ReflectionTag::Unsupported)],
            )
            .await;

        let entry = &synthesis.entries[0];
        assert!(entry.re_retrieved);
        assert!(!entry.flagged);
        assert_eq!(entry.result.attempt, 2);
        assert_eq!(entry.result.output, "VERIFIED milvus database hnsw");
        assert_eq!(f.graph.queries.load(Ordering::SeqCst), 1);
        assert_eq!(f.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exactly_one_re_retrieval_when_still_unsupported() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Analysis, "guess", ReflectionTag::Unsupported)],
            )
            .await;

        assert_eq!(synthesis.flagged_count(), 1);
        assert_eq!(f.graph.queries.load(Ordering::SeqCst), 1);
        assert_eq!(f.provider.calls.load(Ordering::SeqCst), 1);
        assert!(synthesis.combined_output.ends_with("[unsupported]"));
    }

    #[tokio::test]
    async fn test_graph_outage_is_no_context() {
        let f = fixture(None);
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Research, "guess", ReflectionTag::Unsupported)],
            )
            .await;
        assert_eq!(synthesis.entries.len(), 1);
        assert!(synthesis.entries[0].flagged);
        assert_eq!(f.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesis_is_deterministic() {
        let f = fixture(Some(vec![]));
        let results = vec![
            result(WorkerRole::Research, "VERIFIED a", ReflectionTag::Supported),
            result(WorkerRole::Finance, "VERIFIED b", ReflectionTag::Supported),
        ];
        let first = f
            .supervisor
            .synthesize_outputs(&ObjectiveId::new("obj"), results.clone())
            .await;
        let second = f
            .supervisor
            .synthesize_outputs(&ObjectiveId::new("obj"), results)
            .await;
        assert_eq!(first.combined_output, second.combined_output);
        assert_eq!(f.supervisor.synthesis_history(None).len(), 2);
    }

    #[tokio::test]
    async fn test_validate_quality_updates_history() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj-q"),
                vec![result(WorkerRole::Research, "VERIFIED a", ReflectionTag::Supported)],
            )
            .await;
        let report = f
            .supervisor
            .validate_quality(&synthesis, f.supervisor.criteria());
        assert!(report.passed);
        assert!(report.checks.len() >= 3);

        let history = f
            .supervisor
            .synthesis_history(Some(&ObjectiveId::new("obj-q")));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].passed_quality(), Some(true));
        assert!(
            f.supervisor
                .synthesis_history(Some(&ObjectiveId::new("other")))
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_failed_quality_never_opens_vote() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(&ObjectiveId::new("obj"), vec![])
            .await;
        let report = f
            .supervisor
            .validate_quality(&synthesis, f.supervisor.criteria());
        assert!(!report.passed);

        let err = f
            .supervisor
            .finalize_with_consensus(
                DecisionId::new("final"),
                &synthesis,
                &report,
                &voters(),
                &QualityVoterPanel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SupervisorError::QualityGateFailed(_)));
        assert_eq!(f.consensus.decisions().len(), 0);
    }

    #[tokio::test]
    async fn test_finalize_with_consensus() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Research, "VERIFIED a", ReflectionTag::Supported)],
            )
            .await;
        let report = f
            .supervisor
            .validate_quality(&synthesis, f.supervisor.criteria());
        let synthesis = synthesis.with_quality(report.clone());

        let tally = f
            .supervisor
            .finalize_with_consensus(
                DecisionId::new("final"),
                &synthesis,
                &report,
                &voters(),
                &QualityVoterPanel,
            )
            .await
            .unwrap();
        assert_eq!(tally.outcome, ConsensusOutcome::ConsensusReached);
        assert_eq!(tally.votes_cast, 4);
    }

    #[tokio::test]
    async fn test_finalize_surfaces_consensus_errors() {
        let f = fixture(Some(vec![]));
        let synthesis = f
            .supervisor
            .synthesize_outputs(
                &ObjectiveId::new("obj"),
                vec![result(WorkerRole::Research, "VERIFIED a", ReflectionTag::Supported)],
            )
            .await;
        let report = f
            .supervisor
            .validate_quality(&synthesis, f.supervisor.criteria());

        let err = f
            .supervisor
            .finalize_with_consensus(
                DecisionId::new("final"),
                &synthesis,
                &report,
                &voters()[..3],
                &QualityVoterPanel,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SupervisorError::Consensus(ConsensusError::InsufficientVoters { .. })
        ));
    }
}
