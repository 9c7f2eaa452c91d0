//! Process Objective use case
//!
//! Runs one objective through the whole pipeline: decompose, execute every
//! sub-goal on the worker pool, synthesize, grade and (optionally) finalize
//! through the consensus engine.

use crate::config::ExecutionParams;
use crate::ports::event_logger::{EventLogger, NoEventLogger, PipelineEvent};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::voter_panel::{QualityVoterPanel, VoterPanel};
use crate::use_cases::consensus_engine::ConsensusEngine;
use crate::use_cases::memory_layer::{MemoryLayer, MemoryStatus};
use crate::use_cases::orchestrator::{Orchestrator, OrchestratorError};
use crate::use_cases::shared::lock;
use crate::use_cases::supervisor::{Supervisor, SupervisorError};
use crate::use_cases::worker_pool::{ExecutionRequest, WorkerPool};
use brain_domain::{
    ConsensusOutcome, DecisionId, Decomposition, Document, Objective, ObjectiveId,
    PipelineStage, PromptTemplate, QualityReport, SynthesisResult, TallyReport, Task, TaskId,
    VoterId, WorkerResult, WorkerRole, util::truncate_str,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that abort a pipeline run
///
/// Everything after task assignment degrades into the report instead.
#[derive(Error, Debug)]
pub enum ProcessObjectiveError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl ProcessObjectiveError {
    pub fn is_transient(&self) -> bool {
        match self {
            ProcessObjectiveError::Orchestrator(e) => e.is_transient(),
        }
    }
}

/// Input for the ProcessObjective use case
#[derive(Debug, Clone)]
pub struct ProcessObjectiveInput {
    pub objective: Objective,
    /// Overrides [`ExecutionParams::require_consensus`] for this run.
    pub require_consensus: Option<bool>,
    /// Voters for the finalization vote. Defaults to every worker agent.
    pub voters: Option<Vec<VoterId>>,
}

impl ProcessObjectiveInput {
    pub fn new(objective: impl Into<String>) -> Self {
        Self::from_objective(Objective::new(objective))
    }

    pub fn from_objective(objective: Objective) -> Self {
        Self {
            objective,
            require_consensus: None,
            voters: None,
        }
    }

    pub fn with_consensus(mut self, require: bool) -> Self {
        self.require_consensus = Some(require);
        self
    }

    pub fn with_voters(mut self, voters: Vec<VoterId>) -> Self {
        self.voters = Some(voters);
        self
    }
}

/// Final state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    CompletedWithoutConsensus,
    CompletedWithConsensus,
    ConsensusFailed,
    QualityFailed,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStatus::CompletedWithoutConsensus => "completed_without_consensus",
            PipelineStatus::CompletedWithConsensus => "completed_with_consensus",
            PipelineStatus::ConsensusFailed => "consensus_failed",
            PipelineStatus::QualityFailed => "quality_failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            PipelineStatus::CompletedWithoutConsensus | PipelineStatus::CompletedWithConsensus
        )
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sub-goal that produced no result.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub task_id: TaskId,
    pub role: WorkerRole,
    pub sub_goal_index: usize,
    pub error: String,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub objective: Objective,
    pub decomposition: Decomposition,
    /// Successful worker results in sub-goal order.
    pub results: Vec<WorkerResult>,
    pub failures: Vec<TaskFailure>,
    pub synthesis: SynthesisResult,
    pub quality: QualityReport,
    pub consensus: Option<TallyReport>,
    pub consensus_outcome: Option<ConsensusOutcome>,
    pub consensus_error: Option<String>,
    pub status: PipelineStatus,
    pub completed_at: DateTime<Utc>,
}

/// One line of the execution history.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub objective_id: ObjectiveId,
    pub objective: String,
    pub status: PipelineStatus,
    pub tasks: usize,
    pub failures: usize,
    pub flagged: usize,
    pub completed_at: DateTime<Utc>,
}

impl From<&PipelineReport> for ExecutionRecord {
    fn from(report: &PipelineReport) -> Self {
        Self {
            objective_id: report.objective.id.clone(),
            objective: truncate_str(&report.objective.content, 80).to_string(),
            status: report.status,
            tasks: report.decomposition.len(),
            failures: report.failures.len(),
            flagged: report.synthesis.flagged_count(),
            completed_at: report.completed_at,
        }
    }
}

/// Aggregated counters across the services
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub active_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub total_tasks: usize,
    pub workers: usize,
    pub available_workers: usize,
    pub memory: MemoryStatus,
    pub pending_decisions: usize,
    pub finalized_decisions: usize,
    pub syntheses: usize,
    pub executions: usize,
}

type TaskOutcome = Result<WorkerResult, TaskFailure>;

/// Use case for running one objective end to end
pub struct ProcessObjectiveUseCase {
    orchestrator: Arc<Orchestrator>,
    pool: Arc<WorkerPool>,
    memory: Arc<MemoryLayer>,
    supervisor: Arc<Supervisor>,
    consensus: Arc<ConsensusEngine>,
    panel: Arc<dyn VoterPanel>,
    logger: Arc<dyn EventLogger>,
    params: ExecutionParams,
    history: Mutex<VecDeque<ExecutionRecord>>,
}

impl ProcessObjectiveUseCase {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        pool: Arc<WorkerPool>,
        memory: Arc<MemoryLayer>,
        supervisor: Arc<Supervisor>,
        consensus: Arc<ConsensusEngine>,
    ) -> Self {
        Self {
            orchestrator,
            pool,
            memory,
            supervisor,
            consensus,
            panel: Arc::new(QualityVoterPanel),
            logger: Arc::new(NoEventLogger),
            params: ExecutionParams::default(),
            history: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_voter_panel(mut self, panel: Arc<dyn VoterPanel>) -> Self {
        self.panel = panel;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ProcessObjectiveInput,
    ) -> Result<PipelineReport, ProcessObjectiveError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ProcessObjectiveInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineReport, ProcessObjectiveError> {
        let objective = input.objective.clone();
        info!(
            "Processing objective {}: {}",
            objective.id,
            truncate_str(&objective.content, 80)
        );
        self.logger.log(PipelineEvent::new(
            "objective_received",
            json!({
                "objective_id": objective.id,
                "objective": objective.content,
            }),
        ));

        // Stage 1: Decompose
        progress.on_stage_start(&PipelineStage::Decompose, 1);
        let decomposition = self.orchestrator.decompose(&objective).await?;
        progress.on_stage_complete(&PipelineStage::Decompose);
        self.remember_plan(&objective, &decomposition).await;

        // Stage 2: Execute
        let tasks = decomposition
            .sub_goals
            .iter()
            .map(|goal| {
                self.orchestrator
                    .assign_to_worker(&objective.id, goal.index, goal.role.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (results, failures) = self.phase_execute(&decomposition, tasks, progress).await;

        // Stage 3: Synthesize
        progress.on_stage_start(&PipelineStage::Synthesize, results.len());
        let synthesis = self
            .supervisor
            .synthesize_outputs(&objective.id, results.clone())
            .await;
        progress.on_stage_complete(&PipelineStage::Synthesize);

        // Stage 4: Validate
        progress.on_stage_start(&PipelineStage::Validate, 1);
        let quality = self
            .supervisor
            .validate_quality(&synthesis, self.supervisor.criteria());
        let synthesis = synthesis.with_quality(quality.clone());
        progress.on_stage_complete(&PipelineStage::Validate);

        // Stage 5: Consensus
        let require_consensus = input
            .require_consensus
            .unwrap_or(self.params.require_consensus);
        let gate = if require_consensus {
            let voters = input.voters.clone().unwrap_or_else(|| self.default_voters());
            progress.on_stage_start(&PipelineStage::Consensus, voters.len());
            let gate = self
                .finalize(&objective.id, &synthesis, &quality, &voters)
                .await;
            progress.on_stage_complete(&PipelineStage::Consensus);
            gate
        } else if quality.passed {
            ConsensusGate::skipped(PipelineStatus::CompletedWithoutConsensus)
        } else {
            ConsensusGate::skipped(PipelineStatus::QualityFailed)
        };

        if let Err(e) = self
            .memory
            .index(Document::new(synthesis.combined_output.clone()).with_tag("synthesis"))
            .await
        {
            debug!("Synthesis not indexed: {}", e);
        }

        let report = PipelineReport {
            objective,
            decomposition,
            results,
            failures,
            synthesis,
            quality,
            consensus: gate.report,
            consensus_outcome: gate.outcome,
            consensus_error: gate.error,
            status: gate.status,
            completed_at: Utc::now(),
        };
        self.record(&report);
        Ok(report)
    }

    /// Latest `limit` runs, oldest first.
    pub fn execution_history(&self, limit: usize) -> Vec<ExecutionRecord> {
        let history = lock(&self.history);
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            active_tasks: self.orchestrator.active_tasks(),
            completed_tasks: self.orchestrator.completed_tasks(),
            failed_tasks: self.orchestrator.failed_tasks(),
            total_tasks: self.orchestrator.total_tasks(),
            workers: self.pool.len(),
            available_workers: self.pool.available_count(),
            memory: self.memory.status(),
            pending_decisions: self.consensus.pending_count(),
            finalized_decisions: self.consensus.finalized_count(),
            syntheses: self.supervisor.synthesis_count(),
            executions: lock(&self.history).len(),
        }
    }

    async fn remember_plan(&self, objective: &Objective, decomposition: &Decomposition) {
        match serde_json::to_value(decomposition) {
            Ok(plan) => {
                if let Err(e) = self
                    .memory
                    .session_put(&format!("plan:{}", objective.id), plan)
                    .await
                {
                    warn!("Plan for {} not stored: {}", objective.id, e);
                }
            }
            Err(e) => warn!("Plan for {} not serializable: {}", objective.id, e),
        }

        if let Err(e) = self
            .memory
            .index(Document::new(objective.content.clone()).with_tag("objective"))
            .await
        {
            warn!("Objective {} not indexed: {}", objective.id, e);
        }
    }

    /// Run every task. Distinct roles run concurrently; tasks of the same
    /// role run one after another in sub-goal order.
    async fn phase_execute(
        &self,
        decomposition: &Decomposition,
        tasks: Vec<Task>,
        progress: &dyn ProgressNotifier,
    ) -> (Vec<WorkerResult>, Vec<TaskFailure>) {
        info!("Executing {} tasks", tasks.len());
        progress.on_stage_start(&PipelineStage::Execute, tasks.len());

        let mut groups: Vec<(WorkerRole, Vec<(Task, String)>)> = Vec::new();
        for task in tasks {
            let instruction = PromptTemplate::instruction(decomposition, task.sub_goal_index())
                .unwrap_or_else(|| decomposition.objective.clone());
            match groups.iter_mut().find(|(role, _)| role == task.role()) {
                Some((_, group)) => group.push((task, instruction)),
                None => groups.push((task.role().clone(), vec![(task, instruction)])),
            }
        }

        let mut join_set = JoinSet::new();
        for (role, group) in groups {
            let pool = Arc::clone(&self.pool);
            let orchestrator = Arc::clone(&self.orchestrator);
            join_set.spawn(async move {
                let mut outcomes = Vec::with_capacity(group.len());
                for (task, instruction) in group {
                    outcomes.push(Self::run_task(&pool, &orchestrator, &role, task, instruction).await);
                }
                outcomes
            });
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome {
                            Ok(result) => {
                                progress.on_task_complete(&PipelineStage::Execute, &result.role, true);
                                results.push(result);
                            }
                            Err(failure) => {
                                progress.on_task_complete(
                                    &PipelineStage::Execute,
                                    &failure.role,
                                    false,
                                );
                                failures.push(failure);
                            }
                        }
                    }
                }
                Err(e) => warn!("Worker group aborted: {}", e),
            }
        }
        progress.on_stage_complete(&PipelineStage::Execute);

        results.sort_by_key(|r| r.sub_goal_index);
        failures.sort_by_key(|f| f.sub_goal_index);
        (results, failures)
    }

    async fn run_task(
        pool: &WorkerPool,
        orchestrator: &Orchestrator,
        role: &WorkerRole,
        task: Task,
        instruction: String,
    ) -> TaskOutcome {
        let failure = |error: String| TaskFailure {
            task_id: task.id().clone(),
            role: role.clone(),
            sub_goal_index: task.sub_goal_index(),
            error,
        };

        let agent = match pool.any_worker(role) {
            Ok(agent) => agent,
            Err(e) => {
                warn!("Task {} not executed: {}", task.id(), e);
                if let Err(e) = orchestrator.mark_failed(task.id()) {
                    warn!("{}", e);
                }
                return Err(failure(e.to_string()));
            }
        };

        if let Err(e) = orchestrator.mark_in_progress(task.id()) {
            warn!("{}", e);
        }
        match pool
            .execute_task(agent.id(), ExecutionRequest::for_task(&task, instruction))
            .await
        {
            Ok(result) => {
                if let Err(e) = orchestrator.mark_complete(task.id()) {
                    warn!("{}", e);
                }
                Ok(result)
            }
            Err(e) => {
                if let Err(e) = orchestrator.mark_failed(task.id()) {
                    warn!("{}", e);
                }
                Err(failure(e.to_string()))
            }
        }
    }

    fn default_voters(&self) -> Vec<VoterId> {
        self.pool
            .agents()
            .iter()
            .map(|agent| VoterId::from(agent.id()))
            .collect()
    }

    async fn finalize(
        &self,
        objective_id: &ObjectiveId,
        synthesis: &SynthesisResult,
        quality: &QualityReport,
        voters: &[VoterId],
    ) -> ConsensusGate {
        let decision_id = DecisionId::for_finalization(objective_id);
        match self
            .supervisor
            .finalize_with_consensus(decision_id, synthesis, quality, voters, self.panel.as_ref())
            .await
        {
            Ok(report) => {
                let status = if report.outcome.is_reached() {
                    PipelineStatus::CompletedWithConsensus
                } else {
                    PipelineStatus::ConsensusFailed
                };
                ConsensusGate {
                    status,
                    outcome: Some(report.outcome),
                    report: Some(report),
                    error: None,
                }
            }
            Err(SupervisorError::QualityGateFailed(_)) => {
                ConsensusGate::skipped(PipelineStatus::QualityFailed)
            }
            Err(SupervisorError::Consensus(e)) => {
                warn!("Consensus for {} failed: {}", objective_id, e);
                ConsensusGate {
                    status: PipelineStatus::ConsensusFailed,
                    outcome: e.as_outcome(),
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn record(&self, report: &PipelineReport) {
        info!(
            "Objective {} finished: {} ({} results, {} failures)",
            report.objective.id,
            report.status,
            report.results.len(),
            report.failures.len()
        );
        self.logger.log(PipelineEvent::new(
            "objective_completed",
            json!({
                "objective_id": report.objective.id,
                "status": report.status,
                "results": report.results.len(),
                "failures": report.failures.len(),
                "quality_passed": report.quality.passed,
            }),
        ));

        let mut history = lock(&self.history);
        history.push_back(ExecutionRecord::from(report));
        while history.len() > self.params.history_limit.max(1) {
            history.pop_front();
        }
    }
}

struct ConsensusGate {
    status: PipelineStatus,
    outcome: Option<ConsensusOutcome>,
    report: Option<TallyReport>,
    error: Option<String>,
}

impl ConsensusGate {
    fn skipped(status: PipelineStatus) -> Self {
        Self {
            status,
            outcome: None,
            report: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsensusSettings, MemorySettings, WorkerSettings};
    use crate::ports::reasoning_provider::{ProviderError, ReasoningProvider};
    use async_trait::async_trait;
    use brain_domain::{GroundingJudge, QualityCriteria, ReflectionTag, TaskStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const STANDARD_PLAN: &str = r#"[
        {"description": "Survey vector databases", "role": "Research"},
        {"description": "Compare query latency", "role": "Analysis"},
        {"description": "Estimate hosting cost", "role": "Finance"}
    ]"#;

    /// Answers the decomposition prompt with `plan` and every worker prompt
    /// with "{role} findings".
    struct PlanningProvider {
        plan: &'static str,
        worker_calls: AtomicUsize,
        fail_role: Option<&'static str>,
    }

    #[async_trait]
    impl ReasoningProvider for PlanningProvider {
        fn name(&self) -> &str {
            "planning"
        }

        async fn generate(&self, prompt: &str, _context: &str) -> Result<String, ProviderError> {
            if PromptTemplate::is_decomposition_prompt(prompt) {
                return Ok(self.plan.to_string());
            }
            self.worker_calls.fetch_add(1, Ordering::SeqCst);
            let role = PromptTemplate::extract_line(prompt, PromptTemplate::ROLE_PREFIX)
                .unwrap_or_default();
            if Some(role) == self.fail_role {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(format!("{} findings", role))
        }
    }

    struct AlwaysSupported;

    impl GroundingJudge for AlwaysSupported {
        fn judge(&self, _output: &str, _context: &str) -> ReflectionTag {
            ReflectionTag::Supported
        }
    }

    fn use_case(fail_role: Option<&'static str>, criteria: QualityCriteria) -> ProcessObjectiveUseCase {
        use_case_with_plan(STANDARD_PLAN, fail_role, criteria)
    }

    fn use_case_with_plan(
        plan: &'static str,
        fail_role: Option<&'static str>,
        criteria: QualityCriteria,
    ) -> ProcessObjectiveUseCase {
        let provider = Arc::new(PlanningProvider {
            plan,
            worker_calls: AtomicUsize::new(0),
            fail_role,
        });
        let memory = Arc::new(MemoryLayer::new(&MemorySettings::default()));
        let workers = WorkerSettings {
            task_timeout: Duration::from_secs(5),
            ..WorkerSettings::default()
        };
        let orchestrator = Arc::new(Orchestrator::new(
            provider.clone(),
            memory.clone(),
            workers.roles.clone(),
            workers.task_timeout,
        ));
        let pool = Arc::new(
            WorkerPool::new(&workers, provider, memory.clone())
                .with_judge(Arc::new(AlwaysSupported)),
        );
        let consensus = Arc::new(ConsensusEngine::new(&ConsensusSettings::default()));
        let supervisor = Arc::new(Supervisor::new(
            pool.clone(),
            memory.clone(),
            consensus.clone(),
            criteria,
        ));
        ProcessObjectiveUseCase::new(orchestrator, pool, memory, supervisor, consensus)
    }

    #[tokio::test]
    async fn test_pipeline_with_consensus() {
        let uc = use_case(None, QualityCriteria::default());
        let report = uc
            .execute(ProcessObjectiveInput::new("Choose a vector database"))
            .await
            .unwrap();

        assert_eq!(report.status, PipelineStatus::CompletedWithConsensus);
        assert_eq!(report.results.len(), 3);
        assert!(report.failures.is_empty());
        let indices: Vec<usize> = report.results.iter().map(|r| r.sub_goal_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(report.synthesis.combined_output.starts_with("[Research] Research findings"));

        let tally = report.consensus.unwrap();
        assert_eq!(tally.outcome, ConsensusOutcome::ConsensusReached);
        // four default roles, one agent each
        assert_eq!(tally.votes_cast, 4);

        let status = uc.status();
        assert_eq!(status.completed_tasks, 3);
        assert_eq!(status.active_tasks, 0);
        assert_eq!(status.finalized_decisions, 1);
        assert_eq!(status.executions, 1);
    }

    #[tokio::test]
    async fn test_unstaffed_role_hints_run_on_configured_roles() {
        let plan = r#"[
            {"description": "Survey vector databases", "role": "Research"},
            {"description": "Compare index layouts", "role": "Design"},
            {"description": "Build the ingestion job", "role": "Engineering"}
        ]"#;
        let uc = use_case_with_plan(plan, None, QualityCriteria::default());
        let report = uc
            .execute(ProcessObjectiveInput::new("Choose a vector database"))
            .await
            .unwrap();

        let roles: Vec<_> = report.decomposition.sub_goals.iter().map(|g| g.role.clone()).collect();
        assert_eq!(
            roles,
            vec![WorkerRole::Research, WorkerRole::Analysis, WorkerRole::Implementation]
        );
        assert!(report.failures.is_empty());
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.status, PipelineStatus::CompletedWithConsensus);
    }

    #[tokio::test]
    async fn test_pipeline_without_consensus() {
        let uc = use_case(None, QualityCriteria::default());
        let report = uc
            .execute(ProcessObjectiveInput::new("Choose a vector database").with_consensus(false))
            .await
            .unwrap();

        assert_eq!(report.status, PipelineStatus::CompletedWithoutConsensus);
        assert!(report.consensus.is_none());
        assert_eq!(uc.status().pending_decisions, 0);
        assert_eq!(uc.status().finalized_decisions, 0);
    }

    #[tokio::test]
    async fn test_failed_task_fails_quality_gate() {
        let uc = use_case(Some("Finance"), QualityCriteria::default());
        let report = uc
            .execute(ProcessObjectiveInput::new("Choose a vector database"))
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].role, WorkerRole::Finance);
        assert_eq!(report.status, PipelineStatus::QualityFailed);
        assert!(report.consensus.is_none());

        let failed = uc.orchestrator.get_task_status(&report.failures[0].task_id).unwrap();
        assert_eq!(failed, TaskStatus::Failed);
        assert_eq!(uc.status().finalized_decisions, 0);
    }

    #[tokio::test]
    async fn test_too_few_voters_fails_consensus() {
        let uc = use_case(None, QualityCriteria::default());
        let voters = vec![VoterId::new("a"), VoterId::new("b")];
        let report = uc
            .execute(ProcessObjectiveInput::new("Choose a vector database").with_voters(voters))
            .await
            .unwrap();

        assert_eq!(report.status, PipelineStatus::ConsensusFailed);
        assert!(report.consensus_error.is_some());
        assert!(report.consensus.is_none());
    }

    #[tokio::test]
    async fn test_empty_objective_is_rejected() {
        let uc = use_case(None, QualityCriteria::default());
        let err = uc.execute(ProcessObjectiveInput::new("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessObjectiveError::Orchestrator(OrchestratorError::EmptyObjective)
        ));
        assert!(uc.execution_history(10).is_empty());
    }

    #[tokio::test]
    async fn test_execution_history_is_bounded() {
        let uc = use_case(None, QualityCriteria::default())
            .with_params(ExecutionParams::default().with_history_limit(2));
        for n in 0..3 {
            uc.execute(
                ProcessObjectiveInput::new(format!("Objective number {}", n)).with_consensus(false),
            )
            .await
            .unwrap();
        }

        let history = uc.execution_history(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].objective, "Objective number 1");
        assert_eq!(uc.execution_history(1)[0].objective, "Objective number 2");
    }
}
