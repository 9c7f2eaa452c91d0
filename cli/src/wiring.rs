//! Dependency injection: builds every service from the loaded configuration.

use anyhow::Result;
use brain_application::{
    BrainConfig, ConsensusEngine, EventLogger, MemoryLayer, NoEventLogger, Orchestrator,
    ProcessObjectiveUseCase, Supervisor, WorkerPool,
};
use brain_infrastructure::{
    FileConfig, InMemoryGraphStore, InMemorySessionStore, InMemoryVectorStore, JsonlEventLogger,
    build_provider,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Brain {
    pub config: BrainConfig,
    pub provider_name: String,
    pub pipeline: ProcessObjectiveUseCase,
}

impl Brain {
    pub fn build(file: &FileConfig) -> Result<Self> {
        let config = file.to_brain_config()?;
        let provider = build_provider(&file.provider)?;
        let logger = Self::event_logger(file);

        let mut memory = MemoryLayer::new(&config.memory);
        if file.memory.session_enabled {
            memory = memory.with_session_store(Arc::new(InMemorySessionStore::new()));
        }
        if file.memory.semantic_enabled {
            memory = memory.with_vector_store(Arc::new(InMemoryVectorStore::new()));
        }
        if file.memory.relational_enabled {
            memory = memory.with_graph_store(Arc::new(InMemoryGraphStore::new()));
        }
        let memory = Arc::new(memory);

        let orchestrator = Arc::new(
            Orchestrator::new(
                provider.clone(),
                memory.clone(),
                config.workers.roles.clone(),
                config.workers.task_timeout,
            )
            .with_event_logger(logger.clone()),
        );
        let pool = Arc::new(
            WorkerPool::new(&config.workers, provider.clone(), memory.clone())
                .with_context_window(config.execution.context_window)
                .with_event_logger(logger.clone()),
        );
        let consensus =
            Arc::new(ConsensusEngine::new(&config.consensus).with_event_logger(logger.clone()));
        let supervisor = Arc::new(
            Supervisor::new(
                pool.clone(),
                memory.clone(),
                consensus.clone(),
                config.quality.clone(),
            )
            .with_re_retrieval_hops(config.execution.re_retrieval_hops)
            .with_context_window(config.execution.context_window)
            .with_event_logger(logger.clone()),
        );
        let pipeline =
            ProcessObjectiveUseCase::new(orchestrator, pool, memory, supervisor, consensus.clone())
                .with_params(config.execution.clone())
                .with_event_logger(logger);

        if config.execution.require_consensus && !config.pool_can_vote() {
            warn!(
                "{} agents cannot satisfy N = 3f + 1 = {}; votes without explicit voters will fail",
                config.agent_count(),
                consensus.min_required_voters()
            );
        }
        info!(
            "Brain ready: {} agents, provider {}",
            config.agent_count(),
            provider.name()
        );

        Ok(Self {
            provider_name: provider.name().to_string(),
            config,
            pipeline,
        })
    }

    fn event_logger(file: &FileConfig) -> Arc<dyn EventLogger> {
        match file.logging.event_log.as_ref().and_then(JsonlEventLogger::new) {
            Some(logger) => {
                info!("Writing pipeline events to {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoEventLogger),
        }
    }
}
