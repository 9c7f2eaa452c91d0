//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application's
//! typed [`BrainConfig`] after validation.

mod consensus;
mod logging;
mod memory;
mod provider;
mod quality;
mod workers;

pub use consensus::FileConsensusConfig;
pub use logging::FileLoggingConfig;
pub use memory::FileMemoryConfig;
pub use provider::FileProviderConfig;
pub use quality::FileQualityConfig;
pub use workers::FileWorkersConfig;

use brain_application::{BrainConfig, ConsensusSettings, ExecutionParams, MemorySettings, WorkerSettings};
use brain_domain::WorkerRole;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("workers.roles cannot be empty")]
    NoRoles,

    #[error("role name cannot be empty")]
    EmptyRoleName,

    #[error("workers.roles: '{0}' is listed more than once")]
    DuplicateRole(String),

    #[error("consensus.quorum_rule: {0}")]
    InvalidQuorumRule(String),

    #[error("consensus.integrity_check: {0}")]
    InvalidIntegrityCheck(String),

    #[error("provider.kind: unknown provider '{0}' (expected one of: template, openai)")]
    UnknownProvider(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub memory: FileMemoryConfig,
    pub consensus: FileConsensusConfig,
    pub workers: FileWorkersConfig,
    pub quality: FileQualityConfig,
    pub provider: FileProviderConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration. The first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.memory.working_budget == 0 {
            return Err(ConfigValidationError::ZeroValue("memory.working_budget"));
        }
        if self.memory.backend_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroValue("memory.backend_timeout_ms"));
        }
        if self.memory.session_ttl_seconds == 0 {
            return Err(ConfigValidationError::ZeroValue("memory.session_ttl_seconds"));
        }
        if self.workers.task_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroValue("workers.task_timeout_seconds"));
        }
        if self.workers.workers_per_role == 0 {
            return Err(ConfigValidationError::ZeroValue("workers.workers_per_role"));
        }
        if self.workers.roles.is_empty() {
            return Err(ConfigValidationError::NoRoles);
        }
        if self.workers.roles.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyRoleName);
        }
        let mut seen = HashSet::new();
        for name in &self.workers.roles {
            if let Some(role) = WorkerRole::from_hint(name)
                && !seen.insert(role.slug())
            {
                return Err(ConfigValidationError::DuplicateRole(name.trim().to_string()));
            }
        }

        self.consensus
            .parse_rule()
            .map_err(ConfigValidationError::InvalidQuorumRule)?;
        self.consensus
            .parse_integrity()
            .map_err(ConfigValidationError::InvalidIntegrityCheck)?;

        if !self.provider.is_known_kind() {
            return Err(ConfigValidationError::UnknownProvider(self.provider.kind.clone()));
        }

        Ok(())
    }

    /// Validate and convert into the typed settings the services are built from.
    pub fn to_brain_config(&self) -> Result<BrainConfig, ConfigValidationError> {
        self.validate()?;

        let consensus = ConsensusSettings {
            max_faulty_voters: self.consensus.max_faulty_voters,
            quorum_rule: self
                .consensus
                .parse_rule()
                .map_err(ConfigValidationError::InvalidQuorumRule)?,
            integrity: self
                .consensus
                .parse_integrity()
                .map_err(ConfigValidationError::InvalidIntegrityCheck)?,
        };

        Ok(BrainConfig {
            memory: MemorySettings {
                working_budget: self.memory.working_budget,
                backend_timeout: Duration::from_millis(self.memory.backend_timeout_ms),
                session_ttl: Duration::from_secs(self.memory.session_ttl_seconds),
            },
            consensus,
            workers: WorkerSettings {
                roles: self.workers.parse_roles(),
                workers_per_role: self.workers.workers_per_role,
                task_timeout: Duration::from_secs(self.workers.task_timeout_seconds),
            },
            quality: self.quality.to_criteria(),
            execution: ExecutionParams::default()
                .with_require_consensus(self.quality.require_consensus)
                .with_context_window(self.memory.context_window)
                .with_re_retrieval_hops(self.memory.re_retrieval_hops),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_domain::{IntegrityPolicy, QuorumRule, WorkerRole};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[memory]
working_budget = 20
backend_timeout_ms = 500
semantic_enabled = false

[consensus]
max_faulty_voters = 2
quorum_rule = "unanimous"

[workers]
roles = ["Research", "Finance"]
workers_per_role = 4
task_timeout_seconds = 30

[quality]
min_workers = 2
required_roles = ["Finance"]
require_consensus = false

[provider]
kind = "openai"
model = "gpt-4o"

[logging]
event_log = "/tmp/brain/events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.working_budget, 20);
        assert!(!config.memory.semantic_enabled);
        assert!(config.memory.session_enabled);
        assert_eq!(config.provider.kind, "openai");
        assert!(config.logging.event_log.is_some());

        let brain = config.to_brain_config().unwrap();
        assert_eq!(brain.memory.backend_timeout, Duration::from_millis(500));
        assert_eq!(brain.consensus.max_faulty_voters, 2);
        assert_eq!(brain.consensus.quorum_rule, QuorumRule::Unanimous);
        assert_eq!(brain.workers.roles, vec![WorkerRole::Research, WorkerRole::Finance]);
        assert_eq!(brain.agent_count(), 8);
        assert_eq!(brain.quality.required_roles, vec![WorkerRole::Finance]);
        assert!(!brain.execution.require_consensus);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[memory]
working_budget = 10
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.working_budget, 10);
        // Defaults should apply
        assert_eq!(config.memory.backend_timeout_ms, 2000);
        assert_eq!(config.workers.roles.len(), 4);
        assert_eq!(config.provider.kind, "template");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());

        let brain = config.to_brain_config().unwrap();
        assert_eq!(brain.memory.working_budget, 50);
        assert_eq!(brain.consensus.integrity, IntegrityPolicy::None);
        assert!(brain.pool_can_vote());
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = FileConfig::default();
        config.memory.working_budget = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue("memory.working_budget"))
        );

        let mut config = FileConfig::default();
        config.workers.task_timeout_seconds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue("workers.task_timeout_seconds"))
        );

        let mut config = FileConfig::default();
        config.workers.workers_per_role = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_role_name() {
        let toml_str = r#"
[workers]
roles = ["Research", "  "]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyRoleName));
    }

    #[test]
    fn test_validate_duplicate_roles() {
        let toml_str = r#"
[workers]
roles = ["Research", "research"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicateRole("research".to_string()))
        );

        let mut config = FileConfig::default();
        config.workers.roles = vec!["Data Science".into(), "data-science".into()];
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicateRole("data-science".to_string()))
        );
    }

    #[test]
    fn test_validate_unknown_values() {
        let mut config = FileConfig::default();
        config.consensus.quorum_rule = "most".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidQuorumRule(_))
        ));

        for ambiguous in ["0%", "50%"] {
            let mut config = FileConfig::default();
            config.consensus.quorum_rule = ambiguous.to_string();
            assert!(matches!(
                config.validate(),
                Err(ConfigValidationError::InvalidQuorumRule(_))
            ));
        }

        let mut config = FileConfig::default();
        config.consensus.integrity_check = "paranoid".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidIntegrityCheck(_))
        ));

        let mut config = FileConfig::default();
        config.provider.kind = "bedrock".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownProvider("bedrock".to_string()))
        );
    }
}
