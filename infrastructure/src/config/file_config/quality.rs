//! Quality gate configuration from TOML (`[quality]` section)

use brain_domain::{QualityCriteria, WorkerRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQualityConfig {
    pub min_workers: usize,
    pub required_roles: Vec<String>,
    pub min_output_length: usize,
    pub allow_flagged: bool,
    /// Finalize every run through a consensus vote
    pub require_consensus: bool,
}

impl Default for FileQualityConfig {
    fn default() -> Self {
        Self {
            min_workers: 3,
            required_roles: Vec::new(),
            min_output_length: 1,
            allow_flagged: false,
            require_consensus: true,
        }
    }
}

impl FileQualityConfig {
    pub fn to_criteria(&self) -> QualityCriteria {
        QualityCriteria {
            min_workers: self.min_workers,
            required_roles: self
                .required_roles
                .iter()
                .filter_map(|r| WorkerRole::from_hint(r))
                .collect(),
            min_output_length: self.min_output_length,
            allow_flagged: self.allow_flagged,
        }
    }
}
