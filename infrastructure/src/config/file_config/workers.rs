//! Worker pool configuration from TOML (`[workers]` section)

use brain_domain::WorkerRole;
use serde::{Deserialize, Serialize};

/// # Example
///
/// ```toml
/// [workers]
/// roles = ["Research", "Analysis", "Legal"]
/// workers_per_role = 2
/// task_timeout_seconds = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkersConfig {
    /// Role names; unknown names become custom roles
    pub roles: Vec<String>,
    pub workers_per_role: usize,
    pub task_timeout_seconds: u64,
}

impl Default for FileWorkersConfig {
    fn default() -> Self {
        Self {
            roles: WorkerRole::defaults()
                .iter()
                .map(|r| r.as_str().to_string())
                .collect(),
            workers_per_role: 1,
            task_timeout_seconds: 600,
        }
    }
}

impl FileWorkersConfig {
    /// Parsed roles, skipping blank names and duplicates.
    pub fn parse_roles(&self) -> Vec<WorkerRole> {
        let mut roles: Vec<WorkerRole> = Vec::new();
        for role in self.roles.iter().filter_map(|r| WorkerRole::from_hint(r)) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }
}
