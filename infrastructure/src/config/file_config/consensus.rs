//! Consensus configuration from TOML (`[consensus]` section)
//!
//! ```toml
//! [consensus]
//! max_faulty_voters = 1          # N = 3f + 1 voters required
//! quorum_rule = "supermajority"  # or "majority", "unanimous", "75%"
//! integrity_check = "none"       # or "contradictory_revote"
//! ```

use brain_domain::{IntegrityPolicy, QuorumRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub max_faulty_voters: usize,
    pub quorum_rule: String,
    pub integrity_check: String,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            max_faulty_voters: 1,
            quorum_rule: "supermajority".to_string(),
            integrity_check: "none".to_string(),
        }
    }
}

impl FileConsensusConfig {
    pub fn parse_rule(&self) -> Result<QuorumRule, String> {
        self.quorum_rule.parse()
    }

    pub fn parse_integrity(&self) -> Result<IntegrityPolicy, String> {
        self.integrity_check.parse()
    }
}
