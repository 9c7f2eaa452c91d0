//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving structured pipeline events
    pub event_log: Option<PathBuf>,
    /// Directory for a daily-rolling diagnostic log
    pub log_dir: Option<PathBuf>,
}
