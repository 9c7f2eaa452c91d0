//! Configuration file loading for collective-brain
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `BRAIN_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./brain.toml` or `./.brain.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/collective-brain/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsensusConfig, FileLoggingConfig, FileMemoryConfig,
    FileProviderConfig, FileQualityConfig, FileWorkersConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
