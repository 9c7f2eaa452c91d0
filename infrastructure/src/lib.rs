//! Infrastructure layer for collective-brain
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod memory;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConsensusConfig, FileLoggingConfig,
    FileMemoryConfig, FileProviderConfig, FileQualityConfig, FileWorkersConfig,
};
pub use logging::JsonlEventLogger;
pub use memory::{InMemoryGraphStore, InMemorySessionStore, InMemoryVectorStore};
pub use providers::{ProviderKind, ProviderSetupError, TemplateProvider, build_provider};

#[cfg(feature = "http-provider")]
pub use providers::OpenAiCompatibleProvider;
