//! Reasoning provider adapters
//!
//! - [`TemplateProvider`]: offline and deterministic, the default
//! - [`OpenAiCompatibleProvider`]: chat-completions over HTTP
//!   (`http-provider` feature)

mod template;

#[cfg(feature = "http-provider")]
mod openai;

pub use template::TemplateProvider;

#[cfg(feature = "http-provider")]
pub use openai::OpenAiCompatibleProvider;

use crate::config::FileProviderConfig;
use brain_application::ReasoningProvider;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Template,
    OpenAi,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "template" => Ok(ProviderKind::Template),
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            other => Err(format!("unknown provider kind: {}", other)),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProviderSetupError {
    #[error("{0}")]
    UnknownKind(String),

    #[error("provider '{0}' requires the http-provider feature")]
    FeatureDisabled(&'static str),
}

/// Build the reasoning provider selected by `[provider] kind`.
pub fn build_provider(
    config: &FileProviderConfig,
) -> Result<Arc<dyn ReasoningProvider>, ProviderSetupError> {
    let kind: ProviderKind = config.kind.parse().map_err(ProviderSetupError::UnknownKind)?;
    match kind {
        ProviderKind::Template => Ok(Arc::new(TemplateProvider::new())),
        #[cfg(feature = "http-provider")]
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiCompatibleProvider::from_config(config))),
        #[cfg(not(feature = "http-provider"))]
        ProviderKind::OpenAi => Err(ProviderSetupError::FeatureDisabled("openai")),
    }
}
