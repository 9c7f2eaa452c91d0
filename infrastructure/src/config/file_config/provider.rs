//! Reasoning provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// Which reasoning provider the binary wires in.
///
/// ```toml
/// [provider]
/// kind = "openai"
/// model = "gpt-4o-mini"
/// api_base = "https://api.openai.com/v1"
/// api_key_env = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// "template" (offline, deterministic) or "openai"
    pub kind: String,
    pub model: String,
    /// Base URL of an OpenAI-compatible chat-completions API
    pub api_base: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: "template".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }
}

impl FileProviderConfig {
    pub const KINDS: [&'static str; 2] = ["template", "openai"];

    pub fn is_known_kind(&self) -> bool {
        Self::KINDS.contains(&self.kind.to_lowercase().as_str())
    }

    /// API key read from `api_key_env`, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
