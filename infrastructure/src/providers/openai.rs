//! OpenAI-compatible chat-completions provider

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use brain_application::{ProviderError, ReasoningProvider};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Talks to any endpoint implementing `POST {api_base}/chat/completions`.
///
/// The context is sent as the system message and the prompt as the user
/// message.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }

    pub fn from_config(config: &FileProviderConfig) -> Self {
        let provider = Self::new(&config.api_base, &config.model).with_sampling(
            config.temperature,
            config.max_tokens,
        );
        match config.api_key() {
            Some(key) => provider.with_api_key(key),
            None => {
                warn!(
                    "{} is not set, calling {} without credentials",
                    config.api_key_env, config.api_base
                );
                provider
            }
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

/// Extract the first choice's text from a chat-completions body.
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("malformed body: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("response has no content".into()))
}

/// `Retry-After` in whole seconds; HTTP-date values are ignored.
fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn classify_status(status: StatusCode, retry_after: Option<&str>, body: &str) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited {
            retry_after: parse_retry_after(retry_after),
        }
    } else if status.is_server_error() {
        ProviderError::Network(format!("HTTP {}", status.as_u16()))
    } else {
        ProviderError::InvalidResponse(format!(
            "HTTP {}: {}",
            status.as_u16(),
            brain_domain::util::truncate_str(body, 200)
        ))
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if !context.trim().is_empty() {
            messages.push(json!({"role": "system", "content": context}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let mut request = self.client.post(self.endpoint()).json(&json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("POST {} ({} bytes of prompt)", self.endpoint(), prompt.len());
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status, retry_after.as_deref(), &body));
        }
        parse_completion(&body)
    }
}
