//! OpenAI provider implementation
//!
//! This module implements the LLMProvider trait for OpenAI's chat completions
//! endpoint. See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, LLMProvider, Message};
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use agent_utils::Credential;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A missing key surfaces on the first call
//!     let config = OpenAIConfig::new(Credential::from_env("OPENAI_API_KEY"));
//!     let provider = OpenAIProvider::with_config(config)?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```
//!
//! OpenAI-compatible servers (vLLM, LM Studio, Azure deployments) work through
//! [`OpenAIConfig::with_api_base`].

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage,
};
use agent_utils::Credential;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Environment variable holding the API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication (may be absent until first use)
    pub api_key: Credential,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout (default: 120s)
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Create a new config with the given credential and default settings
    pub fn new(api_key: Credential) -> Self {
        Self {
            api_key,
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        // Checked before any network traffic so a missing key is reported as such
        let api_key = self.config.api_key.expose()?;

        debug!("Sending request to OpenAI API at {}", self.config.api_base);

        let openai_request = OpenAIRequest {
            model: request.model.clone(),
            messages: build_openai_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop_sequences,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(api_key)
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LLMError::Unauthorized,
                429 => LLMError::RateLimited(error_text),
                code => LLMError::Api {
                    status: code,
                    message: error_text,
                },
            });
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Decode(e.to_string()))?;

        parse_openai_response(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// OpenAI-specific wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_openai_messages(messages: &[Message]) -> Vec<OpenAIMessage> {
    messages
        .iter()
        .map(|m| OpenAIMessage {
            role: m.role.as_str(),
            content: m.content.clone(),
        })
        .collect()
}

fn parse_openai_response(response: OpenAIResponse) -> Result<CompletionResponse> {
    // OpenAI can return multiple choices but only the first is requested
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LLMError::EmptyResponse)?;

    let finish_reason = choice.finish_reason.unwrap_or_default();
    let usage = response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    debug!(
        finish_reason = %finish_reason,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        total_tokens = usage.total(),
        "Received OpenAI response"
    );

    Ok(CompletionResponse {
        text: choice.message.content.unwrap_or_default(),
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

/// Map OpenAI finish reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::StopSequence,
        "length" => StopReason::MaxTokens,
        "content_filter" => {
            debug!("Content filtered by OpenAI safety systems");
            StopReason::EndTurn
        }
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_without_key() -> OpenAIProvider {
        OpenAIProvider::with_config(OpenAIConfig::new(Credential::missing(OPENAI_API_KEY_VAR)))
            .unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider =
            OpenAIProvider::with_config(OpenAIConfig::new(Credential::new("K", "test-key")))
                .unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
        assert!(provider.config().api_key.is_present());
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAIConfig::new(Credential::new("K", "test-key"))
            .with_api_base("http://localhost:1234/v1/")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.api_base, "http://localhost:1234/v1");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_sub_second_timeout_is_kept() {
        let config = OpenAIConfig::new(Credential::new("K", "test-key"))
            .with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_millis(500));

        let provider = OpenAIProvider::with_config(config).unwrap();
        assert_eq!(provider.config().timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_first_use() {
        let provider = provider_without_key();
        let request = CompletionRequest::builder("gpt-3.5-turbo")
            .add_message(Message::user("Hello"))
            .build();

        let err = provider.complete(request).await.unwrap_err();
        match err {
            LLMError::MissingCredential(missing) => assert_eq!(missing.env_var, "OPENAI_API_KEY"),
            other => panic!("Expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn test_system_messages_keep_order() {
        let messages = vec![
            Message::system("persona"),
            Message::system("risk"),
            Message::user("question"),
        ];
        let converted = build_openai_messages(&messages);

        let roles: Vec<_> = converted.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "system", "user"]);
        assert_eq!(converted[1].content, "risk");
    }

    #[test]
    fn test_request_serialization() {
        let request = OpenAIRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: build_openai_messages(&[Message::user("hi")]),
            max_tokens: 16,
            temperature: Some(0.9),
            stop: Some(vec!["\nObservation:".to_string()]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["stop"][0], "\nObservation:");
    }

    #[test]
    fn test_parse_response() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Final Answer: hold"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        });
        let parsed: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = parse_openai_response(parsed).unwrap();

        assert_eq!(response.text, "Final Answer: hold");
        assert_eq!(response.stop_reason, StopReason::StopSequence);
        assert_eq!(response.usage.total(), 16);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let parsed: OpenAIResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_openai_response(parsed),
            Err(LLMError::EmptyResponse)
        ));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason("stop"), StopReason::StopSequence);
        assert_eq!(map_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("content_filter"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("unknown"), StopReason::EndTurn);
    }
}
