//! Configuration for strategy generation

use crate::error::{Result, StrategyError};
use crate::session::DEFAULT_SESSION_TTL;
use agent_llm::providers::openai::OPENAI_API_KEY_VAR;
use agent_runtime::ExecutorConfig;
use agent_tools::search::SERPER_API_KEY_VAR;
use agent_utils::{Credential, env_flag, env_parse, env_string};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Settings shared by every interaction, built once at startup
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// OpenAI-compatible endpoint
    pub api_base: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion budget per model call
    pub max_tokens: usize,

    /// Reasoning-loop step limit
    pub max_steps: usize,

    /// Malformed-output retries before the loop fails
    pub max_parse_retries: usize,

    /// Timeout for each model and tool call
    pub call_timeout: Duration,

    /// Offer the web-search tool to the reasoning loop
    pub search_enabled: bool,

    /// Search requests per minute
    pub search_rate_limit: u32,

    /// Idle time after which a browser session and its history are dropped
    pub session_ttl: Duration,

    /// Model API key
    pub openai_api_key: Credential,

    /// Search API key
    pub serper_api_key: Credential,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.9,
            max_tokens: 1024,
            max_steps: 15,
            max_parse_retries: 2,
            call_timeout: Duration::from_secs(60),
            search_enabled: true,
            search_rate_limit: 60,
            session_ttl: DEFAULT_SESSION_TTL,
            openai_api_key: Credential::missing(OPENAI_API_KEY_VAR),
            serper_api_key: Credential::missing(SERPER_API_KEY_VAR),
        }
    }
}

impl StrategyConfig {
    /// Create a new configuration builder
    pub fn builder() -> StrategyConfigBuilder {
        StrategyConfigBuilder::default()
    }

    /// Load configuration and credentials from the environment
    ///
    /// Missing API keys are not an error here; they fail at first use.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_base: env_string("OPENAI_API_BASE", DEFAULT_API_BASE),
            model: env_string("OPENAI_MODEL", DEFAULT_MODEL),
            temperature: env_parse("STRATEGY_TEMPERATURE", 0.9)?,
            max_tokens: env_parse("STRATEGY_MAX_TOKENS", 1024)?,
            max_steps: env_parse("STRATEGY_MAX_STEPS", 15)?,
            max_parse_retries: env_parse("STRATEGY_MAX_PARSE_RETRIES", 2)?,
            call_timeout: Duration::from_secs(env_parse("STRATEGY_TIMEOUT_SECS", 60)?),
            search_enabled: env_flag("STRATEGY_SEARCH_ENABLED", true)?,
            search_rate_limit: env_parse("SERPER_RATE_LIMIT", 60)?,
            session_ttl: Duration::from_secs(env_parse(
                "STRATEGY_SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL.as_secs(),
            )?),
            openai_api_key: Credential::from_env(OPENAI_API_KEY_VAR),
            serper_api_key: Credential::from_env(SERPER_API_KEY_VAR),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StrategyError::Configuration(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if self.max_steps == 0 {
            return Err(StrategyError::Configuration(
                "max_steps must be greater than 0".to_string(),
            ));
        }

        if self.call_timeout.is_zero() {
            return Err(StrategyError::Configuration(
                "call timeout must be greater than 0".to_string(),
            ));
        }

        if self.session_ttl.is_zero() {
            return Err(StrategyError::Configuration(
                "session TTL must be greater than 0".to_string(),
            ));
        }

        if self.search_enabled && self.search_rate_limit == 0 {
            return Err(StrategyError::Configuration(
                "search rate limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for the reasoning loop
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_steps: self.max_steps,
            max_parse_retries: self.max_parse_retries,
            call_timeout: self.call_timeout,
        }
    }
}

/// Builder for StrategyConfig
#[derive(Debug, Default)]
pub struct StrategyConfigBuilder {
    api_base: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    max_steps: Option<usize>,
    max_parse_retries: Option<usize>,
    call_timeout: Option<Duration>,
    search_enabled: Option<bool>,
    search_rate_limit: Option<u32>,
    session_ttl: Option<Duration>,
    openai_api_key: Option<Credential>,
    serper_api_key: Option<Credential>,
}

impl StrategyConfigBuilder {
    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the step limit
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Set the malformed-output retry budget
    pub fn max_parse_retries(mut self, retries: usize) -> Self {
        self.max_parse_retries = Some(retries);
        self
    }

    /// Set the per-call timeout
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Enable or disable the search tool
    pub fn search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = Some(enabled);
        self
    }

    /// Set the search rate limit (requests per minute)
    pub fn search_rate_limit(mut self, per_minute: u32) -> Self {
        self.search_rate_limit = Some(per_minute);
        self
    }

    /// Set the session idle timeout
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    /// Set the model API key
    pub fn openai_api_key(mut self, key: Credential) -> Self {
        self.openai_api_key = Some(key);
        self
    }

    /// Set the search API key
    pub fn serper_api_key(mut self, key: Credential) -> Self {
        self.serper_api_key = Some(key);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StrategyConfig> {
        let defaults = StrategyConfig::default();

        let config = StrategyConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            max_parse_retries: self.max_parse_retries.unwrap_or(defaults.max_parse_retries),
            call_timeout: self.call_timeout.unwrap_or(defaults.call_timeout),
            search_enabled: self.search_enabled.unwrap_or(defaults.search_enabled),
            search_rate_limit: self.search_rate_limit.unwrap_or(defaults.search_rate_limit),
            session_ttl: self.session_ttl.unwrap_or(defaults.session_ttl),
            openai_api_key: self.openai_api_key.unwrap_or(defaults.openai_api_key),
            serper_api_key: self.serper_api_key.unwrap_or(defaults.serper_api_key),
        };

        config.validate()?;
        Ok(config)
    }
}
