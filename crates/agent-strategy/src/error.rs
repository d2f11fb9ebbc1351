//! Error types for strategy generation

use agent_llm::LLMError;
use agent_prompt::PromptError;
use agent_runtime::AgentError;
use thiserror::Error;

/// Errors surfaced to the user interface
///
/// Tool failures never appear here; the reasoning loop turns them into
/// observations.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// An API key was not configured
    #[error("Missing credential: environment variable {env_var} is not set")]
    MissingCredential { env_var: String },

    /// The submitted topic was empty
    #[error("Please enter a topic")]
    EmptyInput,

    /// The reasoning loop ended without an answer
    #[error("Reasoning failed: {0}")]
    ReasoningLoopFailure(String),

    /// Network, auth or timeout failure talking to the model API
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Prompt template error
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for strategy operations
pub type Result<T> = std::result::Result<T, StrategyError>;

impl From<LLMError> for StrategyError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::MissingCredential(missing) => StrategyError::MissingCredential {
                env_var: missing.env_var,
            },
            other => StrategyError::ExternalService(other.to_string()),
        }
    }
}

impl From<AgentError> for StrategyError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Model(e) => e.into(),
            AgentError::Timeout(elapsed) => {
                StrategyError::ExternalService(format!("Model call timed out after {elapsed:?}"))
            }
            AgentError::LoopFailed(failure) => {
                StrategyError::ReasoningLoopFailure(failure.to_string())
            }
            AgentError::Prompt(e) => StrategyError::Prompt(e),
            AgentError::Configuration(msg) => StrategyError::Configuration(msg),
        }
    }
}

impl From<agent_utils::ConfigError> for StrategyError {
    fn from(err: agent_utils::ConfigError) -> Self {
        StrategyError::Configuration(err.to_string())
    }
}
