//! Error types for agent execution

use crate::LoopFailure;
use agent_llm::LLMError;
use agent_prompt::PromptError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for agent-runtime
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that end a reasoning-loop invocation
///
/// Tool failures are not represented here: they become observations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model call failed (credentials, network, auth, bad response)
    #[error("Model call failed: {0}")]
    Model(#[from] LLMError),

    /// The model call exceeded the per-call timeout
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    /// The loop reached a terminal failure state
    #[error(transparent)]
    LoopFailed(#[from] LoopFailure),

    /// The ReAct prompt could not be built or rendered
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Executor was built with incomplete configuration
    #[error("Executor configuration error: {0}")]
    Configuration(String),
}
