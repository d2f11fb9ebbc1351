//! Error types for tool operations

use agent_utils::MissingCredential;
use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised while registering or invoking a tool
///
/// Invocation errors are recoverable from the agent's point of view: the
/// reasoning loop turns them into observations instead of aborting.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool's API key was never configured
    #[error(transparent)]
    MissingCredential(#[from] MissingCredential),

    /// A tool with this name is already registered
    #[error("Tool '{0}' is already registered")]
    DuplicateName(String),

    /// Empty or otherwise unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote service rejected the request
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Network or HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
