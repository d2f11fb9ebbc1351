//! Error types for LLM operations

use agent_utils::MissingCredential;
use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Failures of a single model call
#[derive(Error, Debug)]
pub enum LLMError {
    /// The provider's API key was never configured
    #[error(transparent)]
    MissingCredential(#[from] MissingCredential),

    /// The API rejected the key (401/403)
    #[error("Model API rejected the API key")]
    Unauthorized,

    /// The API throttled the request (429)
    #[error("Model API rate limit hit: {0}")]
    RateLimited(String),

    /// Any other non-success status
    #[error("Model API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (connect, TLS, timeout)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The body did not match the chat completions schema
    #[error("Could not decode model response: {0}")]
    Decode(String),

    /// The API answered without any choice to read
    #[error("Model API returned no completion choices")]
    EmptyResponse,
}
