//! LLM provider abstraction layer for strategy-rs
//!
//! This crate provides provider-agnostic abstractions for interacting with
//! Large Language Models (LLMs). It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible chat completions provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(feature = "openai")]
pub mod providers;
