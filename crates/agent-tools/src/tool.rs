//! Tool trait definition

use crate::Result;
use async_trait::async_trait;

/// Trait for tools that agents can invoke
///
/// A tool takes a free-text query (the agent's "Action Input") and returns a
/// plain-text observation. Name and description are fixed at construction and
/// are shown verbatim to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Run the tool with the given query
    async fn invoke(&self, query: &str) -> Result<String>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry; the model refers to the tool by it.
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM understand when to use this tool
    fn description(&self) -> &str;
}
