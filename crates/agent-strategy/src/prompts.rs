//! Strategy prompt and assistant persona

use crate::error::{Result, StrategyError};
use agent_llm::Message;
use agent_prompt::PromptTemplate;

const STRATEGY_TEMPLATE: &str = "Write me detailed investment strategies about {{ topic }}";

/// Persona sent ahead of every reasoning-loop invocation, in this order
pub const SYSTEM_MESSAGES: [&str; 3] = [
    "You are a friendly Stock/Financial analyst that can provide investment advice.",
    "Investing involves risks. It's important to do thorough research and consider professional advice.",
    "I can provide general information about investment strategies and concepts.",
];

/// The system messages as chat messages
pub fn system_messages() -> Vec<Message> {
    SYSTEM_MESSAGES.iter().map(|text| Message::system(*text)).collect()
}

/// Renders the user's topic into the strategy request
#[derive(Debug, Clone)]
pub struct StrategyPrompt {
    template: PromptTemplate,
}

impl StrategyPrompt {
    /// Build the prompt
    pub fn new() -> Result<Self> {
        let template = PromptTemplate::new("strategy", STRATEGY_TEMPLATE, ["topic"])?;
        Ok(Self { template })
    }

    /// Render the request for `topic`
    ///
    /// Fails with [`StrategyError::EmptyInput`] for an empty or blank topic.
    pub fn render(&self, topic: &str) -> Result<String> {
        if topic.trim().is_empty() {
            return Err(StrategyError::EmptyInput);
        }
        Ok(self.template.render_pairs(&[("topic", topic)])?)
    }
}
