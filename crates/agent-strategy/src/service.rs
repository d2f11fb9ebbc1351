//! Strategy generation service
//!
//! Built once at startup from [`StrategyConfig`] and shared by reference with
//! every request handler. It holds no per-session state.

use crate::config::StrategyConfig;
use crate::error::{Result, StrategyError};
use crate::history::{HistoryEntry, HistoryStore};
use crate::prompts::{StrategyPrompt, system_messages};
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_llm::{LLMProvider, Message};
use agent_runtime::AgentExecutor;
use agent_tools::{SerperConfig, SerperSearch, ToolRegistry};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Turns a topic into investment strategies
pub struct StrategyService {
    executor: AgentExecutor,
    prompt: StrategyPrompt,
    system_messages: Vec<Message>,
}

impl StrategyService {
    /// Build the service with the OpenAI provider and, if enabled, web search
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        let llm_config = OpenAIConfig::new(config.openai_api_key.clone())
            .with_api_base(&config.api_base)
            .with_timeout(config.call_timeout);
        let provider = OpenAIProvider::with_config(llm_config)
            .map_err(|e| StrategyError::Configuration(e.to_string()))?;

        let mut tools = ToolRegistry::new();
        if config.search_enabled {
            let search_config = SerperConfig::new(config.serper_api_key.clone())
                .with_timeout(config.call_timeout)
                .with_rate_limit(config.search_rate_limit);
            let search = SerperSearch::new(search_config)
                .map_err(|e| StrategyError::Configuration(e.to_string()))?;
            tools
                .register(Arc::new(search))
                .map_err(|e| StrategyError::Configuration(e.to_string()))?;
        }

        if !config.openai_api_key.is_present() {
            warn!(
                env_var = config.openai_api_key.env_var(),
                "Model API key is not set; requests will fail until it is provided"
            );
        }
        if config.search_enabled && !config.serper_api_key.is_present() {
            warn!(
                env_var = config.serper_api_key.env_var(),
                "Search API key is not set; searches will report an error to the agent"
            );
        }

        Self::with_provider(Arc::new(provider), tools, config)
    }

    /// Build the service around any model provider
    pub fn with_provider(
        provider: Arc<dyn LLMProvider>,
        tools: ToolRegistry,
        config: &StrategyConfig,
    ) -> Result<Self> {
        let executor = AgentExecutor::builder()
            .provider(provider)
            .tools(tools)
            .config(config.executor_config())
            .build()?;

        info!(
            model = %config.model,
            tools = ?executor.tools().names(),
            max_steps = config.max_steps,
            "Strategy service ready"
        );

        Ok(Self {
            executor,
            prompt: StrategyPrompt::new()?,
            system_messages: system_messages(),
        })
    }

    /// Generate strategies for `topic`
    #[instrument(skip(self))]
    pub async fn generate(&self, topic: &str) -> Result<String> {
        let prompt = self.prompt.render(topic)?;
        let outcome = self.executor.run(&self.system_messages, &prompt).await?;
        info!(
            tool_calls = outcome.steps.len(),
            model_calls = outcome.model_calls,
            "Strategies generated"
        );
        Ok(outcome.answer)
    }

    /// Generate strategies and record them in `history`
    ///
    /// Nothing is recorded when generation fails.
    pub async fn submit(&self, history: &mut HistoryStore, topic: &str) -> Result<HistoryEntry> {
        let strategies = self.generate(topic).await?;
        let entry = HistoryEntry::new(topic, strategies);
        history.append(entry.clone());
        Ok(entry)
    }
}
