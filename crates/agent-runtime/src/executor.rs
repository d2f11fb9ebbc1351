//! Agent executor for running the reasoning loop
//!
//! The AgentExecutor drives one invocation through [`LoopState`]:
//! 1. Render the ReAct prompt with the scratchpad and call the model
//! 2. Parse the output into a tool call or a final answer
//! 3. Run the tool, append its observation to the scratchpad, loop back
//! 4. Stop on a final answer, the step limit, or repeated malformed output
//!
//! Tool errors never end the loop; they are fed back as observations.

use crate::parser::{AgentStep, OBSERVATION_MARKER, parse_step};
use crate::prompt::ReactPrompt;
use crate::{AgentError, LoopFailure, LoopState, Result};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Model to use
    pub model: String,

    /// Temperature
    pub temperature: f32,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Maximum number of model calls per invocation
    pub max_steps: usize,

    /// Malformed outputs tolerated before giving up
    pub max_parse_retries: usize,

    /// Timeout applied to each model call and each tool call
    pub call_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.9,
            max_tokens: 1024,
            max_steps: 15,
            max_parse_retries: 2,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// One executed tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateStep {
    pub thought: String,
    pub tool: String,
    pub input: String,
    pub observation: String,
}

/// Result of a successful invocation
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final answer text
    pub answer: String,
    /// Tool calls made on the way, in order
    pub steps: Vec<IntermediateStep>,
    /// Number of model calls made
    pub model_calls: usize,
}

/// Per-invocation bookkeeping
struct Run<'a> {
    system_messages: &'a [Message],
    input: &'a str,
    scratchpad: String,
    steps: Vec<IntermediateStep>,
    model_calls: usize,
    parse_failures: usize,
}

impl Run<'_> {
    fn observe(&mut self, log: &str, observation: &str) {
        self.scratchpad.push_str(log);
        self.scratchpad.push_str(OBSERVATION_MARKER);
        self.scratchpad.push(' ');
        self.scratchpad.push_str(observation);
        self.scratchpad.push_str("\nThought: ");
    }
}

/// Executes the ReAct loop: model → tool → observation → model
///
/// An executor is built once and reused; every call to [`run`](Self::run)
/// starts from a fresh scratchpad, so invocations never share state.
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tools: ToolRegistry,
    prompt: ReactPrompt,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tools: ToolRegistry,
        config: ExecutorConfig,
    ) -> Result<Self> {
        if config.max_steps == 0 {
            return Err(AgentError::Configuration(
                "max_steps must be greater than zero".to_string(),
            ));
        }
        let prompt = ReactPrompt::new(&tools)?;
        Ok(Self {
            provider,
            tools,
            prompt,
            config,
        })
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::default()
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop for one user utterance
    ///
    /// `system_messages` are sent first, in order, on every model call.
    #[instrument(skip(self, system_messages), fields(model = %self.config.model))]
    pub async fn run(&self, system_messages: &[Message], input: &str) -> Result<AgentOutcome> {
        let mut run = Run {
            system_messages,
            input,
            scratchpad: String::new(),
            steps: Vec::new(),
            model_calls: 0,
            parse_failures: 0,
        };

        let mut state = LoopState::Start;
        loop {
            state = match state {
                LoopState::Done(answer) => {
                    info!(
                        model_calls = run.model_calls,
                        tool_calls = run.steps.len(),
                        "Reasoning loop finished"
                    );
                    return Ok(AgentOutcome {
                        answer,
                        steps: run.steps,
                        model_calls: run.model_calls,
                    });
                }
                LoopState::Failed(failure) => {
                    warn!(error = %failure, "Reasoning loop failed");
                    return Err(failure.into());
                }
                other => self.advance(other, &mut run).await?,
            };
        }
    }

    /// Compute the next state from a non-terminal one
    async fn advance(&self, state: LoopState, run: &mut Run<'_>) -> Result<LoopState> {
        match state {
            LoopState::Start => Ok(LoopState::Thinking),
            LoopState::Thinking => self.think(run).await,
            LoopState::ActingOnTool {
                thought,
                tool,
                input,
                log,
            } => {
                let observation = self.act(&tool, &input).await;
                run.observe(&log, &observation);
                run.steps.push(IntermediateStep {
                    thought,
                    tool,
                    input,
                    observation,
                });
                Ok(LoopState::Thinking)
            }
            terminal => Ok(terminal),
        }
    }

    async fn think(&self, run: &mut Run<'_>) -> Result<LoopState> {
        if run.model_calls >= self.config.max_steps {
            return Ok(LoopState::Failed(LoopFailure::StepLimitExceeded {
                max_steps: self.config.max_steps,
            }));
        }
        run.model_calls += 1;

        let prompt = self.prompt.render(run.input, &run.scratchpad)?;
        let mut messages = run.system_messages.to_vec();
        messages.push(Message::user(prompt));

        let request = CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .stop_sequences(vec![
                OBSERVATION_MARKER.to_string(),
                "\n\tObservation:".to_string(),
            ])
            .build();

        debug!(step = run.model_calls, "Calling model");
        let response = tokio::time::timeout(self.config.call_timeout, self.provider.complete(request))
            .await
            .map_err(|_| AgentError::Timeout(self.config.call_timeout))??;

        match parse_step(&response.text) {
            Ok(AgentStep::FinalAnswer { answer, .. }) => Ok(LoopState::Done(answer)),
            Ok(AgentStep::ToolCall {
                thought,
                tool,
                input,
                log,
            }) => {
                info!(step = run.model_calls, tool = %tool, input = %input, "Model requested tool");
                Ok(LoopState::ActingOnTool {
                    thought,
                    tool,
                    input,
                    log,
                })
            }
            Err(e) => {
                run.parse_failures += 1;
                if run.parse_failures > self.config.max_parse_retries {
                    return Ok(LoopState::Failed(LoopFailure::MalformedOutput {
                        attempts: run.parse_failures,
                        detail: e.message,
                    }));
                }
                warn!(attempt = run.parse_failures, error = %e, "Malformed model output, retrying");
                run.observe(&response.text, &e.observation);
                Ok(LoopState::Thinking)
            }
        }
    }

    /// Run a tool; every failure is turned into observation text
    async fn act(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Model requested an unknown tool");
            return format!(
                "tool not found: {name}. Available tools: [{}]",
                self.tools.names().join(", ")
            );
        };

        match tokio::time::timeout(self.config.call_timeout, tool.invoke(input)).await {
            Ok(Ok(output)) => {
                debug!(tool = %name, bytes = output.len(), "Tool returned");
                output
            }
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "Tool failed");
                format!("{name} failed: {e}")
            }
            Err(_) => {
                warn!(tool = %name, "Tool timed out");
                format!(
                    "{name} failed: timed out after {:?}",
                    self.config.call_timeout
                )
            }
        }
    }
}

/// Builder for [`AgentExecutor`]
#[derive(Default)]
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tools: ToolRegistry,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set the executor config
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Configuration("LLM provider is required".to_string()))?;
        AgentExecutor::new(provider, self.tools, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::{CompletionResponse, LLMError};
    use agent_tools::{Tool, ToolError};
    use agent_utils::MissingCredential;
    use async_trait::async_trait;
    use mockall::mock;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        pub Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    /// Replays canned outputs and records every prompt it receives
    struct ScriptedProvider {
        outputs: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(outputs: &[&str]) -> Self {
            Self {
                outputs: Mutex::new(outputs.iter().map(ToString::to_string).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            let prompt = request.messages.last().map(|m| m.text().to_string()).unwrap_or_default();
            self.prompts.lock().unwrap().push(prompt);
            let text = self
                .outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "Final Answer: script exhausted".to_string());
            Ok(CompletionResponse::from_text(text))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct CountingTool {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingTool {
        fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Tool for CountingTool {
        async fn invoke(&self, query: &str) -> agent_tools::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ToolError::RequestFailed("service unavailable".to_string()))
            } else {
                Ok(format!("results for {query}"))
            }
        }

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Useful for when you need to ask with search."
        }
    }

    /// Never answers within any reasonable timeout
    struct StalledProvider;

    #[async_trait]
    impl LLMProvider for StalledProvider {
        async fn complete(&self, _request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(CompletionResponse::from_text("Final Answer: too late"))
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    struct StalledTool;

    #[async_trait]
    impl Tool for StalledTool {
        async fn invoke(&self, _query: &str) -> agent_tools::Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &str {
            "Intermediate Answer"
        }

        fn description(&self) -> &str {
            "Useful for when you need to ask with search."
        }
    }

    fn config(max_steps: usize) -> ExecutorConfig {
        ExecutorConfig {
            max_steps,
            ..ExecutorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_final_answer_on_first_step() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .withf(|req| {
                req.messages[0].text() == "system one"
                    && req.messages[1].text() == "system two"
                    && req.stop_sequences.as_ref().is_some_and(|s| s[0] == "\nObservation:")
            })
            .returning(|_| {
                Ok(CompletionResponse::from_text(
                    " I know this already.\nFinal Answer: Strategy A",
                ))
            });

        let tool = Arc::new(CountingTool::ok("Intermediate Answer"));
        let tools = ToolRegistry::new().with_tool(tool.clone()).unwrap();
        let executor = AgentExecutor::builder()
            .provider(Arc::new(provider))
            .tools(tools)
            .build()
            .unwrap();

        let system = [Message::system("system one"), Message::system("system two")];
        let outcome = executor.run(&system, "renewable energy ETFs").await.unwrap();

        assert_eq!(outcome.answer, "Strategy A");
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.model_calls, 1);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tool_observation_feeds_next_step() {
        let provider = Arc::new(ScriptedProvider::new(&[
            " I need data.\nAction: Intermediate Answer\nAction Input: ICLN holdings",
            " I now know the final answer\nFinal Answer: Buy ICLN",
        ]));
        let tools = ToolRegistry::new()
            .with_tool(Arc::new(CountingTool::ok("Intermediate Answer")))
            .unwrap();
        let executor = AgentExecutor::new(provider.clone(), tools, config(5)).unwrap();

        let outcome = executor.run(&[], "clean energy").await.unwrap();

        assert_eq!(outcome.answer, "Buy ICLN");
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].observation, "results for ICLN holdings");

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].ends_with(
            "Action Input: ICLN holdings\nObservation: results for ICLN holdings\nThought: "
        ));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: Calculator\nAction Input: 2+2",
            "Final Answer: done",
        ]));
        let tools = ToolRegistry::new()
            .with_tool(Arc::new(CountingTool::ok("Intermediate Answer")))
            .unwrap();
        let executor = AgentExecutor::new(provider, tools, config(5)).unwrap();

        let outcome = executor.run(&[], "anything").await.unwrap();

        assert_eq!(
            outcome.steps[0].observation,
            "tool not found: Calculator. Available tools: [Intermediate Answer]"
        );
        assert_eq!(outcome.answer, "done");
    }

    #[tokio::test]
    async fn test_failing_tool_does_not_end_loop() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: Intermediate Answer\nAction Input: bonds",
            "Final Answer: Ladder treasuries",
        ]));
        let tool = Arc::new(CountingTool::failing("Intermediate Answer"));
        let tools = ToolRegistry::new().with_tool(tool.clone()).unwrap();
        let executor = AgentExecutor::new(provider, tools, config(5)).unwrap();

        let outcome = executor.run(&[], "bonds").await.unwrap();

        assert_eq!(outcome.answer, "Ladder treasuries");
        assert!(outcome.steps[0].observation.starts_with("Intermediate Answer failed:"));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_step_limit_with_always_failing_tool() {
        let mut provider = MockProvider::new();
        provider.expect_complete().times(3).returning(|_| {
            Ok(CompletionResponse::from_text(
                "Action: Intermediate Answer\nAction Input: again",
            ))
        });
        let tool = Arc::new(CountingTool::failing("Intermediate Answer"));
        let tools = ToolRegistry::new().with_tool(tool.clone()).unwrap();
        let executor = AgentExecutor::new(Arc::new(provider), tools, config(3)).unwrap();

        let err = executor.run(&[], "loop forever").await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::LoopFailed(LoopFailure::StepLimitExceeded { max_steps: 3 })
        ));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_output_retries_then_fails() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "no protocol here",
            "still nothing",
            "and again",
        ]));
        let executor = AgentExecutor::new(provider.clone(), ToolRegistry::new(), config(10)).unwrap();

        let err = executor.run(&[], "gold").await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::LoopFailed(LoopFailure::MalformedOutput { attempts: 3, .. })
        ));
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains("Observation: Invalid Format: Missing 'Action:' after 'Thought:'"));
    }

    #[tokio::test]
    async fn test_malformed_output_recovers() {
        let provider = Arc::new(ScriptedProvider::new(&["rambling", "Final Answer: Hold cash"]));
        let executor = AgentExecutor::new(provider, ToolRegistry::new(), config(10)).unwrap();

        let outcome = executor.run(&[], "cash").await.unwrap();
        assert_eq!(outcome.answer, "Hold cash");
        assert_eq!(outcome.model_calls, 2);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let mut provider = MockProvider::new();
        provider.expect_complete().times(1).returning(|_| {
            Err(LLMError::MissingCredential(MissingCredential {
                env_var: "OPENAI_API_KEY".to_string(),
            }))
        });
        let executor =
            AgentExecutor::new(Arc::new(provider), ToolRegistry::new(), config(3)).unwrap();

        let err = executor.run(&[], "anything").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Model(LLMError::MissingCredential(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_timeout_ends_run() {
        let config = ExecutorConfig {
            call_timeout: Duration::from_secs(60),
            ..ExecutorConfig::default()
        };
        let executor =
            AgentExecutor::new(Arc::new(StalledProvider), ToolRegistry::new(), config).unwrap();

        let err = executor.run(&[], "bonds").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout(d) if d == Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_timeout_becomes_observation() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: Intermediate Answer\nAction Input: bond yields",
            "Final Answer: Ladder treasuries",
        ]));
        let tools = ToolRegistry::new().with_tool(Arc::new(StalledTool)).unwrap();
        let config = ExecutorConfig {
            call_timeout: Duration::from_millis(500),
            ..ExecutorConfig::default()
        };
        let executor = AgentExecutor::new(provider.clone(), tools, config).unwrap();

        let outcome = executor.run(&[], "bonds").await.unwrap();

        assert_eq!(outcome.answer, "Ladder treasuries");
        assert_eq!(
            outcome.steps[0].observation,
            "Intermediate Answer failed: timed out after 500ms"
        );
        assert!(provider.prompts()[1].contains("Observation: Intermediate Answer failed: timed out"));
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = AgentExecutor::builder().build();
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn test_zero_steps_rejected() {
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let result = AgentExecutor::new(provider, ToolRegistry::new(), config(0));
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }
}
