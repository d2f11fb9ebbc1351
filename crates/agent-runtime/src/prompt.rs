//! Zero-shot ReAct prompt
//!
//! The agent sees the tool list, the protocol it must follow, the question,
//! and a scratchpad that accumulates every previous step with its observation.

use crate::Result;
use agent_prompt::PromptTemplate;
use agent_tools::ToolRegistry;
use serde_json::json;

const REACT_TEMPLATE: &str = "\
{% if tools %}Answer the following questions as best you can. You have access to the following tools:

{{ tools }}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{{ tool_names }}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question
{%- else %}Answer the following questions as best you can. You have no tools available, so answer directly.

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Final Answer: the final answer to the original input question
{%- endif %}

Begin!

Question: {{ input }}
Thought:{{ agent_scratchpad }}";

/// ReAct prompt bound to a fixed tool set
#[derive(Debug, Clone)]
pub struct ReactPrompt {
    template: PromptTemplate,
    tools: String,
    tool_names: String,
}

impl ReactPrompt {
    /// Build the prompt for the tools in `registry`
    pub fn new(registry: &ToolRegistry) -> Result<Self> {
        let template = PromptTemplate::new(
            "react",
            REACT_TEMPLATE,
            ["tools", "tool_names", "input", "agent_scratchpad"],
        )?;

        Ok(Self {
            template,
            tools: registry.describe(),
            tool_names: registry.names().join(", "),
        })
    }

    /// Render the prompt for `input` with the scratchpad so far
    pub fn render(&self, input: &str, scratchpad: &str) -> Result<String> {
        let text = self.template.render(&json!({
            "tools": self.tools,
            "tool_names": self.tool_names,
            "input": input,
            "agent_scratchpad": scratchpad,
        }))?;
        Ok(text)
    }
}
