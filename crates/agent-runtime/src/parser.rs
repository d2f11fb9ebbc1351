//! ReAct output parser
//!
//! Turns raw model text into either a tool call or a final answer.

use regex::Regex;
use std::sync::LazyLock;

/// Marker that introduces the final answer
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Observation prefix; the model is stopped before it can write one itself
pub const OBSERVATION_MARKER: &str = "\nObservation:";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern is valid")
});

static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:").expect("action pattern is valid"));

static ACTION_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*Input\s*\d*\s*:").expect("action input pattern is valid")
});

/// One parsed step of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// The model wants a tool run
    ToolCall {
        thought: String,
        tool: String,
        input: String,
        log: String,
    },
    /// The model is done
    FinalAnswer {
        thought: String,
        answer: String,
        log: String,
    },
}

/// Model output that does not follow the protocol
///
/// `observation` is fed back to the model so it can correct itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub observation: String,
}

impl ParseError {
    fn new(message: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            observation: observation.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse one model completion
pub fn parse_step(text: &str) -> Result<AgentStep, ParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(ParseError::new(
                format!("Parsing model output produced both a final answer and an action: {text}"),
                "Invalid Format: Do not give an Action and a Final Answer in the same response",
            ));
        }

        let tool = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let raw_input = caps.get(2).map_or("", |m| m.as_str());
        // Cut anything the model wrote past the point it should have stopped
        let raw_input = raw_input
            .find(OBSERVATION_MARKER)
            .map_or(raw_input, |idx| &raw_input[..idx]);
        let input = raw_input.trim().trim_matches('"').to_string();

        if tool.is_empty() {
            return Err(ParseError::new(
                format!("Could not parse model output: `{text}`"),
                "Invalid Format: Missing tool name after 'Action:'",
            ));
        }

        let thought = thought_before(text, caps.get(0).map_or(0, |m| m.start()));
        return Ok(AgentStep::ToolCall {
            thought,
            tool,
            input,
            log: text.to_string(),
        });
    }

    if let Some(idx) = text.rfind(FINAL_ANSWER_MARKER) {
        let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        if answer.is_empty() {
            return Err(ParseError::new(
                format!("Model output has an empty final answer: `{text}`"),
                "Invalid Format: 'Final Answer:' must be followed by the answer",
            ));
        }
        return Ok(AgentStep::FinalAnswer {
            thought: thought_before(text, idx),
            answer,
            log: text.to_string(),
        });
    }

    if !ACTION_ONLY_RE.is_match(text) {
        Err(ParseError::new(
            format!("Could not parse model output: `{text}`"),
            "Invalid Format: Missing 'Action:' after 'Thought:'",
        ))
    } else if !ACTION_INPUT_RE.is_match(text) {
        Err(ParseError::new(
            format!("Could not parse model output: `{text}`"),
            "Invalid Format: Missing 'Action Input:' after 'Action:'",
        ))
    } else {
        Err(ParseError::new(
            format!("Could not parse model output: `{text}`"),
            "Invalid Format: Could not parse the Action",
        ))
    }
}

fn thought_before(text: &str, end: usize) -> String {
    let head = text[..end].trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}
