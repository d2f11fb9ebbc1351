//! Reasoning-loop states

use thiserror::Error;

/// State of one reasoning-loop invocation
///
/// ```text
/// Start -> Thinking -> ActingOnTool -> Thinking -> ... -> Done
///                   \-> Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Invocation received system messages and the user utterance
    Start,
    /// Waiting on the model for the next step
    Thinking,
    /// The model asked for a tool; it runs next
    ActingOnTool {
        /// Reasoning that preceded the action
        thought: String,
        /// Requested tool name
        tool: String,
        /// Tool input
        input: String,
        /// Raw model output, replayed in the scratchpad
        log: String,
    },
    /// Final answer produced
    Done(String),
    /// Unrecoverable failure
    Failed(LoopFailure),
}

/// Why a loop ended without an answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopFailure {
    /// The model never produced a final answer within the step budget
    #[error("Reasoning loop stopped after {max_steps} steps without a final answer")]
    StepLimitExceeded { max_steps: usize },

    /// The model kept producing output the protocol parser rejects
    #[error("Model output could not be parsed after {attempts} attempts: {detail}")]
    MalformedOutput { attempts: usize, detail: String },
}
