//! Agent runtime for executing reasoning loops
//!
//! This crate implements a zero-shot ReAct agent: the model is prompted with
//! the available tools and a fixed `Thought / Action / Action Input /
//! Observation / Final Answer` protocol, its output is parsed into an
//! [`AgentStep`], and the [`AgentExecutor`] drives the loop as an explicit
//! [`LoopState`] machine until a final answer or a failure.

pub mod error;
pub mod executor;
pub mod parser;
pub mod prompt;
pub mod state;

// Re-export key types
pub use error::{AgentError, Result};
pub use executor::{AgentExecutor, AgentExecutorBuilder, AgentOutcome, ExecutorConfig, IntermediateStep};
pub use parser::{AgentStep, ParseError, parse_step};
pub use state::{LoopFailure, LoopState};
