//! Tool management and execution framework for strategy-rs
//!
//! Tools are text-in/text-out capabilities offered to a reasoning loop. This
//! crate defines the [`Tool`] trait, a [`ToolRegistry`] that guarantees unique
//! names, and [`SerperSearch`], a Google search adapter backed by serper.dev.

pub mod error;
pub mod registry;
pub mod search;
pub mod tool;

pub use error::{Result, ToolError};
pub use registry::ToolRegistry;
pub use search::{SerperConfig, SerperSearch};
pub use tool::Tool;
