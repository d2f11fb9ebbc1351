//! Prompt template management for strategy-rs
//!
//! This crate provides [`PromptTemplate`], a Jinja2 template (rendered with
//! MiniJinja) that declares the variables it consumes. Templates are validated
//! at construction and rendering fails when a declared variable is missing.
//!
//! # Quick Start
//!
//! ```
//! use agent_prompt::PromptTemplate;
//!
//! let template = PromptTemplate::new("greeting", "Hello, {{ name }}!", ["name"]).unwrap();
//! let text = template.render_pairs(&[("name", "World")]).unwrap();
//! assert_eq!(text, "Hello, World!");
//! ```

mod error;
mod template;

pub use error::{PromptError, Result};
pub use template::PromptTemplate;
