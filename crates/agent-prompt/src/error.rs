//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template parsing failed
    #[error("Failed to parse template '{name}': {detail}")]
    TemplateParseFailed { name: String, detail: String },

    /// The template references a variable it does not declare
    #[error("Template '{name}' does not match its declared variables {declared:?}: {detail}")]
    UndeclaredVariable {
        name: String,
        declared: Vec<String>,
        detail: String,
    },

    /// A declared variable was not supplied at render time
    #[error("Template '{name}' is missing variable '{variable}'")]
    MissingVariable { name: String, variable: String },

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// Variables were not a JSON object
    #[error("Variables for template '{0}' must be a JSON object")]
    InvalidVariables(String),
}
