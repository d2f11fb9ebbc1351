//! MiniJinja-backed prompt template
//!
//! A [`PromptTemplate`] pairs a Jinja2 source string with the list of variables
//! it is allowed to use. The pairing is checked when the template is built and
//! again on every render, so a slot name that drifts from the key the caller
//! supplies is an error rather than an empty substitution.

use crate::{PromptError, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};

/// A prompt template with declared input variables
///
/// # Template Syntax
///
/// Standard Jinja2 as implemented by MiniJinja:
/// - Variables: `{{ topic }}`
/// - Filters: `{{ name | upper }}`
/// - Conditionals: `{% if condition %}...{% endif %}`
///
/// Undefined variables are errors (strict mode).
///
/// # Examples
///
/// ```
/// use agent_prompt::PromptTemplate;
/// use serde_json::json;
///
/// let template = PromptTemplate::new(
///     "strategy",
///     "Write me detailed investment strategies about {{ topic }}",
///     ["topic"],
/// )
/// .unwrap();
///
/// let prompt = template.render(&json!({ "topic": "bonds" })).unwrap();
/// assert_eq!(prompt, "Write me detailed investment strategies about bonds");
///
/// // The slot name must match the key used at render time
/// assert!(template.render(&json!({ "subject": "bonds" })).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    source: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Create and validate a template
    ///
    /// Fails if the source does not parse, or if it references any variable
    /// outside `input_variables`.
    pub fn new<I, S>(
        name: impl Into<String>,
        source: impl Into<String>,
        input_variables: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = Self {
            name: name.into(),
            source: source.into(),
            input_variables: input_variables.into_iter().map(Into::into).collect(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Template name/identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variables the template declares
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Render with a JSON object of variables
    ///
    /// Every declared variable must be present as a key.
    pub fn render(&self, vars: &Value) -> Result<String> {
        let object = vars
            .as_object()
            .ok_or_else(|| PromptError::InvalidVariables(self.name.clone()))?;

        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|v| !object.contains_key(v.as_str()))
        {
            return Err(PromptError::MissingVariable {
                name: self.name.clone(),
                variable: missing.clone(),
            });
        }

        environment()
            .render_str(&self.source, minijinja::Value::from_serialize(vars))
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    /// Render from string pairs
    pub fn render_pairs(&self, pairs: &[(&str, &str)]) -> Result<String> {
        let vars: Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect();
        self.render(&Value::Object(vars))
    }

    fn validate(&self) -> Result<()> {
        let env = environment();
        env.template_from_str(&self.source)
            .map_err(|e| PromptError::TemplateParseFailed {
                name: self.name.clone(),
                detail: e.to_string(),
            })?;

        // Strict mode rejects any reference outside the declared set
        let trial_values: Map<String, Value> = self
            .input_variables
            .iter()
            .map(|v| (v.clone(), Value::String(format!("<{v}>"))))
            .collect();
        env.render_str(&self.source, minijinja::Value::from_serialize(&trial_values))
            .map_err(|e| PromptError::UndeclaredVariable {
                name: self.name.clone(),
                declared: self.input_variables.clone(),
                detail: e.to_string(),
            })?;

        Ok(())
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}
