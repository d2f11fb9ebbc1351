//! Google search through the serper.dev API
//!
//! The adapter posts the query to `https://google.serper.dev/search` and folds
//! the JSON response into a single line of text the model can read: a direct
//! answer when Google has one, otherwise knowledge-graph facts followed by
//! organic result snippets.

use crate::{Result, Tool, ToolError};
use agent_utils::Credential;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Environment variable holding the API key
pub const SERPER_API_KEY_VAR: &str = "SERPER_API_KEY";
const DEFAULT_ENDPOINT: &str = "https://google.serper.dev/search";
const NO_RESULT: &str = "No good Google Search Result was found";

/// Tool name the model uses to call search
pub const SEARCH_TOOL_NAME: &str = "Intermediate Answer";
const SEARCH_TOOL_DESCRIPTION: &str = "Useful for when you need to ask with search.";

/// Configuration for the Serper search adapter
#[derive(Debug, Clone)]
pub struct SerperConfig {
    /// API key (may be absent until first use)
    pub api_key: Credential,
    /// Search endpoint
    pub endpoint: String,
    /// Country code
    pub gl: String,
    /// Interface language
    pub hl: String,
    /// Number of organic results to request and summarize
    pub num_results: usize,
    /// Request timeout
    pub timeout: Duration,
    /// Requests per minute
    pub rate_limit_per_minute: u32,
}

impl SerperConfig {
    /// Create a config with default settings
    pub fn new(api_key: Credential) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            gl: "us".to_string(),
            hl: "en".to_string(),
            num_results: 10,
            timeout: Duration::from_secs(30),
            rate_limit_per_minute: 60,
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set requests per minute
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }
}

/// Web search tool backed by serper.dev
pub struct SerperSearch {
    client: Client,
    config: SerperConfig,
    rate_limiter: SharedRateLimiter,
}

impl SerperSearch {
    /// Create a new search adapter
    pub fn new(config: SerperConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &SerperConfig {
        &self.config
    }

    async fn search(&self, query: &str) -> Result<SerperResponse> {
        let api_key = self.config.api_key.expose()?;

        self.rate_limiter.until_ready().await;

        let body = SerperRequest {
            q: query,
            gl: &self.config.gl,
            hl: &self.config.hl,
            num: self.config.num_results,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-API-KEY", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::RequestFailed(format!(
                "Serper API error {status}: {text}"
            )));
        }

        response
            .json::<SerperResponse>()
            .await
            .map_err(|e| ToolError::UnexpectedResponse(format!("Failed to parse Serper response: {e}")))
    }
}

#[async_trait]
impl Tool for SerperSearch {
    #[instrument(skip(self), fields(tool = SEARCH_TOOL_NAME))]
    async fn invoke(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("search query is empty".to_string()));
        }

        let response = self.search(query).await?;
        let summary = summarize(&response, self.config.num_results);
        debug!(summary_length = summary.len(), "Search completed");
        Ok(summary)
    }

    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        SEARCH_TOOL_DESCRIPTION
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerperResponse {
    #[serde(default)]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    snippet_highlighted: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeGraph {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "type")]
    entity_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
}

// ============================================================================
// Summarization
// ============================================================================

fn summarize(response: &SerperResponse, limit: usize) -> String {
    if let Some(answer) = response.answer_box.as_ref().and_then(answer_box_text) {
        return answer;
    }

    let mut snippets = Vec::new();

    if let Some(kg) = &response.knowledge_graph {
        let title = kg.title.as_deref().unwrap_or_default();
        if let Some(entity_type) = &kg.entity_type {
            snippets.push(format!("{title}: {entity_type}."));
        }
        if let Some(description) = &kg.description {
            snippets.push(description.clone());
        }
        for (attribute, value) in &kg.attributes {
            snippets.push(format!("{title} {attribute}: {}.", value_text(value)));
        }
    }

    for result in response.organic.iter().take(limit) {
        if let Some(snippet) = &result.snippet {
            snippets.push(snippet.clone());
        }
        for (attribute, value) in &result.attributes {
            snippets.push(format!("{attribute}: {}.", value_text(value)));
        }
    }

    if snippets.is_empty() {
        NO_RESULT.to_string()
    } else {
        snippets.join(" ")
    }
}

fn answer_box_text(answer_box: &AnswerBox) -> Option<String> {
    if let Some(answer) = answer_box.answer.as_ref().filter(|a| !a.is_empty()) {
        return Some(answer.clone());
    }
    if let Some(snippet) = answer_box.snippet.as_ref().filter(|s| !s.is_empty()) {
        return Some(snippet.replace('\n', " "));
    }
    answer_box
        .snippet_highlighted
        .as_ref()
        .filter(|h| !h.is_empty())
        .map(|h| h.join(" "))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> SerperResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_answer_box_wins() {
        let response = parse(json!({
            "answerBox": {"answer": "4.5%", "snippet": "ignored"},
            "organic": [{"snippet": "also ignored"}]
        }));
        assert_eq!(summarize(&response, 10), "4.5%");
    }

    #[test]
    fn test_answer_box_snippet_flattens_newlines() {
        let response = parse(json!({"answerBox": {"snippet": "line one\nline two"}}));
        assert_eq!(summarize(&response, 10), "line one line two");
    }

    #[test]
    fn test_answer_box_highlighted() {
        let response = parse(json!({"answerBox": {"snippetHighlighted": ["a", "b"]}}));
        assert_eq!(summarize(&response, 10), "a b");
    }

    #[test]
    fn test_knowledge_graph_and_organic() {
        let response = parse(json!({
            "knowledgeGraph": {
                "title": "ICLN",
                "type": "Exchange-traded fund",
                "description": "Tracks clean energy equities.",
                "attributes": {"Expense ratio": "0.41%"}
            },
            "organic": [
                {"snippet": "Clean energy ETFs rallied.", "attributes": {"Date": "2024"}},
                {"title": "no snippet here"}
            ]
        }));

        assert_eq!(
            summarize(&response, 10),
            "ICLN: Exchange-traded fund. Tracks clean energy equities. \
             ICLN Expense ratio: 0.41%. Clean energy ETFs rallied. Date: 2024."
        );
    }

    #[test]
    fn test_attributes_keep_response_order() {
        let response = parse(json!({
            "knowledgeGraph": {
                "title": "VTI",
                "attributes": {"Net assets": "1.8T", "Expense ratio": "0.03%", "Inception": "2001"}
            }
        }));

        assert_eq!(
            summarize(&response, 10),
            "VTI Net assets: 1.8T. VTI Expense ratio: 0.03%. VTI Inception: 2001."
        );
    }

    #[test]
    fn test_organic_limit() {
        let response = parse(json!({
            "organic": [{"snippet": "one"}, {"snippet": "two"}, {"snippet": "three"}]
        }));
        assert_eq!(summarize(&response, 2), "one two");
    }

    #[test]
    fn test_no_results() {
        assert_eq!(summarize(&SerperResponse::default(), 10), NO_RESULT);
    }

    #[test]
    fn test_tool_identity() {
        let search = SerperSearch::new(SerperConfig::new(Credential::new("K", "key"))).unwrap();
        assert_eq!(search.name(), "Intermediate Answer");
        assert_eq!(
            search.description(),
            "Useful for when you need to ask with search."
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_tool_error() {
        let search =
            SerperSearch::new(SerperConfig::new(Credential::missing(SERPER_API_KEY_VAR))).unwrap();
        let err = search.invoke("renewable energy ETFs").await.unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential(_)));
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let search = SerperSearch::new(SerperConfig::new(Credential::new("K", "key"))).unwrap();
        assert!(matches!(
            search.invoke("  ").await,
            Err(ToolError::InvalidInput(_))
        ));
    }
}
