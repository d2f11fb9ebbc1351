//! HTML page rendering
//!
//! The whole UI is one page: a text input, the latest output or error, and a
//! collapsible history panel. The template name ends in `.html` so every
//! interpolated value is HTML-escaped.

use agent_strategy::HistoryEntry;
use minijinja::Environment;
use serde::Serialize;

const PAGE_NAME: &str = "index.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Investment Strategies Generator</title>
  <style>
    body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
    label { display: block; margin-bottom: .5rem; }
    input[type=text] { width: 100%; padding: .5rem; box-sizing: border-box; }
    .output, .ai { white-space: pre-wrap; }
    .error { color: #a00; border: 1px solid #a00; padding: .5rem; margin: 1rem 0; }
    .entry { border-top: 1px solid #ddd; padding: .5rem 0; }
    time { color: #666; font-size: .85rem; }
  </style>
</head>
<body>
  <h1>Investment Strategies Generator</h1>
  <form method="post" action="/">
    <label for="topic">Enter your prompt here</label>
    <input id="topic" name="topic" type="text" value="{{ topic }}" autofocus>
  </form>
{% if error %}
  <div class="error" role="alert">{{ error }}</div>
{% endif %}
{% if output %}
  <div class="output">{{ output }}</div>
{% endif %}
  <details>
    <summary>Strategies History</summary>
{% for entry in history %}
    <div class="entry">
      <time>{{ entry.created_at }}</time>
      <p class="human">Human: {{ entry.topic }}</p>
      <p class="ai">AI: {{ entry.strategies_text }}</p>
    </div>
{% else %}
    <p>No strategies yet.</p>
{% endfor %}
  </details>
</body>
</html>
"#;

/// One history row as displayed
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    topic: &'a str,
    strategies_text: &'a str,
    created_at: String,
}

impl<'a> From<&'a HistoryEntry> for HistoryRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self {
            topic: &entry.topic,
            strategies_text: &entry.strategies_text,
            created_at: entry.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// Everything the page shows for one response
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub topic: &'a str,
    pub output: Option<&'a str>,
    pub error: Option<String>,
    pub history: &'a [HistoryEntry],
}

#[derive(Serialize)]
struct PageContext<'a> {
    topic: &'a str,
    output: Option<&'a str>,
    error: Option<&'a str>,
    history: Vec<HistoryRow<'a>>,
}

/// Compiled page template
pub struct Page {
    env: Environment<'static>,
}

impl Page {
    /// Compile the page template
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PAGE_NAME, PAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the page
    pub fn render(&self, view: &PageView<'_>) -> Result<String, minijinja::Error> {
        let context = PageContext {
            topic: view.topic,
            output: view.output,
            error: view.error.as_deref(),
            history: view.history.iter().map(HistoryRow::from).collect(),
        };
        self.env.get_template(PAGE_NAME)?.render(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page() {
        let page = Page::new().unwrap();
        let html = page.render(&PageView::default()).unwrap();

        assert!(html.contains("<title>Investment Strategies Generator</title>"));
        assert!(html.contains("Enter your prompt here"));
        assert!(html.contains("<summary>Strategies History</summary>"));
        assert!(html.contains("No strategies yet."));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn test_values_are_escaped() {
        let page = Page::new().unwrap();
        let history = [HistoryEntry::new("<script>x</script>", "a & b")];
        let html = page
            .render(&PageView {
                topic: "\"quoted\"",
                output: Some("<b>bold</b>"),
                error: None,
                history: &history,
            })
            .unwrap();

        assert!(!html.contains("<script>x</script>"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_error_and_history_rows() {
        let page = Page::new().unwrap();
        let history = [
            HistoryEntry::new("bonds", "Ladder them"),
            HistoryEntry::new("gold", "Hold some"),
        ];
        let html = page
            .render(&PageView {
                topic: "",
                output: None,
                error: Some("Please enter a topic".to_string()),
                history: &history,
            })
            .unwrap();

        assert!(html.contains("Please enter a topic"));
        assert_eq!(html.matches("class=\"entry\"").count(), 2);
        let bonds = html.find("Human: bonds").unwrap();
        let gold = html.find("Human: gold").unwrap();
        assert!(bonds < gold);
        assert!(html.contains(" UTC</time>"));
    }
}
