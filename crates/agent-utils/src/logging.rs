//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT` ("json" selects JSON, anything else text)
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Initialize tracing subscriber with default configuration
///
/// Filter comes from `RUST_LOG` (default `info`), format from `LOG_FORMAT`.
pub fn init_tracing() {
    init_tracing_with(LogFormat::from_env(), "info");
}

/// Initialize tracing with an explicit format and fallback filter directive
pub fn init_tracing_with(format: LogFormat, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init(),
    }
}
