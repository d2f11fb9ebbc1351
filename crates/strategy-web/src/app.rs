//! HTTP routes and request handlers

use crate::page::{Page, PageView};
use agent_strategy::{SessionStore, StrategyService};
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Cookie that carries the session id
pub const SESSION_COOKIE: &str = "strategy_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<StrategyService>,
    sessions: SessionStore,
    page: Arc<Page>,
}

impl AppState {
    pub fn new(service: StrategyService, sessions: SessionStore) -> Result<Self, minijinja::Error> {
        Ok(Self {
            service: Arc::new(service),
            sessions,
            page: Arc::new(Page::new()?),
        })
    }
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit_topic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TopicForm {
    #[serde(default)]
    topic: String,
}

async fn show_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let (session_id, session) = state.sessions.get_or_create(cookie_session_id(&jar));
    let mut session = session.lock().await;
    session.touch();

    let html = state.page.render(&PageView {
        history: session.history.all(),
        ..PageView::default()
    })?;
    Ok((with_session(jar, session_id), Html(html)))
}

async fn submit_topic(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TopicForm>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let topic = form.topic.trim();
    let (session_id, session) = state.sessions.get_or_create(cookie_session_id(&jar));

    // Held for the whole interaction so one session runs one request at a time
    let mut session = session.lock().await;
    session.touch();

    let (output, error) = match state.service.submit(&mut session.history, topic).await {
        Ok(entry) => {
            info!(session_id = %session_id, entries = session.history.len(), "Topic answered");
            (Some(entry.strategies_text), None)
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Topic failed");
            (None, Some(e.to_string()))
        }
    };

    let html = state.page.render(&PageView {
        topic,
        output: output.as_deref(),
        error,
        history: session.history.all(),
    })?;
    Ok((with_session(jar, session_id), Html(html)))
}

fn cookie_session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(Cookie::value)
}

fn with_session(jar: CookieJar, session_id: String) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("failed to render page: {0}")]
    Render(#[from] minijinja::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
