//! Investment Strategies Generator web UI

mod app;
mod page;

use agent_strategy::{SessionStore, StrategyConfig, StrategyService};
use agent_utils::env_string;
use app::{AppState, create_router};
use std::time::Duration;
use tracing::info;

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    agent_utils::init_tracing();

    let config = StrategyConfig::from_env()?;
    let service = StrategyService::from_config(&config)?;

    let sessions = SessionStore::with_ttl(config.session_ttl);
    let _sweeper = sessions.spawn_cleanup(config.session_ttl.min(SESSION_SWEEP_PERIOD));

    let state = AppState::new(service, sessions)?;
    let app = create_router(state);

    let bind = env_string("STRATEGY_BIND", DEFAULT_BIND);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(address = %bind, "Investment Strategies Generator listening");

    axum::serve(listener, app).await?;

    Ok(())
}
