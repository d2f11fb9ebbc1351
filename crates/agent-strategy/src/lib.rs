//! Investment strategies generator
//!
//! The domain layer of strategy-rs. A user topic is rendered into a strategy
//! request, sent through the ReAct reasoning loop with a fixed analyst persona
//! and an optional web-search tool, and the answer is appended to the
//! session's history.
//!
//! # Example
//!
//! ```no_run
//! use agent_strategy::{HistoryStore, StrategyConfig, StrategyService};
//!
//! # async fn example() -> agent_strategy::Result<()> {
//! let config = StrategyConfig::from_env()?;
//! let service = StrategyService::from_config(&config)?;
//!
//! let mut history = HistoryStore::new();
//! let entry = service.submit(&mut history, "renewable energy ETFs").await?;
//! println!("{}", entry.strategies_text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod prompts;
pub mod service;
pub mod session;

pub use config::{StrategyConfig, StrategyConfigBuilder};
pub use error::{Result, StrategyError};
pub use history::{HistoryEntry, HistoryStore};
pub use prompts::{SYSTEM_MESSAGES, StrategyPrompt, system_messages};
pub use service::StrategyService;
pub use session::{DEFAULT_SESSION_TTL, Session, SessionHandle, SessionStore};
