//! Shared utilities for strategy-rs
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup, environment-driven configuration helpers, and the
//! credential loader used by the model and search clients.

pub mod config;
pub mod credentials;
pub mod logging;

pub use config::{ConfigError, env_flag, env_parse, env_string};
pub use credentials::{Credential, MissingCredential};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
