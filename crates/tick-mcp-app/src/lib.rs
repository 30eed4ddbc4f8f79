//! Application layer for tick-mcp.
//!
//! This crate provides configuration, the user-facing filter builder, the batch
//! dispatcher and the [`TaskService`] façade shared by the CLI and MCP interfaces.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter_util;
pub mod query;
pub mod service;

// Re-exports for convenience
pub use config::{AppConfig, ConfigError, DEFAULT_REDIRECT_URI, default_config_path};
pub use dispatch::dispatch;
pub use error::ServiceError;
pub use filter_util::{FilterBuildError, FilterBuildResult, TaskFilterBuilder, parse_priority_token};
pub use query::{QueryResult, TaskQuery};
pub use service::{ServiceSettings, TaskService};
