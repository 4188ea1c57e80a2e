//! Configuration system
//!
//! Loads ~/.config/jira-glue/config.yaml (or an explicit `--config` path)
//! with support for:
//! - GitHub and GitHub Enterprise instances
//! - JIRA instance, link type and done status
//! - Feature/task label names
//! - Retry tuning
//!
//! Environment variables override the file, and credentials are only ever
//! read from the environment.

mod credentials;
mod glue_config;
pub mod validation;

pub use credentials::Credentials;
pub use glue_config::{GitHubSettings, GlueConfig, JiraSettings, LabelSettings};
pub use validation::{validate_config, validate_config_result, ValidationError};
