//! Error types for jira-glue
//!
//! One error enum covers configuration, parsing and both REST integrations.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for jira-glue operations
pub type Result<T> = std::result::Result<T, GlueError>;

/// Error type for jira-glue operations
#[derive(Error, Debug)]
pub enum GlueError {
    /// Configuration errors (missing credentials, invalid config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input (repository names, issue numbers)
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication rejected by GitHub or JIRA
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Issue, ticket or project not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status from an external API
    #[error("{service} API error: HTTP {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Rate limited (retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Integration errors that don't map to an HTTP status
    #[error("Integration error: {0}")]
    Integration(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl crate::integrations::retry::RetryableError for GlueError {
    fn retry_decision(&self) -> crate::integrations::retry::RetryDecision {
        use crate::integrations::retry::RetryDecision;
        use std::time::Duration;

        match self {
            GlueError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else {
                    RetryDecision::NoRetry
                }
            }
            GlueError::Api { status, .. } => match status {
                500..=599 => RetryDecision::Retry,
                _ => RetryDecision::NoRetry,
            },
            GlueError::RateLimited(secs) => RetryDecision::RetryAfter(Duration::from_secs(*secs)),
            GlueError::Config(_)
            | GlueError::Parse(_)
            | GlueError::Io(_)
            | GlueError::Json(_)
            | GlueError::Yaml(_)
            | GlueError::Auth(_)
            | GlueError::NotFound(_)
            | GlueError::Integration(_)
            | GlueError::Anyhow(_) => RetryDecision::NoRetry,
        }
    }
}
