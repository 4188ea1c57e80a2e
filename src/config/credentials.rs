//! API credentials from the environment

use super::GlueConfig;
use crate::{GlueError, Result};
use std::fmt;

/// Tokens for both services
#[derive(Clone)]
pub struct Credentials {
    pub github_token: String,
    pub jira_user: Option<String>,
    pub jira_token: String,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env(config: &GlueConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`; a missing token is a configuration error
    pub fn from_lookup(config: &GlueConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let github_token = read(&config.github.token_env).ok_or_else(|| {
            GlueError::Config(format!(
                "GitHub token missing: set {}",
                config.github.token_env
            ))
        })?;
        let jira_token = read(&config.jira.token_env).ok_or_else(|| {
            GlueError::Config(format!("JIRA token missing: set {}", config.jira.token_env))
        })?;
        let jira_user = read(&config.jira.user_env);

        Ok(Self {
            github_token,
            jira_user,
            jira_token,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"***")
            .field("jira_user", &self.jira_user)
            .field("jira_token", &"***")
            .finish()
    }
}
