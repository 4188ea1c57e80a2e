//! jira-glue configuration file handling

use crate::integrations::retry::RetryConfig;
use crate::model::TicketType;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// GitHub instance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// Instance URL (e.g., "https://github.com" or "https://github.example.com")
    #[serde(default = "default_github_url")]
    pub url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_github_token_env")]
    pub token_env: String,
}

fn default_github_url() -> String {
    "https://github.com".to_string()
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            url: default_github_url(),
            token_env: default_github_token_env(),
        }
    }
}

impl GitHubSettings {
    /// Host part of the instance URL, used to recognise issue links
    pub fn domain(&self) -> &str {
        let url = self.url.trim_end_matches('/');
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        host.split('/').next().unwrap_or(host)
    }
}

/// JIRA instance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSettings {
    /// Instance URL (e.g., "https://example.atlassian.net")
    #[serde(default)]
    pub url: String,

    /// Environment variable holding the account email/user for basic auth.
    /// When the variable is unset the token is sent as a bearer token.
    #[serde(default = "default_jira_user_env")]
    pub user_env: String,

    /// Environment variable holding the API token
    #[serde(default = "default_jira_token_env")]
    pub token_env: String,

    /// Link type used for feature → child links
    #[serde(default = "default_link_type")]
    pub link_type: String,

    /// Status name that counts as closed
    #[serde(default = "default_done_status")]
    pub done_status: String,

    /// Issue type used when a project lacks the wanted one
    #[serde(default = "default_fallback_type")]
    pub fallback_type: TicketType,
}

fn default_jira_user_env() -> String {
    "JIRA_USER".to_string()
}

fn default_jira_token_env() -> String {
    "JIRA_TOKEN".to_string()
}

fn default_link_type() -> String {
    "Relates".to_string()
}

fn default_done_status() -> String {
    "Done".to_string()
}

fn default_fallback_type() -> TicketType {
    TicketType::Story
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_env: default_jira_user_env(),
            token_env: default_jira_token_env(),
            link_type: default_link_type(),
            done_status: default_done_status(),
            fallback_type: default_fallback_type(),
        }
    }
}

/// Label names that select the ticket type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Marks feature issues (hierarchy parents, created as Feature tickets)
    #[serde(default = "default_feature_label")]
    pub feature: String,

    /// Marks issues created as Task tickets
    #[serde(default = "default_task_label")]
    pub task: String,
}

fn default_feature_label() -> String {
    "feature".to_string()
}

fn default_task_label() -> String {
    "task".to_string()
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            feature: default_feature_label(),
            task: default_task_label(),
        }
    }
}

/// jira-glue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlueConfig {
    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub jira: JiraSettings,

    #[serde(default)]
    pub labels: LabelSettings,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl GlueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, or from the default path when it exists, else defaults.
    /// Environment overrides are applied in every case.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)?
                } else {
                    tracing::debug!(path = %default.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::GlueError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading jira-glue configuration");

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            github = %config.github.url,
            jira = %config.jira.url,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Default config path (~/.config/jira-glue/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("jira-glue");
        path.push("config.yaml");
        path
    }

    /// Apply `GITHUB_URL` and `JIRA_URL` overrides
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GITHUB_URL").filter(|v| !v.trim().is_empty()) {
            self.github.url = url.trim().to_string();
        }
        if let Some(url) = lookup("JIRA_URL").filter(|v| !v.trim().is_empty()) {
            self.jira.url = url.trim().to_string();
        }
    }
}
