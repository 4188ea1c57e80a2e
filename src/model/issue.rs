//! GitHub-side types

use super::RepoName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/closed state of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitHub issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub state: IssueState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(number: u64, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            description: String::new(),
            labels: Vec::new(),
            state: IssueState::Open,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_state(mut self, state: IssueState) -> Self {
        self.state = state;
        self
    }

    /// Case-insensitive label membership
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

/// A reference to a child issue found in a parent's description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildReference {
    pub repo: RepoName,
    pub number: u64,
}

impl ChildReference {
    pub fn new(repo: RepoName, number: u64) -> Self {
        Self { repo, number }
    }
}

impl fmt::Display for ChildReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}
