//! External Integrations
//!
//! Adapters for GitHub Issues and JIRA, plus the traits the sync passes are
//! written against.
//!
//! # Collaborators
//!
//! - **IssueTracker** (GitHub): source of issues, owner of labels and titles
//! - **TicketSystem** (JIRA): owner of tickets and the links between them
//!
//! Both adapters go through [`retry::with_retry`] for every HTTP call.

pub mod cache;
pub mod github;
pub mod jira;
pub mod retry;

use crate::model::{Issue, IssueState, NewTicket, RepoName, TicketLink, TicketType};
use crate::Result;
use async_trait::async_trait;

pub use cache::{IssueTypeCache, IssueTypeTable, MemoryIssueTypeCache, NoopIssueTypeCache};
pub use github::GitHubAdapter;
pub use jira::JiraAdapter;
pub use retry::{with_retry, RetryConfig, RetryDecision, RetryableError};

/// Query and mutation surface of the issue tracker
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// All issues of a repository in the given state (pull requests excluded)
    async fn list_issues(&self, repo: &RepoName, state: IssueState) -> Result<Vec<Issue>>;

    /// Open issues carrying every label in `labels`
    async fn list_issues_with_labels(&self, repo: &RepoName, labels: &[String])
        -> Result<Vec<Issue>>;

    /// Current labels of one issue
    async fn issue_labels(&self, repo: &RepoName, number: u64) -> Result<Vec<String>>;

    async fn get_issue(&self, repo: &RepoName, number: u64) -> Result<Issue>;

    /// Add labels, creating any that don't exist yet
    async fn add_labels(&self, repo: &RepoName, number: u64, labels: &[String]) -> Result<()>;

    async fn update_title(&self, repo: &RepoName, number: u64, title: &str) -> Result<()>;
}

/// Query and mutation surface of the ticket system
#[async_trait]
pub trait TicketSystem: Send + Sync {
    /// Type id for `ticket_type` in `project`
    async fn issue_type_id(&self, project: &str, ticket_type: TicketType) -> Result<String>;

    /// Create a ticket and return its key
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String>;

    /// Child links owned by `key`: hierarchy-type links where `key` is the inward issue
    async fn links(&self, key: &str) -> Result<Vec<TicketLink>>;

    /// Link `child` under `parent` (parent inward, child outward)
    async fn create_link(&self, parent: &str, child: &str) -> Result<()>;

    async fn delete_link(&self, parent: &str, link: &TicketLink) -> Result<()>;

    /// Current status name
    async fn status(&self, key: &str) -> Result<String>;

    /// Transition to the done status
    async fn close(&self, key: &str) -> Result<()>;
}
