//! Repository sync passes
//!
//! Each pass walks one repository's issues sequentially and returns a
//! summary with one entry per issue, so a batch outcome can be inspected
//! without scraping logs.
//!
//! # Passes
//!
//! 1. **Tickets**: create JIRA tickets for unsynced issues, label them with
//!    `jira-id: KEY` and decorate their titles
//! 2. **Hierarchy**: reconcile feature → child links
//! 3. **Close**: move tickets of closed issues to the done status
//!
//! Only failures that make the whole pass meaningless (listing the issue set)
//! are returned as errors. Everything per-issue is recorded and skipped.

mod close;
mod hierarchy;
mod tickets;

pub use close::{CloseAction, CloseResult, CloseSummary};
pub use hierarchy::{FeatureResult, FeatureStatus, HierarchySummary};
pub use tickets::{TicketSyncAction, TicketSyncResult, TicketSyncSummary};

use crate::config::GlueConfig;
use crate::integrations::{IssueTracker, TicketSystem};
use crate::model::{Issue, RepoName, TicketType};

/// Settings the passes need from the configuration
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// GitHub host used in child issue URLs
    pub domain: String,
    /// Label marking feature issues
    pub feature_label: String,
    /// Label marking task issues
    pub task_label: String,
    /// Ticket status that counts as closed
    pub done_status: String,
}

impl SyncOptions {
    pub fn from_config(config: &GlueConfig) -> Self {
        Self {
            domain: config.github.domain().to_string(),
            feature_label: config.labels.feature.clone(),
            task_label: config.labels.task.clone(),
            done_status: config.jira.done_status.clone(),
        }
    }

    /// Ticket type for an issue based on its labels
    pub fn ticket_type(&self, issue: &Issue) -> TicketType {
        if self.is_feature(issue) {
            TicketType::Feature
        } else if issue.has_label(&self.task_label) {
            TicketType::Task
        } else {
            TicketType::Story
        }
    }

    pub fn is_feature(&self, issue: &Issue) -> bool {
        issue.has_label(&self.feature_label)
    }

    /// Browser URL of an issue
    pub fn issue_url(&self, repo: &RepoName, number: u64) -> String {
        format!(
            "https://{}/{}/{}/issues/{}",
            self.domain,
            repo.owner(),
            repo.name(),
            number
        )
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&GlueConfig::default())
    }
}

/// Runs sync passes against an issue tracker and a ticket system
pub struct Syncer<I, T> {
    tracker: I,
    tickets: T,
    options: SyncOptions,
}

impl<I: IssueTracker, T: TicketSystem> Syncer<I, T> {
    pub fn new(tracker: I, tickets: T, options: SyncOptions) -> Self {
        Self {
            tracker,
            tickets,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn tracker(&self) -> &I {
        &self.tracker
    }

    pub fn tickets(&self) -> &T {
        &self.tickets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_type_from_labels() {
        let options = SyncOptions::default();
        assert_eq!(
            options.ticket_type(&Issue::new(1, "a").with_label("Feature")),
            TicketType::Feature
        );
        assert_eq!(
            options.ticket_type(&Issue::new(2, "b").with_label("task")),
            TicketType::Task
        );
        assert_eq!(options.ticket_type(&Issue::new(3, "c")), TicketType::Story);
    }

    #[test]
    fn test_issue_url_uses_domain() {
        let mut config = GlueConfig::default();
        config.github.url = "https://github.example.com".to_string();
        let options = SyncOptions::from_config(&config);
        assert_eq!(
            options.issue_url(&RepoName::new("team", "svc"), 4),
            "https://github.example.com/team/svc/issues/4"
        );
    }
}
