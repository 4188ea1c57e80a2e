//! Close pass: closed issues move their tickets to the done status

use super::Syncer;
use crate::hierarchy::ticket_key;
use crate::integrations::{IssueTracker, TicketSystem};
use crate::model::{IssueState, RepoName};
use crate::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseAction {
    Closed,
    AlreadyDone,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseResult {
    pub number: u64,
    pub key: String,
    pub action: CloseAction,
}

#[derive(Debug, Clone, Default)]
pub struct CloseSummary {
    pub results: Vec<CloseResult>,
}

impl CloseSummary {
    pub fn closed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.action == CloseAction::Closed)
            .count()
    }

    pub fn already_done(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.action == CloseAction::AlreadyDone)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.action, CloseAction::Failed { .. }))
            .count()
    }
}

impl<I: IssueTracker, T: TicketSystem> Syncer<I, T> {
    /// Transition the tickets of closed issues in `repo` to the done status
    pub async fn close_tickets(&self, repo: &RepoName) -> Result<CloseSummary> {
        let issues = self.tracker.list_issues(repo, IssueState::Closed).await?;
        let mut summary = CloseSummary::default();

        for issue in &issues {
            let Some(key) = ticket_key(issue) else {
                continue;
            };

            let action = match self.tickets.status(&key).await {
                Ok(status) if status.eq_ignore_ascii_case(&self.options.done_status) => {
                    debug!(number = issue.number, key = %key, "Ticket already done");
                    CloseAction::AlreadyDone
                }
                Ok(status) => match self.tickets.close(&key).await {
                    Ok(()) => {
                        info!(number = issue.number, key = %key, from = %status, "Closed ticket");
                        CloseAction::Closed
                    }
                    Err(e) => CloseAction::Failed {
                        error: e.to_string(),
                    },
                },
                Err(e) => CloseAction::Failed {
                    error: format!("reading status: {}", e),
                },
            };

            if let CloseAction::Failed { ref error } = action {
                warn!(number = issue.number, key = %key, error = %error, "Could not close ticket");
            }

            summary.results.push(CloseResult {
                number: issue.number,
                key,
                action,
            });
        }

        info!(
            repo = %repo,
            closed = summary.closed(),
            already_done = summary.already_done(),
            failed = summary.failed(),
            "Close sync complete"
        );

        Ok(summary)
    }
}
