//! Ticket creation pass
//!
//! Every open issue routed to a JIRA project gets exactly one ticket. The
//! `jira-id` label is written first and the title decoration is derived
//! from it, so a half-finished run leaves a labelled issue whose title the
//! next run repairs.

use super::Syncer;
use crate::integrations::{IssueTracker, TicketSystem};
use crate::labels;
use crate::model::{Issue, IssueState, NewTicket, RepoName};
use crate::Result;
use tracing::{debug, error, info, warn};

/// What happened to one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketSyncAction {
    /// Ticket created, label added and title decorated
    Created { key: String },
    /// Already synced; the title decoration was missing or stale and was rewritten
    TitleRepaired { key: String },
    /// Already synced and decorated
    Unchanged { key: String },
    /// Not eligible (no project, malformed or duplicate `jira-id` labels)
    Skipped { reason: String },
    /// An API call failed; `key` is set when the ticket was created before the failure
    Failed { key: Option<String>, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSyncResult {
    pub number: u64,
    pub project: Option<String>,
    pub action: TicketSyncAction,
}

#[derive(Debug, Clone, Default)]
pub struct TicketSyncSummary {
    pub results: Vec<TicketSyncResult>,
    /// Boards whose issue listing failed
    pub board_errors: Vec<(String, String)>,
}

impl TicketSyncSummary {
    fn count(&self, pred: impl Fn(&TicketSyncAction) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.action)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, TicketSyncAction::Created { .. }))
    }

    pub fn repaired(&self) -> usize {
        self.count(|a| matches!(a, TicketSyncAction::TitleRepaired { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, TicketSyncAction::Unchanged { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, TicketSyncAction::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, TicketSyncAction::Failed { .. })) + self.board_errors.len()
    }

    pub fn has_errors(&self) -> bool {
        self.failed() > 0
    }
}

impl<I: IssueTracker, T: TicketSystem> Syncer<I, T> {
    /// Create tickets for the open issues of `repo`
    ///
    /// With `boards`, only issues labelled `jira-project: <BOARD>` for one of
    /// them are considered. Without, every open issue is routed by its own
    /// `jira-project` label.
    pub async fn sync_tickets(&self, repo: &RepoName, boards: &[String]) -> Result<TicketSyncSummary> {
        let mut summary = TicketSyncSummary::default();

        if boards.is_empty() {
            let issues = self.tracker.list_issues(repo, IssueState::Open).await?;
            info!(repo = %repo, count = issues.len(), "Syncing open issues");

            for issue in &issues {
                let result = match labels::extract_project_key(&issue.labels) {
                    Some(project) => self.sync_issue(repo, issue, &project).await,
                    None => TicketSyncResult {
                        number: issue.number,
                        project: None,
                        action: TicketSyncAction::Skipped {
                            reason: "no jira-project label".to_string(),
                        },
                    },
                };
                summary.results.push(result);
            }
        } else {
            for board in boards {
                let filter = vec![labels::project_label(board)];
                let issues = match self.tracker.list_issues_with_labels(repo, &filter).await {
                    Ok(issues) => issues,
                    Err(e) => {
                        error!(repo = %repo, board = %board, error = %e, "Failed to list board issues");
                        summary.board_errors.push((board.clone(), e.to_string()));
                        continue;
                    }
                };
                info!(repo = %repo, board = %board, count = issues.len(), "Syncing board issues");

                for issue in &issues {
                    summary.results.push(self.sync_issue(repo, issue, board).await);
                }
            }
        }

        info!(
            repo = %repo,
            created = summary.created(),
            repaired = summary.repaired(),
            unchanged = summary.unchanged(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Ticket sync complete"
        );

        Ok(summary)
    }

    /// Bring one issue into the synced state
    async fn sync_issue(&self, repo: &RepoName, issue: &Issue, project: &str) -> TicketSyncResult {
        let action = self.sync_issue_action(repo, issue, project).await;
        if let TicketSyncAction::Failed { ref key, ref error } = action {
            warn!(repo = %repo, number = issue.number, key = ?key, error = %error, "Issue sync failed");
        }
        TicketSyncResult {
            number: issue.number,
            project: Some(project.to_string()),
            action,
        }
    }

    async fn sync_issue_action(
        &self,
        repo: &RepoName,
        issue: &Issue,
        project: &str,
    ) -> TicketSyncAction {
        if let Some(action) = self.check_existing(repo, issue, &issue.labels).await {
            return action;
        }

        // The listing may be stale if another run synced this issue meanwhile
        match self.tracker.issue_labels(repo, issue.number).await {
            Ok(fresh) => {
                if let Some(action) = self.check_existing(repo, issue, &fresh).await {
                    return action;
                }
            }
            Err(e) => {
                return TicketSyncAction::Failed {
                    key: None,
                    error: format!("refreshing labels: {}", e),
                };
            }
        }

        let ticket_type = self.options.ticket_type(issue);
        let type_id = match self.tickets.issue_type_id(project, ticket_type).await {
            Ok(id) => id,
            Err(e) => {
                return TicketSyncAction::Failed {
                    key: None,
                    error: format!("resolving {} type in {}: {}", ticket_type, project, e),
                }
            }
        };

        let summary = labels::strip_title_prefix(&issue.title).to_string();
        let url = self.options.issue_url(repo, issue.number);
        let description = if issue.description.trim().is_empty() {
            format!("GitHub: {}", url)
        } else {
            format!("{}\n\nGitHub: {}", issue.description.trim_end(), url)
        };

        let key = match self
            .tickets
            .create_ticket(&NewTicket {
                project: project.to_string(),
                type_id,
                summary: summary.clone(),
                description,
            })
            .await
        {
            Ok(key) => key,
            Err(e) => {
                return TicketSyncAction::Failed {
                    key: None,
                    error: format!("creating ticket: {}", e),
                }
            }
        };

        if let Err(e) = self
            .tracker
            .add_labels(repo, issue.number, &[labels::jira_id_label(&key)])
            .await
        {
            error!(repo = %repo, number = issue.number, key = %key, "Ticket created but label could not be added");
            return TicketSyncAction::Failed {
                key: Some(key),
                error: format!("adding jira-id label: {}", e),
            };
        }

        let title = labels::title_with_key(&key, &issue.title);
        if let Err(e) = self.tracker.update_title(repo, issue.number, &title).await {
            return TicketSyncAction::Failed {
                key: Some(key),
                error: format!("decorating title: {}", e),
            };
        }

        info!(repo = %repo, number = issue.number, key = %key, ticket_type = %ticket_type, "Issue synced");
        TicketSyncAction::Created { key }
    }

    /// Action for an issue that already carries `jira-id` labels, `None` if it carries none
    async fn check_existing(
        &self,
        repo: &RepoName,
        issue: &Issue,
        issue_labels: &[String],
    ) -> Option<TicketSyncAction> {
        match labels::jira_id_label_count(issue_labels) {
            0 => return None,
            1 => {}
            n => {
                return Some(TicketSyncAction::Skipped {
                    reason: format!("{} jira-id labels", n),
                })
            }
        }

        let Some(key) = labels::extract_jira_id_strict(issue_labels) else {
            return Some(TicketSyncAction::Skipped {
                reason: "malformed jira-id label".to_string(),
            });
        };

        let title = labels::title_with_key(&key, &issue.title);
        if title == issue.title {
            debug!(repo = %repo, number = issue.number, key = %key, "Already synced");
            return Some(TicketSyncAction::Unchanged { key });
        }

        Some(match self.tracker.update_title(repo, issue.number, &title).await {
            Ok(()) => {
                info!(repo = %repo, number = issue.number, key = %key, "Repaired title decoration");
                TicketSyncAction::TitleRepaired { key }
            }
            Err(e) => TicketSyncAction::Failed {
                key: Some(key),
                error: format!("repairing title: {}", e),
            },
        })
    }
}
