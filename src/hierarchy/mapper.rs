//! Issue number → ticket key mapping for one repository

use crate::labels;
use crate::model::{ChildReference, Issue, RepoName};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ticket keys of the synced issues of a repository
#[derive(Debug, Clone)]
pub struct IssueTicketMap {
    repo: RepoName,
    keys: HashMap<u64, String>,
}

impl IssueTicketMap {
    /// Build the map from an issue set
    ///
    /// Pass both open and closed issues: closed children are still valid
    /// link targets. Issues without a resolvable key are left out.
    pub fn build<'a>(repo: RepoName, issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut keys = HashMap::new();
        for issue in issues {
            if let Some(key) = ticket_key(issue) {
                keys.insert(issue.number, key);
            }
        }
        debug!(repo = %repo, mapped = keys.len(), "Built issue to ticket map");
        Self { repo, keys }
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    /// Ticket key for an issue number of this repository
    pub fn get(&self, number: u64) -> Option<&str> {
        self.keys.get(&number).map(String::as_str)
    }

    /// Ticket key for a child reference; references into other repositories never resolve
    pub fn resolve(&self, child: &ChildReference) -> Option<&str> {
        if !child.repo.matches(&self.repo) {
            return None;
        }
        self.get(child.number)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Ticket key of one issue: the `jira-id` label, else the title decoration
///
/// An issue carrying more than one `jira-id` label has no key: it is not
/// synced until the duplicate is removed.
pub fn ticket_key(issue: &Issue) -> Option<String> {
    let id_labels = labels::jira_id_label_count(&issue.labels);
    if id_labels > 1 {
        warn!(
            issue = issue.number,
            count = id_labels,
            "Issue has several jira-id labels, treating as unsynced"
        );
        return None;
    }

    let from_label = labels::extract_jira_id_strict(&issue.labels);
    let from_title = labels::extract_jira_id_from_title(&issue.title);

    match (from_label, from_title) {
        (Some(label_key), Some(title_key)) if label_key != title_key => {
            warn!(
                issue = issue.number,
                label = %label_key,
                title = %title_key,
                "Title decoration disagrees with jira-id label, using label"
            );
            Some(label_key)
        }
        (Some(label_key), _) => Some(label_key),
        (None, title_key) => title_key,
    }
}
