//! Label and title conventions that mark an issue as synced
//!
//! Three wire formats are understood:
//!
//! - `jira-project: <BOARD>` names the JIRA project an issue belongs to
//! - `jira-id: <KEY>` records the ticket created for an issue
//! - `[<KEY>] <title>` decorates the issue title with the same key
//!
//! The `jira-id` label is authoritative. Titles are derived from it.

use lazy_static::lazy_static;
use regex::Regex;

/// Label prefix naming the JIRA project of an issue
pub const PROJECT_LABEL_PREFIX: &str = "jira-project:";

/// Label prefix recording the ticket key of a synced issue
pub const JIRA_ID_LABEL_PREFIX: &str = "jira-id:";

lazy_static! {
    static ref STRICT_KEY: Regex = Regex::new(r"^[A-Z]+-\d+$").expect("valid key regex");
    static ref TITLE_PREFIX: Regex = Regex::new(r"^\[[A-Z]+-\d+\]").expect("valid prefix regex");
    static ref TITLE_KEY: Regex = Regex::new(r"^\[([\w\-]+)\]").expect("valid title key regex");
}

/// Value of the first label starting with `prefix`, trimmed; empty counts as absent
fn extract_prefixed<S: AsRef<str>>(labels: &[S], prefix: &str) -> Option<String> {
    labels
        .iter()
        .find_map(|label| label.as_ref().strip_prefix(prefix))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Project key from a `jira-project:` label
pub fn extract_project_key<S: AsRef<str>>(labels: &[S]) -> Option<String> {
    extract_prefixed(labels, PROJECT_LABEL_PREFIX)
}

/// Ticket key from a `jira-id:` label, without format validation
pub fn extract_jira_id<S: AsRef<str>>(labels: &[S]) -> Option<String> {
    extract_prefixed(labels, JIRA_ID_LABEL_PREFIX)
}

/// Ticket key from a `jira-id:` label, rejected unless it looks like `ABC-123`
pub fn extract_jira_id_strict<S: AsRef<str>>(labels: &[S]) -> Option<String> {
    extract_jira_id(labels).filter(|key| is_ticket_key(key))
}

/// Number of `jira-id:` labels; more than one makes the sync marker ambiguous
pub fn jira_id_label_count<S: AsRef<str>>(labels: &[S]) -> usize {
    labels
        .iter()
        .filter(|label| label.as_ref().starts_with(JIRA_ID_LABEL_PREFIX))
        .count()
}

/// Whether `key` has the `ABC-123` shape
pub fn is_ticket_key(key: &str) -> bool {
    STRICT_KEY.is_match(key)
}

/// Whether the title already starts with a `[ABC-123]` decoration
pub fn has_jira_prefix(title: &str) -> bool {
    TITLE_PREFIX.is_match(title)
}

/// Key from a leading `[...]` title decoration
pub fn extract_jira_id_from_title(title: &str) -> Option<String> {
    TITLE_KEY
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Title without a leading `[...] ` decoration
pub fn strip_title_prefix(title: &str) -> &str {
    match TITLE_KEY.find(title) {
        Some(m) => title[m.end()..].trim_start(),
        None => title,
    }
}

/// Decorate a title with a ticket key, replacing any existing decoration
pub fn title_with_key(key: &str, title: &str) -> String {
    format!("[{}] {}", key, strip_title_prefix(title))
}

/// Label recording a ticket key
pub fn jira_id_label(key: &str) -> String {
    format!("{} {}", JIRA_ID_LABEL_PREFIX, key)
}

/// Label naming a JIRA project
pub fn project_label(board: &str) -> String {
    format!("{} {}", PROJECT_LABEL_PREFIX, board)
}
