//! JIRA-side types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The ticket types this tool creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Feature,
    Story,
    Task,
}

impl TicketType {
    /// Name as it appears in a JIRA project's issue type list
    pub fn jira_name(&self) -> &'static str {
        match self {
            TicketType::Feature => "Feature",
            TicketType::Story => "Story",
            TicketType::Task => "Task",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jira_name())
    }
}

/// A link between a parent ticket and another ticket, as reported by JIRA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLink {
    /// JIRA link id, needed to delete the link
    pub id: String,
    /// Key of the ticket on the other end of the link
    pub key: String,
}

impl TicketLink {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// Ticket creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub project: String,
    pub type_id: String,
    pub summary: String,
    pub description: String,
}
