//! Domain types shared by the codecs, the reconciler and the adapters
//!
//! - **Issue**: a GitHub issue as seen by the sync passes
//! - **RepoName**: validated `owner/repo` pair
//! - **Ticket types and links**: the JIRA side of the mirror

mod issue;
mod repo;
mod ticket;

pub use issue::{ChildReference, Issue, IssueState};
pub use repo::RepoName;
pub use ticket::{NewTicket, TicketLink, TicketType};
