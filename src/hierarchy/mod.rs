//! Feature hierarchy reconciliation
//!
//! A feature issue lists its children under `## Issues`. Each pass:
//!
//! 1. **Extract**: parse child issue URLs from the feature description
//! 2. **Map**: resolve child issue numbers to ticket keys
//! 3. **Diff**: compare wanted children with the links JIRA reports
//! 4. **Apply**: create missing links, delete stale ones

pub mod children;
pub mod mapper;
pub mod reconciler;

pub use children::{find_child_references, issues_section, ChildLinkExtractor, ISSUES_HEADING};
pub use mapper::{ticket_key, IssueTicketMap};
pub use reconciler::{
    desired_children, reconcile, LinkAction, LinkFailure, ReconcileOutcome, SkipReason,
};
