//! jira-glue - mirror GitHub issues into JIRA
//!
//! Creates one JIRA ticket per GitHub issue, records the ticket key on the
//! issue as a `jira-id: KEY` label and `[KEY]` title prefix, and keeps JIRA
//! links between feature tickets and their children in line with the
//! `## Issues` section of each feature description.
//!
//! # Architecture
//!
//! - **labels**: label and title conventions
//! - **hierarchy**: child extraction, issue → ticket mapping, link reconciliation
//! - **integrations**: GitHub and JIRA adapters behind `IssueTracker` / `TicketSystem`
//! - **sync**: batch passes over a repository (tickets, hierarchy, close)
//! - **config**: YAML config file, environment overrides, credentials

pub mod commands;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod integrations;
pub mod labels;
pub mod logging;
pub mod model;
pub mod sync;

// Re-exports
pub use error::{GlueError, Result};
