//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// jira-glue - mirror GitHub issues into JIRA tickets
#[derive(Parser, Debug)]
#[command(name = "jira-glue")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/jira-glue/config.yaml)
    #[arg(short, long, global = true, env = "JIRA_GLUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Multi-line log output with source locations
    #[arg(long, global = true)]
    pub pretty_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create JIRA tickets for open issues that don't have one yet
    Sync {
        /// Repository in owner/repo form
        #[arg(short, long)]
        repo: String,

        /// Only sync issues labelled `jira-project: <BOARD>` (repeatable)
        #[arg(short, long = "board", value_name = "BOARD")]
        boards: Vec<String>,
    },

    /// Reconcile JIRA links between feature tickets and their child tickets
    Hierarchy {
        /// Repository in owner/repo form
        #[arg(short, long)]
        repo: String,

        /// Only reconcile this feature issue
        #[arg(short, long)]
        issue: Option<u64>,
    },

    /// Move tickets of closed issues to the done status
    Close {
        /// Repository in owner/repo form
        #[arg(short, long)]
        repo: String,
    },
}

impl Commands {
    /// Repository argument shared by every subcommand
    pub fn repo(&self) -> &str {
        match self {
            Commands::Sync { repo, .. }
            | Commands::Hierarchy { repo, .. }
            | Commands::Close { repo } => repo,
        }
    }
}
