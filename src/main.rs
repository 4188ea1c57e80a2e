//! jira-glue - mirror GitHub issues into JIRA
//!
//! Main entry point for the jira-glue CLI.

use clap::Parser;
use jira_glue::commands::{Cli, Commands};
use jira_glue::config::{validate_config_result, Credentials, GlueConfig};
use jira_glue::integrations::{GitHubAdapter, JiraAdapter, MemoryIssueTypeCache};
use jira_glue::logging::{self, LogConfig, LogFormat};
use jira_glue::model::RepoName;
use jira_glue::sync::{FeatureStatus, SyncOptions, Syncer, TicketSyncAction};
use std::process;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_format(if cli.pretty_logs {
        LogFormat::Pretty
    } else {
        LogFormat::Compact
    });
    if let Err(e) = logging::init(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> jira_glue::Result<()> {
    let repo: RepoName = cli.command.repo().parse()?;

    let config = GlueConfig::resolve(cli.config.as_deref())?;
    validate_config_result(&config)?;
    let credentials = Credentials::from_env(&config)?;

    tracing::info!(repo = %repo, github = %config.github.url, jira = %config.jira.url, "Configuration loaded");

    let github = GitHubAdapter::new(&config.github)?
        .with_token(credentials.github_token.clone())
        .with_retry_config(config.retry.clone());
    let jira = JiraAdapter::new(&config.jira)?
        .with_credentials(credentials.jira_user.clone(), credentials.jira_token.clone())
        .with_type_cache(Arc::new(MemoryIssueTypeCache::new()))
        .with_retry_config(config.retry.clone());

    let syncer = Syncer::new(github, jira, SyncOptions::from_config(&config));

    match cli.command {
        Commands::Sync { boards, .. } => {
            let summary = syncer.sync_tickets(&repo, &boards).await?;
            for result in &summary.results {
                match &result.action {
                    TicketSyncAction::Created { key } => {
                        println!("  #{} → {} (created)", result.number, key)
                    }
                    TicketSyncAction::TitleRepaired { key } => {
                        println!("  #{} → {} (title repaired)", result.number, key)
                    }
                    TicketSyncAction::Failed { key, error } => println!(
                        "  #{} failed{}: {}",
                        result.number,
                        key.as_ref().map(|k| format!(" ({})", k)).unwrap_or_default(),
                        error
                    ),
                    TicketSyncAction::Unchanged { .. } | TicketSyncAction::Skipped { .. } => {}
                }
            }
            for (board, error) in &summary.board_errors {
                println!("  board {} failed: {}", board, error);
            }
            println!(
                "Synced {}: {} created, {} repaired, {} unchanged, {} skipped, {} failed",
                repo,
                summary.created(),
                summary.repaired(),
                summary.unchanged(),
                summary.skipped(),
                summary.failed()
            );
        }
        Commands::Hierarchy { issue, .. } => {
            let summary = syncer.sync_hierarchy(&repo, issue).await?;
            for feature in &summary.features {
                match &feature.status {
                    FeatureStatus::Reconciled(outcome) if !outcome.is_noop() => println!(
                        "  #{} {}: +{} -{} ({} failed)",
                        feature.number,
                        outcome.parent,
                        outcome.created(),
                        outcome.removed(),
                        outcome.failures.len()
                    ),
                    FeatureStatus::Failed { parent, error } => {
                        println!("  #{} {}: {}", feature.number, parent, error)
                    }
                    _ => {}
                }
            }
            println!(
                "Reconciled {} features in {}: {} links created, {} removed, {} failed",
                summary.reconciled(),
                repo,
                summary.created(),
                summary.removed(),
                summary.link_failures() + summary.failed_features()
            );
        }
        Commands::Close { .. } => {
            let summary = syncer.close_tickets(&repo).await?;
            println!(
                "Closed {} tickets in {} ({} already done, {} failed)",
                summary.closed(),
                repo,
                summary.already_done(),
                summary.failed()
            );
        }
    }

    Ok(())
}
