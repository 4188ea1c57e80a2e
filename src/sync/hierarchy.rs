//! Hierarchy pass: reconcile every feature of a repository

use super::Syncer;
use crate::hierarchy::{reconcile, ticket_key, ChildLinkExtractor, IssueTicketMap, ReconcileOutcome};
use crate::integrations::{IssueTracker, TicketSystem};
use crate::model::{Issue, IssueState, RepoName};
use crate::Result;
use tracing::{info, warn};

/// Result for one feature issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureResult {
    pub number: u64,
    pub status: FeatureStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureStatus {
    /// Links reconciled (possibly with individual link failures inside)
    Reconciled(ReconcileOutcome),
    /// The feature has no ticket, so there is nothing to link under
    NotSynced,
    /// The current links of the parent could not be fetched
    Failed { parent: String, error: String },
}

#[derive(Debug, Clone, Default)]
pub struct HierarchySummary {
    pub features: Vec<FeatureResult>,
}

impl HierarchySummary {
    fn outcomes(&self) -> impl Iterator<Item = &ReconcileOutcome> {
        self.features.iter().filter_map(|f| match &f.status {
            FeatureStatus::Reconciled(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn reconciled(&self) -> usize {
        self.outcomes().count()
    }

    pub fn created(&self) -> usize {
        self.outcomes().map(ReconcileOutcome::created).sum()
    }

    pub fn removed(&self) -> usize {
        self.outcomes().map(ReconcileOutcome::removed).sum()
    }

    /// Individual link calls that failed
    pub fn link_failures(&self) -> usize {
        self.outcomes().map(|o| o.failures.len()).sum()
    }

    /// Features whose reconciliation could not start
    pub fn failed_features(&self) -> usize {
        self.features
            .iter()
            .filter(|f| matches!(f.status, FeatureStatus::Failed { .. }))
            .count()
    }

    pub fn not_synced(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.status == FeatureStatus::NotSynced)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.link_failures() > 0 || self.failed_features() > 0
    }

    pub fn get(&self, number: u64) -> Option<&FeatureResult> {
        self.features.iter().find(|f| f.number == number)
    }
}

impl<I: IssueTracker, T: TicketSystem> Syncer<I, T> {
    /// Reconcile the links of every feature issue in `repo`, or of `only` that one
    ///
    /// Open and closed issues are both mapped since closed children remain
    /// valid link targets.
    pub async fn sync_hierarchy(&self, repo: &RepoName, only: Option<u64>) -> Result<HierarchySummary> {
        let mut issues = self.tracker.list_issues(repo, IssueState::Open).await?;
        issues.extend(self.tracker.list_issues(repo, IssueState::Closed).await?);

        let resolved = IssueTicketMap::build(repo.clone(), &issues);

        let features: Vec<Issue> = match only {
            Some(number) => vec![self.tracker.get_issue(repo, number).await?],
            None => issues
                .into_iter()
                .filter(|issue| self.options.is_feature(issue))
                .collect(),
        };

        info!(
            repo = %repo,
            features = features.len(),
            mapped = resolved.len(),
            "Reconciling feature hierarchy"
        );

        let extractor = ChildLinkExtractor::new(&self.options.domain);
        let mut summary = HierarchySummary::default();
        for feature in &features {
            let status = self.reconcile_feature(feature, &extractor, &resolved).await;
            summary.features.push(FeatureResult {
                number: feature.number,
                status,
            });
        }

        info!(
            repo = %repo,
            reconciled = summary.reconciled(),
            created = summary.created(),
            removed = summary.removed(),
            link_failures = summary.link_failures(),
            failed_features = summary.failed_features(),
            not_synced = summary.not_synced(),
            "Hierarchy sync complete"
        );

        Ok(summary)
    }

    async fn reconcile_feature(
        &self,
        feature: &Issue,
        extractor: &ChildLinkExtractor,
        resolved: &IssueTicketMap,
    ) -> FeatureStatus {
        let Some(parent) = ticket_key(feature) else {
            warn!(number = feature.number, "Feature has no ticket yet, skipping");
            return FeatureStatus::NotSynced;
        };

        let children = extractor.find(&feature.description);

        match reconcile(&self.tickets, &parent, &children, resolved).await {
            Ok(outcome) => FeatureStatus::Reconciled(outcome),
            Err(e) => {
                warn!(number = feature.number, parent = %parent, error = %e, "Could not fetch current links");
                FeatureStatus::Failed {
                    parent,
                    error: e.to_string(),
                }
            }
        }
    }
}
