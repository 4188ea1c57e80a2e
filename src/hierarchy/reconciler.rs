//! Parent/child link reconciliation
//!
//! The desired link set is re-derived from the feature description on every
//! run and the current link set is re-fetched from JIRA, so the diff is
//! idempotent and a failed create or delete is simply retried next run.

use super::mapper::IssueTicketMap;
use crate::integrations::TicketSystem;
use crate::model::{ChildReference, TicketLink};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Why a child reference contributed nothing to the desired set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The child issue has no ticket yet (or lives in another repository)
    Unresolved,
    /// The child resolves to the parent's own ticket
    SelfReference,
}

/// A link create or delete that JIRA rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    pub child: String,
    pub action: LinkAction,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Create,
    Delete,
}

/// Per-parent reconciliation result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub parent: String,
    pub created_links: Vec<String>,
    pub removed_links: Vec<String>,
    pub failures: Vec<LinkFailure>,
    pub skipped: Vec<(ChildReference, SkipReason)>,
}

impl ReconcileOutcome {
    pub fn created(&self) -> usize {
        self.created_links.len()
    }

    pub fn removed(&self) -> usize {
        self.removed_links.len()
    }

    pub fn is_noop(&self) -> bool {
        self.created_links.is_empty() && self.removed_links.is_empty() && self.failures.is_empty()
    }
}

/// Child ticket keys wanted under `parent`
///
/// Returns the key set plus the references that could not contribute.
pub fn desired_children(
    parent: &str,
    children: &[ChildReference],
    resolved: &IssueTicketMap,
) -> (BTreeSet<String>, Vec<(ChildReference, SkipReason)>) {
    let mut desired = BTreeSet::new();
    let mut skipped = Vec::new();

    for child in children {
        match resolved.resolve(child) {
            Some(key) if key == parent => {
                debug!(parent, child = %child, "Skipping self-reference");
                skipped.push((child.clone(), SkipReason::SelfReference));
            }
            Some(key) => {
                desired.insert(key.to_string());
            }
            None => {
                debug!(parent, child = %child, "Child has no ticket yet, skipping");
                skipped.push((child.clone(), SkipReason::Unresolved));
            }
        }
    }

    (desired, skipped)
}

/// Make the links of `parent` equal to the tickets resolvable from `children`
///
/// Fails only when the current link set cannot be fetched. Individual
/// create/delete failures are recorded in the outcome and do not stop the
/// remaining calls.
pub async fn reconcile<T: TicketSystem + ?Sized>(
    tickets: &T,
    parent: &str,
    children: &[ChildReference],
    resolved: &IssueTicketMap,
) -> Result<ReconcileOutcome> {
    let (desired, skipped) = desired_children(parent, children, resolved);

    // Keyed by child; JIRA allows several links of one type to the same child
    let mut current: BTreeMap<String, Vec<TicketLink>> = BTreeMap::new();
    for link in tickets.links(parent).await? {
        current.entry(link.key.clone()).or_default().push(link);
    }

    let mut outcome = ReconcileOutcome {
        parent: parent.to_string(),
        skipped,
        ..Default::default()
    };

    for child in desired.iter().filter(|key| !current.contains_key(*key)) {
        match tickets.create_link(parent, child).await {
            Ok(()) => {
                info!(parent, child = %child, "Linked child ticket");
                outcome.created_links.push(child.clone());
            }
            Err(e) => {
                warn!(parent, child = %child, error = %e, "Failed to link child ticket");
                outcome.failures.push(LinkFailure {
                    child: child.clone(),
                    action: LinkAction::Create,
                    error: e.to_string(),
                });
            }
        }
    }

    let stale = current
        .iter()
        .filter(|(key, _)| !desired.contains(*key))
        .flat_map(|(child, links)| links.iter().map(move |link| (child, link)));
    for (child, link) in stale {
        match tickets.delete_link(parent, link).await {
            Ok(()) => {
                info!(parent, child = %child, "Unlinked stale child ticket");
                outcome.removed_links.push(child.clone());
            }
            Err(e) => {
                warn!(parent, child = %child, error = %e, "Failed to unlink child ticket");
                outcome.failures.push(LinkFailure {
                    child: child.clone(),
                    action: LinkAction::Delete,
                    error: e.to_string(),
                });
            }
        }
    }

    debug!(
        parent,
        desired = desired.len(),
        current = current.len(),
        created = outcome.created(),
        removed = outcome.removed(),
        failed = outcome.failures.len(),
        "Reconciled links"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::TicketSystem;
    use crate::model::{Issue, NewTicket, RepoName, TicketType};
    use crate::GlueError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Link store for a single parent
    #[derive(Default)]
    struct FakeLinks {
        linked: Mutex<Vec<TicketLink>>,
        next_id: Mutex<u32>,
        fail_fetch: bool,
        fail_create: HashSet<String>,
        fail_delete: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLinks {
        fn with_links(keys: &[&str]) -> Self {
            let fake = Self::default();
            for key in keys {
                fake.push(key);
            }
            fake
        }

        fn push(&self, key: &str) {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            self.linked
                .lock()
                .unwrap()
                .push(TicketLink::new(format!("link-{}", next_id), key));
        }

        fn linked(&self) -> BTreeSet<String> {
            self.linked.lock().unwrap().iter().map(|l| l.key.clone()).collect()
        }
    }

    #[async_trait]
    impl TicketSystem for FakeLinks {
        async fn issue_type_id(&self, _project: &str, _ticket_type: TicketType) -> Result<String> {
            unreachable!("not used by reconcile")
        }

        async fn create_ticket(&self, _ticket: &NewTicket) -> Result<String> {
            unreachable!("not used by reconcile")
        }

        async fn links(&self, _key: &str) -> Result<Vec<TicketLink>> {
            if self.fail_fetch {
                return Err(GlueError::Integration("connection reset".to_string()));
            }
            Ok(self.linked.lock().unwrap().clone())
        }

        async fn create_link(&self, _parent: &str, child: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("create {}", child));
            if self.fail_create.contains(child) {
                return Err(GlueError::Integration("link refused".to_string()));
            }
            self.push(child);
            Ok(())
        }

        async fn delete_link(&self, _parent: &str, link: &TicketLink) -> Result<()> {
            self.calls.lock().unwrap().push(format!("delete {}", link.key));
            if self.fail_delete.contains(&link.key) {
                return Err(GlueError::Integration("delete refused".to_string()));
            }
            self.linked.lock().unwrap().retain(|l| l.id != link.id);
            Ok(())
        }

        async fn status(&self, _key: &str) -> Result<String> {
            unreachable!("not used by reconcile")
        }

        async fn close(&self, _key: &str) -> Result<()> {
            unreachable!("not used by reconcile")
        }
    }

    fn repo() -> RepoName {
        RepoName::new("org", "repo")
    }

    fn child(number: u64) -> ChildReference {
        ChildReference::new(repo(), number)
    }

    /// Issues #1..#n titled [LEG-1]..[LEG-n]
    fn map_of(n: u64) -> IssueTicketMap {
        let issues: Vec<Issue> = (1..=n)
            .map(|i| Issue::new(i, format!("[LEG-{}] Issue {}", i, i)))
            .collect();
        IssueTicketMap::build(repo(), &issues)
    }

    #[tokio::test]
    async fn test_creates_missing_and_removes_stale() {
        // desired = {LEG-2, LEG-3}, current = {LEG-3, LEG-4}
        let fake = FakeLinks::with_links(&["LEG-3", "LEG-4"]);
        let outcome = reconcile(&fake, "LEG-1", &[child(2), child(3)], &map_of(4))
            .await
            .unwrap();

        assert_eq!(outcome.created_links, vec!["LEG-2".to_string()]);
        assert_eq!(outcome.removed_links, vec!["LEG-4".to_string()]);
        assert_eq!((outcome.created(), outcome.removed()), (1, 1));
        assert!(outcome.failures.is_empty());
        assert_eq!(
            fake.linked(),
            BTreeSet::from(["LEG-2".to_string(), "LEG-3".to_string()])
        );
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let fake = FakeLinks::with_links(&["LEG-4"]);
        let children = [child(2), child(3)];
        let map = map_of(4);

        let first = reconcile(&fake, "LEG-1", &children, &map).await.unwrap();
        assert_eq!((first.created(), first.removed()), (2, 1));

        let second = reconcile(&fake, "LEG-1", &children, &map).await.unwrap();
        assert_eq!((second.created(), second.removed()), (0, 0));
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn test_duplicate_references_collapse() {
        let fake = FakeLinks::default();
        let outcome = reconcile(&fake, "LEG-1", &[child(2), child(2), child(2)], &map_of(2))
            .await
            .unwrap();

        assert_eq!(outcome.created(), 1);
        assert_eq!(fake.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_child_is_skipped() {
        let fake = FakeLinks::default();
        let outcome = reconcile(&fake, "LEG-1", &[child(2), child(99)], &map_of(2))
            .await
            .unwrap();

        assert_eq!(outcome.created_links, vec!["LEG-2".to_string()]);
        assert_eq!(outcome.skipped, vec![(child(99), SkipReason::Unresolved)]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_self_reference_is_skipped() {
        let fake = FakeLinks::default();
        let outcome = reconcile(&fake, "LEG-1", &[child(1)], &map_of(1))
            .await
            .unwrap();

        assert_eq!(outcome.created(), 0);
        assert_eq!(outcome.skipped, vec![(child(1), SkipReason::SelfReference)]);
    }

    #[tokio::test]
    async fn test_empty_section_removes_all_links() {
        let fake = FakeLinks::with_links(&["LEG-2", "LEG-3"]);
        let outcome = reconcile(&fake, "LEG-1", &[], &map_of(3)).await.unwrap();

        assert_eq!(outcome.removed(), 2);
        assert!(fake.linked().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_stale_links_are_all_removed() {
        let fake = FakeLinks::with_links(&["LEG-2", "LEG-4", "LEG-4"]);
        let outcome = reconcile(&fake, "LEG-1", &[child(2)], &map_of(4))
            .await
            .unwrap();

        assert_eq!(outcome.removed_links, vec!["LEG-4".to_string(), "LEG-4".to_string()]);
        assert_eq!(fake.linked(), BTreeSet::from(["LEG-2".to_string()]));

        let second = reconcile(&fake, "LEG-1", &[child(2)], &map_of(4))
            .await
            .unwrap();
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_parent() {
        let fake = FakeLinks {
            fail_fetch: true,
            ..Default::default()
        };
        let result = reconcile(&fake, "LEG-1", &[child(2)], &map_of(2)).await;

        assert!(result.is_err());
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_short_circuit() {
        let fake = FakeLinks {
            fail_create: HashSet::from(["LEG-2".to_string()]),
            fail_delete: HashSet::from(["LEG-5".to_string()]),
            ..FakeLinks::with_links(&["LEG-5", "LEG-6"])
        };
        let outcome = reconcile(&fake, "LEG-1", &[child(2), child(3)], &map_of(6))
            .await
            .unwrap();

        assert_eq!(outcome.created_links, vec!["LEG-3".to_string()]);
        assert_eq!(outcome.removed_links, vec!["LEG-6".to_string()]);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].action, LinkAction::Create);
        assert_eq!(outcome.failures[0].child, "LEG-2");
        assert_eq!(outcome.failures[1].action, LinkAction::Delete);
        assert_eq!(outcome.failures[1].child, "LEG-5");
        assert_eq!(fake.calls.lock().unwrap().len(), 4);
    }
}
