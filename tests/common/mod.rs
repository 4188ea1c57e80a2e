//! In-memory GitHub and JIRA stand-ins shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use jira_glue::integrations::{IssueTracker, TicketSystem};
use jira_glue::model::{Issue, IssueState, NewTicket, RepoName, TicketLink, TicketType};
use jira_glue::{GlueError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

pub fn repo() -> RepoName {
    RepoName::new("org", "repo")
}

pub fn issue_url(number: u64) -> String {
    format!("https://github.com/org/repo/issues/{}", number)
}

/// A feature description whose `## Issues` section links the given issues
pub fn feature_body(children: &[u64]) -> String {
    let mut body = String::from("Overview of the feature.\n\n## Issues\n");
    for n in children {
        body.push_str(&format!("- [ ] {}\n", issue_url(*n)));
    }
    body
}

#[derive(Default)]
pub struct FakeTracker {
    issues: Mutex<Vec<Issue>>,
    /// Label filters whose listing fails
    failing_filters: Mutex<HashSet<String>>,
    /// Issues whose label writes fail
    failing_label_writes: Mutex<HashSet<u64>>,
}

impl FakeTracker {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues: Mutex::new(issues),
            ..Default::default()
        }
    }

    pub fn fail_listing(&self, label: &str) {
        self.failing_filters.lock().unwrap().insert(label.to_string());
    }

    pub fn fail_label_writes(&self, number: u64) {
        self.failing_label_writes.lock().unwrap().insert(number);
    }

    pub fn issue(&self, number: u64) -> Issue {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.number == number)
            .cloned()
            .unwrap()
    }

    fn with_issue<R>(&self, number: u64, f: impl FnOnce(&mut Issue) -> R) -> Result<R> {
        let mut issues = self.issues.lock().unwrap();
        issues
            .iter_mut()
            .find(|i| i.number == number)
            .map(f)
            .ok_or_else(|| GlueError::NotFound(format!("issue #{}", number)))
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(&self, _repo: &RepoName, state: IssueState) -> Result<Vec<Issue>> {
        Ok(self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.state == state)
            .cloned()
            .collect())
    }

    async fn list_issues_with_labels(
        &self,
        _repo: &RepoName,
        labels: &[String],
    ) -> Result<Vec<Issue>> {
        let failing = self.failing_filters.lock().unwrap();
        if labels.iter().any(|l| failing.contains(l)) {
            return Err(GlueError::Api {
                service: "GitHub",
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_open() && labels.iter().all(|l| i.labels.contains(l)))
            .cloned()
            .collect())
    }

    async fn issue_labels(&self, _repo: &RepoName, number: u64) -> Result<Vec<String>> {
        self.with_issue(number, |i| i.labels.clone())
    }

    async fn get_issue(&self, _repo: &RepoName, number: u64) -> Result<Issue> {
        self.with_issue(number, |i| i.clone())
    }

    async fn add_labels(&self, _repo: &RepoName, number: u64, labels: &[String]) -> Result<()> {
        if self.failing_label_writes.lock().unwrap().contains(&number) {
            return Err(GlueError::Api {
                service: "GitHub",
                status: 500,
                message: "label write failed".to_string(),
            });
        }
        self.with_issue(number, |i| {
            for label in labels {
                if !i.labels.contains(label) {
                    i.labels.push(label.clone());
                }
            }
        })
    }

    async fn update_title(&self, _repo: &RepoName, number: u64, title: &str) -> Result<()> {
        self.with_issue(number, |i| i.title = title.to_string())
    }
}

#[derive(Debug, Clone)]
struct StoredLink {
    id: String,
    inward: String,
    outward: String,
}

#[derive(Default)]
struct TicketState {
    /// Project key → next ticket number
    counters: HashMap<String, u64>,
    tickets: BTreeMap<String, NewTicket>,
    statuses: HashMap<String, String>,
    links: Vec<StoredLink>,
    next_link_id: u64,
}

#[derive(Default)]
pub struct FakeTickets {
    state: Mutex<TicketState>,
    /// Keys whose link listing fails
    failing_fetches: Mutex<HashSet<String>>,
    /// Project → types that exist there (all types when absent)
    project_types: Mutex<HashMap<String, Vec<TicketType>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTickets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering new tickets in `project` at `next`
    pub fn with_counter(self, project: &str, next: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .counters
            .insert(project.to_string(), next);
        self
    }

    pub fn with_status(self, key: &str, status: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(key.to_string(), status.to_string());
        self
    }

    pub fn with_link(self, parent: &str, child: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_link_id += 1;
            let id = format!("L{}", state.next_link_id);
            state.links.push(StoredLink {
                id,
                inward: parent.to_string(),
                outward: child.to_string(),
            });
        }
        self
    }

    pub fn with_project_types(self, project: &str, types: Vec<TicketType>) -> Self {
        self.project_types
            .lock()
            .unwrap()
            .insert(project.to_string(), types);
        self
    }

    pub fn fail_fetch(&self, key: &str) {
        self.failing_fetches.lock().unwrap().insert(key.to_string());
    }

    /// Children of `key` (links where it is the inward side), sorted
    pub fn linked(&self, key: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut keys: Vec<String> = state
            .links
            .iter()
            .filter(|l| l.inward == key)
            .map(|l| l.outward.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Whether a link `inward → outward` exists
    pub fn has_link(&self, inward: &str, outward: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .links
            .iter()
            .any(|l| l.inward == inward && l.outward == outward)
    }

    pub fn link_count(&self) -> usize {
        self.state.lock().unwrap().links.len()
    }

    pub fn ticket(&self, key: &str) -> Option<NewTicket> {
        self.state.lock().unwrap().tickets.get(key).cloned()
    }

    pub fn ticket_count(&self) -> usize {
        self.state.lock().unwrap().tickets.len()
    }

    pub fn status_of(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().statuses.get(key).cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Calls that changed state
    pub fn mutations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.starts_with("links ") && !c.starts_with("status "))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TicketSystem for FakeTickets {
    async fn issue_type_id(&self, project: &str, ticket_type: TicketType) -> Result<String> {
        let types = self.project_types.lock().unwrap();
        match types.get(project) {
            Some(available) if available.contains(&ticket_type) => {
                Ok(format!("{}-type", ticket_type))
            }
            Some(available) if available.contains(&TicketType::Story) => {
                Ok(format!("{}-type", TicketType::Story))
            }
            Some(_) => Err(GlueError::NotFound(format!(
                "Issue type {} in project {}",
                ticket_type, project
            ))),
            None => Ok(format!("{}-type", ticket_type)),
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String> {
        let key = {
            let mut state = self.state.lock().unwrap();
            let counter = state.counters.entry(ticket.project.clone()).or_insert(1);
            let key = format!("{}-{}", ticket.project, counter);
            *counter += 1;
            state.tickets.insert(key.clone(), ticket.clone());
            state.statuses.insert(key.clone(), "To Do".to_string());
            key
        };
        self.record(format!("create_ticket {}", key));
        Ok(key)
    }

    async fn links(&self, key: &str) -> Result<Vec<TicketLink>> {
        self.record(format!("links {}", key));
        if self.failing_fetches.lock().unwrap().contains(key) {
            return Err(GlueError::Api {
                service: "JIRA",
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.inward == key)
            .map(|l| TicketLink::new(l.id.clone(), l.outward.clone()))
            .collect())
    }

    async fn create_link(&self, parent: &str, child: &str) -> Result<()> {
        self.record(format!("create_link {} {}", parent, child));
        let mut state = self.state.lock().unwrap();
        state.next_link_id += 1;
        let id = format!("L{}", state.next_link_id);
        state.links.push(StoredLink {
            id,
            inward: parent.to_string(),
            outward: child.to_string(),
        });
        Ok(())
    }

    async fn delete_link(&self, parent: &str, link: &TicketLink) -> Result<()> {
        self.record(format!("delete_link {} {}", parent, link.key));
        let mut state = self.state.lock().unwrap();
        let before = state.links.len();
        state.links.retain(|l| l.id != link.id);
        if state.links.len() == before {
            return Err(GlueError::NotFound(format!("link {}", link.id)));
        }
        Ok(())
    }

    async fn status(&self, key: &str) -> Result<String> {
        self.record(format!("status {}", key));
        self.state
            .lock()
            .unwrap()
            .statuses
            .get(key)
            .cloned()
            .ok_or_else(|| GlueError::NotFound(format!("ticket {}", key)))
    }

    async fn close(&self, key: &str) -> Result<()> {
        self.record(format!("close {}", key));
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(key.to_string(), "Done".to_string());
        Ok(())
    }
}
