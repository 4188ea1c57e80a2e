//! JIRA Integration Adapter
//!
//! REST v2 client: ticket creation, issue-type resolution, hierarchy links
//! and closing transitions.

use super::cache::{IssueTypeCache, IssueTypeTable, MemoryIssueTypeCache};
use super::retry::{with_retry, RetryConfig};
use super::TicketSystem;
use crate::config::JiraSettings;
use crate::model::{NewTicket, TicketLink, TicketType};
use crate::{GlueError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for single ticket/project fetches
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout for create/update operations
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// JIRA API client
pub struct JiraAdapter {
    client: Client,
    base_url: String,
    user: Option<String>,
    auth_token: Option<String>,
    link_type: String,
    done_status: String,
    fallback_type: TicketType,
    type_cache: Arc<dyn IssueTypeCache>,
    retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct JiraProject {
    #[serde(rename = "issueTypes", default)]
    issue_types: Vec<JiraIssueType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraKeyRef {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkType {
    pub name: String,
}

/// An entry of a ticket's `issuelinks` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueLink {
    pub id: String,
    #[serde(rename = "type")]
    pub link_type: JiraLinkType,
    #[serde(rename = "inwardIssue", default)]
    pub inward_issue: Option<JiraKeyRef>,
    #[serde(rename = "outwardIssue", default)]
    pub outward_issue: Option<JiraKeyRef>,
}

impl JiraIssueLink {
    /// Key of the linked ticket when the fetched ticket is the inward side
    ///
    /// Parents are created as the inward issue, so only these entries are
    /// links the parent owns. Links pointing into the ticket return `None`.
    pub fn outward_key(&self) -> Option<&str> {
        self.outward_issue.as_ref().map(|r| r.key.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct JiraFields {
    #[serde(default)]
    issuelinks: Vec<JiraIssueLink>,
    #[serde(default)]
    status: Option<JiraStatus>,
}

#[derive(Debug, Clone, Deserialize)]
struct JiraIssue {
    #[serde(default)]
    fields: JiraFields,
}

#[derive(Debug, Clone, Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
    pub to: JiraStatus,
}

#[derive(Debug, Clone, Deserialize)]
struct JiraTransitionsResponse {
    transitions: Vec<JiraTransition>,
}

#[derive(Debug, Clone, Serialize)]
struct CreateLinkRequest<'a> {
    #[serde(rename = "type")]
    link_type: LinkTypeName<'a>,
    #[serde(rename = "inwardIssue")]
    inward_issue: KeyRef<'a>,
    #[serde(rename = "outwardIssue")]
    outward_issue: KeyRef<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct LinkTypeName<'a> {
    name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct KeyRef<'a> {
    key: &'a str,
}

/// Map a non-success response to an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(GlueError::Auth("JIRA authentication failed".to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            Err(GlueError::RateLimited(retry_after))
        }
        StatusCode::NOT_FOUND => {
            let path = response.url().path().to_string();
            Err(GlueError::NotFound(format!("JIRA resource {}", path)))
        }
        status => {
            let error_body = response.text().await.unwrap_or_default();
            Err(GlueError::Api {
                service: "JIRA",
                status: status.as_u16(),
                message: error_body,
            })
        }
    }
}

/// Lowercased name → id table for a project's issue types
fn type_table(types: Vec<JiraIssueType>) -> IssueTypeTable {
    types
        .into_iter()
        .map(|t| (t.name.to_lowercase(), t.id))
        .collect()
}

impl JiraAdapter {
    /// Create a new JIRA adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &JiraSettings) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/api/2", settings.url.trim_end_matches('/')),
            user: None,
            auth_token: None,
            link_type: settings.link_type.clone(),
            done_status: settings.done_status.clone(),
            fallback_type: settings.fallback_type,
            type_cache: Arc::new(MemoryIssueTypeCache::new()),
            retry: RetryConfig::default(),
        })
    }

    /// Authenticate with a token; with a user the pair is sent as basic auth
    pub fn with_credentials(mut self, user: Option<String>, token: impl Into<String>) -> Self {
        self.user = user;
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_type_cache(mut self, cache: Arc<dyn IssueTypeCache>) -> Self {
        self.type_cache = cache;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn link_type(&self) -> &str {
        &self.link_type
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.user, &self.auth_token) {
            (Some(user), Some(token)) => request.basic_auth(user, Some(token)),
            (None, Some(token)) => request.bearer_auth(token),
            _ => request,
        }
    }

    /// Send a request built by `build`, retrying transient failures
    async fn send<F>(&self, operation: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        with_retry(&self.retry, operation, || {
            let request = self.authorize(build(&self.client));
            async move { check_status(request.send().await?).await }
        })
        .await
    }

    /// Fetch a project's issue types
    async fn fetch_issue_types(&self, project: &str) -> Result<IssueTypeTable> {
        let url = format!("{}/project/{}", self.base_url, project);

        debug!(project = %project, "Fetching JIRA issue types");

        let response = self
            .send("jira.project", |client| client.get(&url).timeout(GET_TIMEOUT))
            .await?;
        let project_info: JiraProject = response.json().await?;
        Ok(type_table(project_info.issue_types))
    }

    /// Issue type table for `project`, fetched and cached on a miss
    async fn issue_types(&self, project: &str) -> Result<IssueTypeTable> {
        if let Some(table) = self.type_cache.get(project) {
            return Ok(table);
        }
        let table = self.fetch_issue_types(project).await?;
        self.type_cache.insert(project, table.clone());
        Ok(table)
    }

    /// Ticket fields, restricted to `fields`
    async fn fetch_fields(&self, key: &str, fields: &str) -> Result<JiraFields> {
        let url = format!("{}/issue/{}", self.base_url, key);

        let response = self
            .send("jira.get_issue", |client| {
                client
                    .get(&url)
                    .query(&[("fields", fields)])
                    .timeout(GET_TIMEOUT)
            })
            .await?;
        let issue: JiraIssue = response.json().await?;
        Ok(issue.fields)
    }

    /// Transitions currently available on a ticket
    pub async fn transitions(&self, key: &str) -> Result<Vec<JiraTransition>> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);

        let response = self
            .send("jira.transitions", |client| client.get(&url).timeout(GET_TIMEOUT))
            .await?;
        let result: JiraTransitionsResponse = response.json().await?;
        Ok(result.transitions)
    }

    /// Apply a transition by id
    pub async fn transition(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);
        let body = serde_json::json!({ "transition": { "id": transition_id } });

        info!(key = %key, transition_id = %transition_id, "Transitioning JIRA ticket");

        self.send("jira.transition", |client| {
            client.post(&url).json(&body).timeout(WRITE_TIMEOUT)
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TicketSystem for JiraAdapter {
    async fn issue_type_id(&self, project: &str, ticket_type: TicketType) -> Result<String> {
        let table = self.issue_types(project).await?;
        let wanted = ticket_type.jira_name().to_lowercase();

        if let Some(id) = table.get(&wanted) {
            return Ok(id.clone());
        }

        let fallback = self.fallback_type.jira_name().to_lowercase();
        match table.get(&fallback) {
            Some(id) => {
                warn!(
                    project = %project,
                    wanted = %ticket_type,
                    fallback = %self.fallback_type,
                    "Issue type missing in project, using fallback"
                );
                Ok(id.clone())
            }
            None => Err(GlueError::NotFound(format!(
                "Issue type {} (or fallback {}) in project {}",
                ticket_type, self.fallback_type, project
            ))),
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String> {
        let url = format!("{}/issue", self.base_url);
        let body = serde_json::json!({
            "fields": {
                "project": { "key": ticket.project },
                "issuetype": { "id": ticket.type_id },
                "summary": ticket.summary,
                "description": ticket.description,
            }
        });

        info!(project = %ticket.project, summary = %ticket.summary, "Creating JIRA ticket");

        let response = self
            .send("jira.create_issue", |client| {
                client.post(&url).json(&body).timeout(WRITE_TIMEOUT)
            })
            .await?;
        let created: CreatedIssue = response.json().await?;

        info!(key = %created.key, "JIRA ticket created");
        Ok(created.key)
    }

    async fn links(&self, key: &str) -> Result<Vec<TicketLink>> {
        debug!(key = %key, link_type = %self.link_type, "Fetching JIRA links");

        let fields = self.fetch_fields(key, "issuelinks").await?;
        Ok(fields
            .issuelinks
            .into_iter()
            .filter(|link| link.link_type.name.eq_ignore_ascii_case(&self.link_type))
            .filter_map(|link| {
                let child = link.outward_key()?.to_string();
                Some(TicketLink::new(link.id, child))
            })
            .collect())
    }

    async fn create_link(&self, parent: &str, child: &str) -> Result<()> {
        let url = format!("{}/issueLink", self.base_url);
        let body = CreateLinkRequest {
            link_type: LinkTypeName {
                name: &self.link_type,
            },
            inward_issue: KeyRef { key: parent },
            outward_issue: KeyRef { key: child },
        };

        debug!(parent = %parent, child = %child, "Creating JIRA link");

        self.send("jira.create_link", |client| {
            client.post(&url).json(&body).timeout(WRITE_TIMEOUT)
        })
        .await?;
        Ok(())
    }

    async fn delete_link(&self, parent: &str, link: &TicketLink) -> Result<()> {
        let url = format!("{}/issueLink/{}", self.base_url, link.id);

        debug!(parent = %parent, child = %link.key, link_id = %link.id, "Deleting JIRA link");

        self.send("jira.delete_link", |client| {
            client.delete(&url).timeout(WRITE_TIMEOUT)
        })
        .await?;
        Ok(())
    }

    async fn status(&self, key: &str) -> Result<String> {
        let fields = self.fetch_fields(key, "status").await?;
        fields
            .status
            .map(|s| s.name)
            .ok_or_else(|| GlueError::Integration(format!("JIRA ticket {} has no status", key)))
    }

    async fn close(&self, key: &str) -> Result<()> {
        let transitions = self.transitions(key).await?;
        let target = transitions
            .iter()
            .find(|t| t.to.name.eq_ignore_ascii_case(&self.done_status));

        match target {
            Some(t) => self.transition(key, &t.id).await,
            None => {
                warn!(
                    key = %key,
                    target = %self.done_status,
                    available = ?transitions.iter().map(|t| &t.to.name).collect::<Vec<_>>(),
                    "No transition available to done status"
                );
                Err(GlueError::Integration(format!(
                    "No transition to {} for {}",
                    self.done_status, key
                )))
            }
        }
    }
}
