//! GitHub Issues Integration Adapter
//!
//! REST v3 client for github.com and GitHub Enterprise. Reads issues and
//! writes back the `jira-id` label and the decorated title.

use super::retry::{with_retry, RetryConfig};
use super::IssueTracker;
use crate::config::GitHubSettings;
use crate::model::{Issue, IssueState, RepoName};
use crate::{GlueError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for paginated list queries
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Per-request timeout for single issue fetches
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout for label/title updates
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Issues per page (GitHub maximum)
const PAGE_SIZE: usize = 100;

/// GitHub API client
pub struct GitHubAdapter {
    client: Client,
    rest_base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

/// GitHub issue (REST API format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Present when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct AddLabelsRequest<'a> {
    labels: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
struct UpdateTitleRequest<'a> {
    title: &'a str,
}

impl From<GitHubIssue> for Issue {
    fn from(issue: GitHubIssue) -> Self {
        let state = if issue.state.eq_ignore_ascii_case("closed") {
            IssueState::Closed
        } else {
            IssueState::Open
        };
        Issue {
            number: issue.number,
            title: issue.title,
            description: issue.body.unwrap_or_default(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            state,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// REST base for an instance URL: api.github.com for github.com, `/api/v3` for Enterprise
fn rest_base_url(instance_url: &str) -> String {
    let base_url = instance_url.trim_end_matches('/');
    if base_url.contains("api.github.com") {
        base_url.to_string()
    } else if base_url.ends_with("://github.com") || base_url.ends_with("://www.github.com") {
        "https://api.github.com".to_string()
    } else {
        format!("{}/api/v3", base_url)
    }
}

/// Map a non-success response to an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    };

    match status {
        StatusCode::UNAUTHORIZED => Err(GlueError::Auth(
            "GitHub authentication failed".to_string(),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(GlueError::RateLimited(
            header_u64("retry-after").unwrap_or(60),
        )),
        StatusCode::FORBIDDEN if header_u64("x-ratelimit-remaining") == Some(0) => {
            let wait = header_u64("x-ratelimit-reset")
                .map(|reset| reset.saturating_sub(Utc::now().timestamp().max(0) as u64))
                .unwrap_or(60);
            Err(GlueError::RateLimited(wait))
        }
        StatusCode::NOT_FOUND => {
            let url = response.url().path().to_string();
            Err(GlueError::NotFound(format!("GitHub resource {}", url)))
        }
        status => {
            let error_body = response.text().await.unwrap_or_default();
            Err(GlueError::Api {
                service: "GitHub",
                status: status.as_u16(),
                message: error_body,
            })
        }
    }
}

impl GitHubAdapter {
    /// Create a new GitHub adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &GitHubSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static(concat!("jira-glue/", env!("CARGO_PKG_VERSION"))),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github.v3+json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            rest_base_url: rest_base_url(&settings.url),
            auth_token: None,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the adapter at a different REST base (proxies, test servers)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn api_url(&self) -> &str {
        &self.rest_base_url
    }

    fn issues_url(&self, repo: &RepoName) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.rest_base_url,
            repo.owner(),
            repo.name()
        )
    }

    /// Send a request built by `build`, retrying transient failures
    async fn send<F>(&self, operation: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        with_retry(&self.retry, operation, || {
            let mut request = build(&self.client);
            if let Some(ref token) = self.auth_token {
                request = request.bearer_auth(token);
            }
            async move { check_status(request.send().await?).await }
        })
        .await
    }

    /// Fetch every page of an issue listing
    async fn list_pages(&self, repo: &RepoName, query: &[(&str, String)]) -> Result<Vec<Issue>> {
        let url = self.issues_url(repo);
        let mut issues = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .send("github.list_issues", |client| {
                    client
                        .get(&url)
                        .query(query)
                        .query(&[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())])
                        .timeout(LIST_TIMEOUT)
                })
                .await?;
            let batch: Vec<GitHubIssue> = response.json().await?;
            let count = batch.len();

            issues.extend(
                batch
                    .into_iter()
                    .filter(|issue| issue.pull_request.is_none())
                    .map(Issue::from),
            );

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(issues)
    }
}

#[async_trait]
impl IssueTracker for GitHubAdapter {
    async fn list_issues(&self, repo: &RepoName, state: IssueState) -> Result<Vec<Issue>> {
        debug!(repo = %repo, state = %state, "Listing GitHub issues");
        let issues = self
            .list_pages(repo, &[("state", state.as_str().to_string())])
            .await?;
        info!(repo = %repo, state = %state, count = issues.len(), "Listed GitHub issues");
        Ok(issues)
    }

    async fn list_issues_with_labels(
        &self,
        repo: &RepoName,
        labels: &[String],
    ) -> Result<Vec<Issue>> {
        debug!(repo = %repo, labels = ?labels, "Listing labelled GitHub issues");
        let issues = self
            .list_pages(
                repo,
                &[
                    ("state", "open".to_string()),
                    ("labels", labels.join(",")),
                ],
            )
            .await?;
        info!(repo = %repo, labels = ?labels, count = issues.len(), "Listed labelled GitHub issues");
        Ok(issues)
    }

    async fn issue_labels(&self, repo: &RepoName, number: u64) -> Result<Vec<String>> {
        let url = format!("{}/{}/labels", self.issues_url(repo), number);

        debug!(repo = %repo, number, "Fetching GitHub issue labels");

        let response = self
            .send("github.issue_labels", |client| {
                client
                    .get(&url)
                    .query(&[("per_page", PAGE_SIZE.to_string())])
                    .timeout(GET_TIMEOUT)
            })
            .await?;
        let labels: Vec<GitHubLabel> = response.json().await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn get_issue(&self, repo: &RepoName, number: u64) -> Result<Issue> {
        let url = format!("{}/{}", self.issues_url(repo), number);

        debug!(repo = %repo, number, "Fetching GitHub issue");

        let response = self
            .send("github.get_issue", |client| client.get(&url).timeout(GET_TIMEOUT))
            .await?;
        let issue: GitHubIssue = response.json().await?;
        Ok(issue.into())
    }

    async fn add_labels(&self, repo: &RepoName, number: u64, labels: &[String]) -> Result<()> {
        let url = format!("{}/{}/labels", self.issues_url(repo), number);
        let body = AddLabelsRequest { labels };

        info!(repo = %repo, number, labels = ?labels, "Adding labels to GitHub issue");

        self.send("github.add_labels", |client| {
            client.post(&url).json(&body).timeout(WRITE_TIMEOUT)
        })
        .await?;
        Ok(())
    }

    async fn update_title(&self, repo: &RepoName, number: u64, title: &str) -> Result<()> {
        let url = format!("{}/{}", self.issues_url(repo), number);
        let body = UpdateTitleRequest { title };

        info!(repo = %repo, number, title = %title, "Updating GitHub issue title");

        self.send("github.update_title", |client| {
            client.patch(&url).json(&body).timeout(WRITE_TIMEOUT)
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_github_urls() {
        assert_eq!(rest_base_url("https://github.com"), "https://api.github.com");
        assert_eq!(rest_base_url("https://github.com/"), "https://api.github.com");
        assert_eq!(rest_base_url("https://api.github.com"), "https://api.github.com");
    }

    #[test]
    fn test_enterprise_urls() {
        assert_eq!(
            rest_base_url("https://github.example.com"),
            "https://github.example.com/api/v3"
        );
        // A host that merely contains "github.com" is still Enterprise
        assert_eq!(
            rest_base_url("https://github.company.com"),
            "https://github.company.com/api/v3"
        );
    }

    #[test]
    fn test_adapter_creation() {
        let adapter = GitHubAdapter::new(&GitHubSettings::default())
            .expect("Failed to create adapter")
            .with_token("ghp_test");
        assert!(adapter.is_authenticated());
        assert_eq!(adapter.api_url(), "https://api.github.com");

        let repo = RepoName::new("org", "repo");
        assert_eq!(
            adapter.issues_url(&repo),
            "https://api.github.com/repos/org/repo/issues"
        );
    }

    #[test]
    fn test_issue_conversion() {
        let json = serde_json::json!({
            "number": 11,
            "title": "[LEG-2] Login",
            "body": null,
            "state": "closed",
            "labels": [{"name": "jira-id: LEG-2", "color": "ededed"}, {"name": "feature"}],
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z"
        });
        let issue: Issue = serde_json::from_value::<GitHubIssue>(json).unwrap().into();

        assert_eq!(issue.number, 11);
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.description, "");
        assert_eq!(issue.labels, vec!["jira-id: LEG-2", "feature"]);
        assert!(issue.created_at.is_some());
    }
}
