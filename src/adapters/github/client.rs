//! GitHub HTTP client with rate limiting.
//!
//! Issues and the repository comment feed use REST v3 with `per_page=100`
//! and `Link: <...>; rel="next"` pagination. Discussions use GraphQL with
//! `pageInfo` cursors. A token bucket keeps the client under the hourly
//! budget; when GitHub still reports the limit as exhausted, the request is
//! retried once after the advertised reset.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GitHubConfig, RepoRef};
use crate::domain::ports::{IssueState, Page, PageToken, RemoteClient};

use super::graphql::{DISCUSSIONS_QUERY, DISCUSSION_COMMENTS_QUERY};

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;
/// Upper bound on a single wait for `X-RateLimit-Reset`.
const DEFAULT_MAX_RESET_WAIT: Duration = Duration::from_secs(15 * 60);

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    /// Create a limiter with a full bucket.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Tokens left in the current window.
    pub const fn available(&self) -> u32 {
        self.tokens
    }

    /// Take one token, sleeping until the window rolls over if none is left.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
            return;
        }

        let remaining = self.window.saturating_sub(elapsed);
        tracing::warn!(
            sleep_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            "client-side request budget exhausted, sleeping"
        );
        tokio::time::sleep(remaining).await;
        self.tokens = self.capacity.saturating_sub(1);
        self.window_start = Instant::now();
    }
}

/// GitHub client implementing [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    token: String,
    api_base: String,
    graphql_url: String,
    user_agent: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    max_reset_wait: Duration,
}

impl GitHubClient {
    /// Build a client from configuration.
    ///
    /// Fails when no token is configured.
    pub fn from_config(config: &GitHubConfig) -> DomainResult<Self> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                DomainError::ValidationFailed(
                    "GitHub token required: set GITHUB_TOKEN or github.token".to_string(),
                )
            })?;

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DomainError::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token: token.to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            graphql_url: config.graphql_url.clone(),
            user_agent: config.user_agent.clone(),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                config.requests_per_hour.max(1),
                Duration::from_secs(3_600),
            ))),
            max_reset_wait: DEFAULT_MAX_RESET_WAIT,
        })
    }

    /// Cap how long a single `X-RateLimit-Reset` wait may last.
    #[must_use]
    pub const fn with_max_reset_wait(mut self, max: Duration) -> Self {
        self.max_reset_wait = max;
        self
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", &self.user_agent)
    }

    async fn send_once(
        &self,
        op: &str,
        build: &(dyn Fn() -> RequestBuilder + Send + Sync),
    ) -> DomainResult<Response> {
        self.rate_limiter.lock().await.acquire().await;
        self.authorized(build())
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("GitHub {op} request failed: {e}")))
    }

    /// Send a request, honouring one server-side rate-limit reset.
    async fn execute(
        &self,
        op: &str,
        build: &(dyn Fn() -> RequestBuilder + Send + Sync),
    ) -> DomainResult<Response> {
        let mut resp = self.send_once(op, build).await?;

        if let Some(wait) = rate_limit_wait(resp.status(), resp.headers(), self.max_reset_wait) {
            tracing::warn!(
                op,
                wait_secs = wait.as_secs(),
                "GitHub rate limit exhausted, waiting for reset"
            );
            tokio::time::sleep(wait).await;
            resp = self.send_once(op, build).await?;
            if is_rate_limited(resp.status(), resp.headers()) {
                return Err(DomainError::RateLimited(format!(
                    "GitHub {op} still rate limited after waiting for reset"
                )));
            }
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Remote(format!(
                "GitHub {op} returned {status}: {body}"
            )));
        }

        Ok(resp)
    }

    async fn rest_page(
        &self,
        op: &str,
        first_url: String,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let url = page.map_or(first_url, |token| token.0.clone());
        let http = self.http.clone();
        let build = move || http.get(&url);
        let resp = self.execute(op, &build).await?;

        let next = resp
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(next_link)
            .map(PageToken);

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DomainError::Remote(format!("GitHub {op} parse failed: {e}")))?;
        let Value::Array(items) = body else {
            return Err(DomainError::Remote(format!(
                "GitHub {op} returned a non-array body"
            )));
        };

        tracing::debug!(op, count = items.len(), has_next = next.is_some(), "fetched page");
        Ok(Page { items, next })
    }

    async fn graphql(&self, op: &str, query: &'static str, variables: Value) -> DomainResult<Value> {
        let http = self.http.clone();
        let url = self.graphql_url.clone();
        let body = json!({ "query": query, "variables": variables });
        let build = move || http.post(&url).json(&body);
        let resp = self.execute(op, &build).await?;

        let mut payload: Value = resp
            .json()
            .await
            .map_err(|e| DomainError::Remote(format!("GitHub {op} parse failed: {e}")))?;

        if let Some(errors) = payload.get("errors").filter(|e| !e.is_null()) {
            return Err(DomainError::Remote(format!("GitHub {op} GraphQL errors: {errors}")));
        }
        Ok(payload.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }

    fn repo_url(&self, repo: &RepoRef, tail: &str) -> String {
        format!("{}/repos/{}/{}/{tail}", self.api_base, repo.owner, repo.name)
    }
}

#[async_trait]
impl RemoteClient for GitHubClient {
    async fn issues_page(
        &self,
        repo: &RepoRef,
        state: IssueState,
        since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let mut url = self.repo_url(
            repo,
            &format!("issues?state={}&per_page={PER_PAGE}", state.as_str()),
        );
        if let Some(since) = since {
            url.push_str(&format!("&since={}", iso8601(since)));
        }
        self.rest_page("list_issues", url, page).await
    }

    async fn issue_comments_page(
        &self,
        repo: &RepoRef,
        since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let mut url = self.repo_url(repo, &format!("issues/comments?per_page={PER_PAGE}"));
        if let Some(since) = since {
            url.push_str(&format!("&since={}", iso8601(since)));
        }
        self.rest_page("list_issue_comments", url, page).await
    }

    async fn comments_for_issue_page(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let url = self.repo_url(
            repo,
            &format!("issues/{issue_number}/comments?per_page={PER_PAGE}"),
        );
        self.rest_page("list_comments_for_issue", url, page).await
    }

    async fn discussions_page(
        &self,
        repo: &RepoRef,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let data = self
            .graphql(
                "list_discussions",
                DISCUSSIONS_QUERY,
                json!({
                    "owner": repo.owner,
                    "repo": repo.name,
                    "cursor": page.map(|p| p.0.as_str()),
                }),
            )
            .await?;

        let Some(repository) = data.get("repository").filter(|r| !r.is_null()) else {
            tracing::warn!(repository = %repo, "repository not found or discussions disabled");
            return Ok(Page::default());
        };
        connection_page(repository.get("discussions"))
    }

    async fn discussion_comments_page(
        &self,
        repo: &RepoRef,
        discussion_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let data = self
            .graphql(
                "list_discussion_comments",
                DISCUSSION_COMMENTS_QUERY,
                json!({
                    "owner": repo.owner,
                    "repo": repo.name,
                    "number": discussion_number,
                    "cursor": page.map(|p| p.0.as_str()),
                }),
            )
            .await?;

        let discussion = data
            .get("repository")
            .and_then(|r| r.get("discussion"))
            .filter(|d| !d.is_null());
        let Some(discussion) = discussion else {
            tracing::debug!(repository = %repo, discussion_number, "discussion not found");
            return Ok(Page::default());
        };
        connection_page(discussion.get("comments"))
    }
}

/// Turn a GraphQL connection (`nodes` + `pageInfo`) into a page.
fn connection_page(connection: Option<&Value>) -> DomainResult<Page> {
    let Some(connection) = connection.filter(|c| !c.is_null()) else {
        return Ok(Page::default());
    };

    let items = match connection.get("nodes") {
        Some(Value::Array(nodes)) => nodes.iter().filter(|n| !n.is_null()).cloned().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(DomainError::Remote(format!(
                "GraphQL connection nodes is not a list: {other}"
            )))
        }
    };

    let page_info = connection.get("pageInfo");
    let has_next = page_info
        .and_then(|p| p.get("hasNextPage"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let next = if has_next {
        page_info
            .and_then(|p| p.get("endCursor"))
            .and_then(Value::as_str)
            .map(|c| PageToken(c.to_string()))
    } else {
        None
    };

    Ok(Page { items, next })
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_link(header: &str) -> Option<String> {
    header
        .split(',')
        .find(|part| part.contains(r#"rel="next""#))
        .and_then(|part| {
            let start = part.find('<')? + 1;
            let end = part.find('>')?;
            (start < end).then(|| part[start..end].to_string())
        })
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0")
}

/// How long to wait before retrying, when the response is a rate-limit rejection.
fn rate_limit_wait(status: StatusCode, headers: &HeaderMap, cap: Duration) -> Option<Duration> {
    if !is_rate_limited(status, headers) {
        return None;
    }
    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0);
    let until_reset = u64::try_from(reset - Utc::now().timestamp()).unwrap_or(0);
    Some(Duration::from_secs(until_reset + 1).min(cap))
}

fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
