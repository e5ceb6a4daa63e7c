//! reqwest-backed GitHub client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use labelgate_core::{
    ApiError, ApiResult, Page, PageCursor, PullRequestSnapshot, RepoCoordinates, RepositoryApi,
    Review, TeamRef,
};

use crate::link::next_link;
use crate::wire::{
    CreateReviewRequest, DismissReviewRequest, ErrorWire, PullRequestWire, ReviewWire, UserWire,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested from every list endpoint (the REST maximum).
pub const PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`GitHubClient`].
#[derive(Clone)]
pub struct GitHubConfig {
    /// REST root without a trailing slash.
    pub api_url: String,
    pub token: String,
    pub user_agent: String,
}

impl GitHubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            user_agent: format!("labelgate/{}", labelgate_core::VERSION),
        }
    }

    /// Point at a GitHub Enterprise Server (or test) endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// [`RepositoryApi`] over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> ApiResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ApiError::Transport("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;

        Ok(GitHubClient { config, http })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    fn pull_path(repo: &RepoCoordinates, number: u64) -> String {
        format!("/repos/{}/{}/pulls/{}", repo.owner, repo.repo, number)
    }

    /// Send the request; any non-2xx status becomes [`ApiError::Status`].
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        debug!(status = status.as_u16(), error = %message, "github request failed");
        Err(ApiError::status(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<(T, Option<String>)> {
        debug!(method = "GET", url = %url, "github request");
        let response = self.send(self.http.get(url)).await?;
        let next = next_link(response.headers());
        let body = response.json::<T>().await.map_err(transport)?;
        Ok((body, next))
    }

    /// Fetch one page of a listing. A cursor is the absolute URL taken from
    /// the previous response's `Link` header.
    async fn get_page<W, T>(
        &self,
        first_page: String,
        cursor: Option<&PageCursor>,
        map: impl Fn(W) -> T,
    ) -> ApiResult<Page<T>>
    where
        W: DeserializeOwned,
    {
        let url = match cursor {
            Some(cursor) => cursor.as_str().to_string(),
            None => first_page,
        };
        let (items, next): (Vec<W>, _) = self.get_json(&url).await?;
        Ok(Page {
            items: items.into_iter().map(map).collect(),
            next: next.map(PageCursor::new),
        })
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn authenticated_login(&self) -> ApiResult<String> {
        let (user, _): (UserWire, _) = self.get_json(&self.url("/user")).await?;
        Ok(user.login)
    }

    async fn pull_request(
        &self,
        repo: &RepoCoordinates,
        number: u64,
    ) -> ApiResult<PullRequestSnapshot> {
        let url = self.url(&Self::pull_path(repo, number));
        let (pull, _): (PullRequestWire, _) = self.get_json(&url).await?;
        Ok(pull.into())
    }

    async fn reviews_page(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<Review>> {
        let first = self.url(&format!(
            "{}/reviews?per_page={PER_PAGE}",
            Self::pull_path(repo, number)
        ));
        self.get_page(first, cursor, |review: ReviewWire| Review::from(review))
            .await
    }

    async fn team_members_page(
        &self,
        team: &TeamRef,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<String>> {
        let first = self.url(&format!(
            "/orgs/{}/teams/{}/members?per_page={PER_PAGE}",
            team.org, team.slug
        ));
        self.get_page(first, cursor, |user: UserWire| user.login)
            .await
    }

    async fn create_approval_review(&self, repo: &RepoCoordinates, number: u64) -> ApiResult<()> {
        let url = self.url(&format!("{}/reviews", Self::pull_path(repo, number)));
        debug!(method = "POST", url = %url, "github request");
        self.send(self.http.post(&url).json(&CreateReviewRequest::approve()))
            .await?;
        Ok(())
    }

    async fn dismiss_review(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        review_id: u64,
        message: &str,
    ) -> ApiResult<()> {
        let url = self.url(&format!(
            "{}/reviews/{review_id}/dismissals",
            Self::pull_path(repo, number)
        ));
        debug!(method = "PUT", url = %url, "github request");
        self.send(self.http.put(&url).json(&DismissReviewRequest::new(message)))
            .await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Human-readable message for a failed response: GitHub's `message` field
/// when present, the status reason otherwise.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorWire>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
