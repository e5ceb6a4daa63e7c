//! Repository API collaborator.
//!
//! The engine talks to the hosting platform only through [`RepositoryApi`].
//! List endpoints hand back one [`Page`] at a time together with an opaque
//! [`PageCursor`] for the next one; [`collect_pages`] drains them in order.

use std::future::Future;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{PullRequestSnapshot, RepoCoordinates, Review};
use crate::owner::TeamRef;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Opaque continuation token for a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(pub String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        PageCursor(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn with_next(items: Vec<T>, next: PageCursor) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }
}

/// Capabilities the approval engine needs from the hosting platform.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Login of the identity behind the credential.
    async fn authenticated_login(&self) -> ApiResult<String>;

    async fn pull_request(
        &self,
        repo: &RepoCoordinates,
        number: u64,
    ) -> ApiResult<PullRequestSnapshot>;

    /// One page of the pull request's reviews. `None` requests the first page.
    async fn reviews_page(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<Review>>;

    /// One page of member logins of `team`. `None` requests the first page.
    async fn team_members_page(
        &self,
        team: &TeamRef,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<String>>;

    /// Submit an approving review with no body.
    async fn create_approval_review(&self, repo: &RepoCoordinates, number: u64) -> ApiResult<()>;

    async fn dismiss_review(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        review_id: u64,
        message: &str,
    ) -> ApiResult<()>;
}

/// Follow cursors until the listing is exhausted. Pages are fetched one after
/// another since each cursor comes from the previous response.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> ApiResult<Vec<T>>
where
    F: FnMut(Option<PageCursor>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    loop {
        let page = fetch(cursor.take()).await?;
        items.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => return Ok(items),
        }
    }
}

/// Every review on the pull request, across all pages.
pub async fn list_reviews(
    api: &dyn RepositoryApi,
    repo: &RepoCoordinates,
    number: u64,
) -> ApiResult<Vec<Review>> {
    collect_pages(|cursor| async move { api.reviews_page(repo, number, cursor.as_ref()).await })
        .await
}

/// Every member login of `team`, across all pages.
pub async fn list_team_members(api: &dyn RepositoryApi, team: &TeamRef) -> ApiResult<Vec<String>> {
    collect_pages(|cursor| async move { api.team_members_page(team, cursor.as_ref()).await }).await
}
