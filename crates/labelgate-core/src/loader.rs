//! Context loading: acting identity, pull request snapshot and reviews.

use tracing::{debug, info};

use crate::api::{list_reviews, ApiResult, RepositoryApi};
use crate::error::ApiError;
use crate::model::{PullRequestSnapshot, RepoCoordinates, Review};
use crate::obs;

/// Identity assumed when the credential cannot look itself up. The token
/// issued to GitHub Actions workflows answers `GET /user` with 403.
pub const FALLBACK_LOGIN: &str = "github-actions[bot]";

/// Everything the engine needs to know about the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    /// Acting identity.
    pub login: String,
    pub pull_request: PullRequestSnapshot,
    pub reviews: Vec<Review>,
}

/// Fetch identity, snapshot and the full review list concurrently.
///
/// The first failure aborts the load; the remaining fetches are dropped.
pub async fn load_context(
    api: &dyn RepositoryApi,
    repo: &RepoCoordinates,
    number: u64,
) -> ApiResult<PullRequestContext> {
    info!("Fetching user, pull request information, and existing reviews");

    let (login, pull_request, reviews) = tokio::try_join!(
        acting_login(api),
        api.pull_request(repo, number),
        list_reviews(api, repo, number),
    )?;

    info!("Current user is {login}");
    info!("Commit SHA is {}", pull_request.head_sha);
    obs::emit_context_loaded(&login, &pull_request.head_sha, reviews.len());

    Ok(PullRequestContext {
        login,
        pull_request,
        reviews,
    })
}

/// Login of the credential, or [`FALLBACK_LOGIN`] when the lookup is forbidden.
pub async fn acting_login(api: &dyn RepositoryApi) -> ApiResult<String> {
    match api.authenticated_login().await {
        Ok(login) => Ok(login),
        Err(ApiError::Status { status: 403, .. }) => {
            debug!("identity lookup forbidden, assuming {FALLBACK_LOGIN}");
            Ok(FALLBACK_LOGIN.to_string())
        }
        Err(e) => Err(e),
    }
}
