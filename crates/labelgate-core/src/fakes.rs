//! In-memory fake of the repository API (testing only).
//!
//! [`MemoryRepositoryApi`] serves a fixed pull request, review list and team
//! rosters, paginates them with a configurable page size, can be told to fail
//! individual endpoints, and records every mutating call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiResult, Page, PageCursor, RepositoryApi};
use crate::error::ApiError;
use crate::model::{PullRequestSnapshot, RepoCoordinates, Review};
use crate::owner::TeamRef;

/// Endpoints that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AuthenticatedUser,
    PullRequest,
    Reviews,
    TeamMembers,
    CreateReview,
    DismissReview,
}

/// A mutating call the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Approve {
        repo: RepoCoordinates,
        number: u64,
    },
    Dismiss {
        repo: RepoCoordinates,
        number: u64,
        review_id: u64,
        message: String,
    },
}

/// In-memory [`RepositoryApi`].
#[derive(Debug)]
pub struct MemoryRepositoryApi {
    login: String,
    pull_request: PullRequestSnapshot,
    reviews: Vec<Review>,
    teams: HashMap<TeamRef, Vec<String>>,
    page_size: usize,
    failures: HashMap<Endpoint, ApiError>,
    team_requests: Mutex<Vec<TeamRef>>,
    mutations: Mutex<Vec<Mutation>>,
}

impl Default for MemoryRepositoryApi {
    fn default() -> Self {
        Self {
            login: "labelgate-bot".to_string(),
            pull_request: PullRequestSnapshot::default(),
            reviews: Vec::new(),
            teams: HashMap::new(),
            page_size: 100,
            failures: HashMap::new(),
            team_requests: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryRepositoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }

    pub fn with_pull_request(mut self, pull_request: PullRequestSnapshot) -> Self {
        self.pull_request = pull_request;
        self
    }

    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = reviews;
        self
    }

    pub fn with_team(mut self, team: TeamRef, members: &[&str]) -> Self {
        self.teams
            .insert(team, members.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Serve listings in pages of `page_size` items (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn failing(mut self, endpoint: Endpoint, error: ApiError) -> Self {
        self.failures.insert(endpoint, error);
        self
    }

    /// Mutating calls received so far, in order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }

    /// Team listings requested so far (one entry per page fetched).
    pub fn team_requests(&self) -> Vec<TeamRef> {
        self.team_requests.lock().unwrap().clone()
    }

    fn check(&self, endpoint: Endpoint) -> ApiResult<()> {
        match self.failures.get(&endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(&self, items: &[T], cursor: Option<&PageCursor>) -> ApiResult<Page<T>> {
        let start = match cursor {
            None => 0,
            Some(c) => c
                .as_str()
                .parse::<usize>()
                .map_err(|_| ApiError::status(400, format!("bad cursor {}", c.as_str())))?,
        };
        let end = (start + self.page_size).min(items.len());
        let chunk = items.get(start..end).unwrap_or_default().to_vec();
        if end < items.len() {
            Ok(Page::with_next(chunk, PageCursor::new(end.to_string())))
        } else {
            Ok(Page::last(chunk))
        }
    }
}

#[async_trait]
impl RepositoryApi for MemoryRepositoryApi {
    async fn authenticated_login(&self) -> ApiResult<String> {
        self.check(Endpoint::AuthenticatedUser)?;
        Ok(self.login.clone())
    }

    async fn pull_request(
        &self,
        _repo: &RepoCoordinates,
        number: u64,
    ) -> ApiResult<PullRequestSnapshot> {
        self.check(Endpoint::PullRequest)?;
        if number != self.pull_request.number {
            return Err(ApiError::status(404, "Not Found"));
        }
        Ok(self.pull_request.clone())
    }

    async fn reviews_page(
        &self,
        _repo: &RepoCoordinates,
        _number: u64,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<Review>> {
        self.check(Endpoint::Reviews)?;
        self.page(&self.reviews, cursor)
    }

    async fn team_members_page(
        &self,
        team: &TeamRef,
        cursor: Option<&PageCursor>,
    ) -> ApiResult<Page<String>> {
        self.team_requests.lock().unwrap().push(team.clone());
        self.check(Endpoint::TeamMembers)?;
        let members = self
            .teams
            .get(team)
            .ok_or_else(|| ApiError::status(404, "Not Found"))?;
        self.page(members, cursor)
    }

    async fn create_approval_review(&self, repo: &RepoCoordinates, number: u64) -> ApiResult<()> {
        self.check(Endpoint::CreateReview)?;
        self.mutations.lock().unwrap().push(Mutation::Approve {
            repo: repo.clone(),
            number,
        });
        Ok(())
    }

    async fn dismiss_review(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        review_id: u64,
        message: &str,
    ) -> ApiResult<()> {
        self.check(Endpoint::DismissReview)?;
        if !self.reviews.iter().any(|r| r.id == review_id) {
            return Err(ApiError::status(404, "Not Found"));
        }
        self.mutations.lock().unwrap().push(Mutation::Dismiss {
            repo: repo.clone(),
            number,
            review_id,
            message: message.to_string(),
        });
        Ok(())
    }
}
