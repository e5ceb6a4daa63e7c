//! Pull request, review and decision types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::owner::TeamRef;

/// `owner/repo` coordinates of the repository hosting the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoCoordinates {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ConfigError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Read-only view of a pull request, fetched once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    pub number: u64,
    pub labels: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    /// Head commit SHA. Logged only.
    pub head_sha: String,
}

/// State of a single review entry as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl ReviewState {
    pub fn as_str(&self) -> &str {
        match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
            ReviewState::Other(s) => s,
        }
    }
}

impl From<&str> for ReviewState {
    fn from(s: &str) -> Self {
        match s {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            "DISMISSED" => ReviewState::Dismissed,
            "PENDING" => ReviewState::Pending,
            other => ReviewState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReviewState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReviewState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ReviewState::from(s.as_str()))
    }
}

/// One entry of a pull request's review list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub state: ReviewState,
    /// `None` for reviews left by deleted accounts.
    pub author: Option<String>,
}

impl Review {
    pub fn new(id: u64, state: ReviewState, author: impl Into<String>) -> Self {
        Self {
            id,
            state,
            author: Some(author.into()),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.state == ReviewState::Approved
    }

    pub fn is_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }
}

/// Resolved members of every team referenced by an active requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamMembership {
    teams: BTreeMap<TeamRef, BTreeSet<String>>,
}

impl TeamMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, team: TeamRef, members: impl IntoIterator<Item = String>) {
        self.teams.entry(team).or_default().extend(members);
    }

    pub fn members(&self, team: &TeamRef) -> Option<&BTreeSet<String>> {
        self.teams.get(team)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FromIterator<(TeamRef, BTreeSet<String>)> for TeamMembership {
    fn from_iter<I: IntoIterator<Item = (TeamRef, BTreeSet<String>)>>(iter: I) -> Self {
        let mut membership = TeamMembership::new();
        for (team, members) in iter {
            membership.insert(team, members);
        }
        membership
    }
}

/// What the engine decided to do with the acting identity's approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Dismiss { review_id: u64 },
    NoOp,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => f.write_str("approve"),
            Decision::Dismiss { review_id } => write!(f, "dismiss review {review_id}"),
            Decision::NoOp => f.write_str("no-op"),
        }
    }
}
