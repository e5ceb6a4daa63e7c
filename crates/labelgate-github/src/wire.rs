//! GitHub response and request bodies.
//!
//! Only the fields the engine reads are modelled; everything else in the
//! payloads is ignored.

use serde::{Deserialize, Serialize};

use labelgate_core::{PullRequestSnapshot, Review, ReviewState};

#[derive(Debug, Clone, Deserialize)]
pub struct UserWire {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelWire {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadWire {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestWire {
    pub number: u64,
    #[serde(default)]
    pub labels: Option<Vec<LabelWire>>,
    #[serde(default)]
    pub assignees: Option<Vec<UserWire>>,
    pub head: HeadWire,
}

impl From<PullRequestWire> for PullRequestSnapshot {
    fn from(wire: PullRequestWire) -> Self {
        PullRequestSnapshot {
            number: wire.number,
            labels: wire
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.name)
                .collect(),
            assignees: wire
                .assignees
                .unwrap_or_default()
                .into_iter()
                .map(|u| u.login)
                .collect(),
            head_sha: wire.head.sha,
        }
    }
}

/// A review entry. `user` is null for reviews by deleted accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewWire {
    pub id: u64,
    pub state: ReviewState,
    #[serde(default)]
    pub user: Option<UserWire>,
}

impl From<ReviewWire> for Review {
    fn from(wire: ReviewWire) -> Self {
        Review {
            id: wire.id,
            state: wire.state,
            author: wire.user.map(|u| u.login),
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorWire {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewRequest {
    pub event: &'static str,
}

impl CreateReviewRequest {
    pub fn approve() -> Self {
        Self { event: "APPROVE" }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DismissReviewRequest<'a> {
    pub message: &'a str,
    pub event: &'static str,
}

impl<'a> DismissReviewRequest<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            event: "DISMISS",
        }
    }
}
