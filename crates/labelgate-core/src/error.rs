//! Error taxonomy for labelgate.
//!
//! Library code returns [`LabelgateError`]; the run boundary converts it into
//! exactly one [`FailureReport`] for the user.

use serde::{Deserialize, Serialize};

/// Problems with the supplied configuration. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("This action requires `github-token` to be set")]
    MissingToken,

    #[error("Label requirement lines must be in a format of `label=team,user` (got `{line}`)")]
    MalformedRequirement { line: String },

    #[error("Owner `{owner}` is not a valid `org/team` reference")]
    InvalidTeamReference { owner: String },

    #[error("This action must be run using a `pull_request` event")]
    MissingPullRequestNumber,

    #[error("invalid repository `{0}`, expected `owner/repo`")]
    InvalidRepository(String),

    #[error("failed to read event payload: {0}")]
    EventPayload(String),
}

/// Errors returned by a [`RepositoryApi`](crate::api::RepositoryApi) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success HTTP status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if the API answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Umbrella error for a labelgate run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelgateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, LabelgateError>;

/// Category of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Authorization,
    NotFound,
    Unprocessable,
    Api,
    Unknown,
}

/// The single user-visible failure a run resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&LabelgateError> for FailureReport {
    fn from(err: &LabelgateError) -> Self {
        match err {
            LabelgateError::Config(e) => FailureReport {
                kind: FailureKind::Configuration,
                message: e.to_string(),
            },
            LabelgateError::Api(ApiError::Status { status, message }) => {
                api_failure(*status, message)
            }
            LabelgateError::Api(e) => FailureReport {
                kind: FailureKind::Unknown,
                message: e.to_string(),
            },
        }
    }
}

impl From<LabelgateError> for FailureReport {
    fn from(err: LabelgateError) -> Self {
        FailureReport::from(&err)
    }
}

fn api_failure(status: u16, message: &str) -> FailureReport {
    let (kind, message) = match status {
        401 => (
            FailureKind::Authorization,
            format!(
                "{message}. Please check that the `github-token` input parameter is set correctly."
            ),
        ),
        403 => (
            FailureKind::Authorization,
            format!(
                "{message}. In some cases, the GitHub token used for actions triggered \
                 from `pull_request` events are read-only, which can cause this problem. \
                 Switching to the `pull_request_target` event typically resolves this issue."
            ),
        ),
        404 => (
            FailureKind::NotFound,
            format!(
                "{message}. This typically means the token you're using doesn't have \
                 access to this repository. Use the built-in `${{{{ secrets.GITHUB_TOKEN }}}}` token \
                 or review the scopes assigned to your personal access token."
            ),
        ),
        422 => (
            FailureKind::Unprocessable,
            format!(
                "{message}. This typically happens when you try to approve the pull \
                 request with the same user account that created the pull request. Try using \
                 the built-in `${{{{ secrets.GITHUB_TOKEN }}}}` token, or if you're using a personal \
                 access token, use one that belongs to a dedicated bot account."
            ),
        ),
        other => (FailureKind::Api, format!("Error (code {other}): {message}")),
    };
    FailureReport { kind, message }
}
