//! labelgate core library
//!
//! Decides whether a bot account should approve a pull request, withdraw its
//! approval, or leave things alone, based on label ownership rules:
//!
//! 1. [`loader`] fetches the acting identity, the PR snapshot and its reviews.
//! 2. [`resolver`] expands `org/team` owners of active requirements into members.
//! 3. [`engine`] evaluates the rules and applies one approve/dismiss mutation.
//!
//! [`run`] ties the three together and never fails past its own boundary.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fakes;
pub mod loader;
pub mod model;
pub mod obs;
pub mod owner;
pub mod requirement;
pub mod resolver;
pub mod run;
pub mod telemetry;

pub use api::{
    collect_pages, list_reviews, list_team_members, ApiResult, Page, PageCursor, RepositoryApi,
};
pub use config::{parse_flag, parse_minimum_approvals, ApprovalPolicy};
pub use engine::{
    decide, eligible_approvers, evaluate, execute, existing_approval, satisfying_approvers,
    Evaluation, RequirementOutcome, DISMISS_MESSAGE,
};
pub use error::{ApiError, ConfigError, FailureKind, FailureReport, LabelgateError, Result};
pub use loader::{acting_login, load_context, PullRequestContext, FALLBACK_LOGIN};
pub use model::{
    Decision, PullRequestSnapshot, RepoCoordinates, Review, ReviewState, TeamMembership,
};
pub use owner::{Owner, TeamRef};
pub use requirement::{active_requirements, parse_label_requirements, LabelRequirement};
pub use resolver::{referenced_teams, resolve_teams};
pub use run::{evaluate_pull_request, run, AppliedDecision, RunOutcome, RunRequest};
pub use telemetry::init_tracing;

/// labelgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
