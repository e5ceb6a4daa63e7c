//! Run entry point: load, resolve, decide, apply.

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::api::RepositoryApi;
use crate::config::ApprovalPolicy;
use crate::engine::{self, Evaluation};
use crate::error::{FailureReport, Result};
use crate::loader::load_context;
use crate::model::{Decision, RepoCoordinates};
use crate::obs;
use crate::requirement::{active_requirements, LabelRequirement};
use crate::resolver::resolve_teams;

/// Where to act and under which rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub repo: RepoCoordinates,
    pub pr_number: u64,
    pub requirements: Vec<LabelRequirement>,
    pub policy: ApprovalPolicy,
}

/// The evaluation together with the decision that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDecision {
    pub evaluation: Evaluation,
    pub decision: Decision,
}

/// How a run ended. A run never ends in more than one failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(AppliedDecision),
    Failed(FailureReport),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn decision(&self) -> Option<Decision> {
        match self {
            RunOutcome::Completed(applied) => Some(applied.decision),
            RunOutcome::Failed(_) => None,
        }
    }
}

/// Evaluate the pull request and apply the resulting decision.
///
/// Returns once the mutation (if any) has been acknowledged by the API.
pub async fn evaluate_pull_request(
    api: &dyn RepositoryApi,
    request: &RunRequest,
) -> Result<AppliedDecision> {
    let RunRequest {
        repo,
        pr_number,
        requirements,
        policy,
    } = request;

    let context = load_context(api, repo, *pr_number).await?;
    let active = active_requirements(requirements, &context.pull_request.labels);
    let teams = resolve_teams(api, &active).await?;

    let evaluation = engine::evaluate(&active, &teams, &context, policy);
    let decision = engine::decide(&evaluation, policy);
    obs::emit_decision(
        &decision,
        evaluation.labels_satisfied,
        evaluation.approvers.len(),
        evaluation.minimum_required,
    );

    engine::execute(api, repo, *pr_number, &decision).await?;

    Ok(AppliedDecision {
        evaluation,
        decision,
    })
}

/// Run [`evaluate_pull_request`] and fold any error into a [`FailureReport`].
pub async fn run(api: &dyn RepositoryApi, request: &RunRequest) -> RunOutcome {
    let span = obs::run_span(&request.repo, request.pr_number);
    match evaluate_pull_request(api, request).instrument(span).await {
        Ok(applied) => RunOutcome::Completed(applied),
        Err(err) => {
            let report = FailureReport::from(&err);
            obs::emit_run_failed(&report);
            RunOutcome::Failed(report)
        }
    }
}
