//! Structured observability hooks for a labelgate run.
//!
//! This module provides:
//! - A pull-request-scoped tracing span via [`run_span`]
//! - Emission functions for the run's milestones: context loaded, each
//!   requirement evaluated, decision taken, mutation applied, run failed
//!
//! Events are emitted at `info!` level unless noted otherwise.

use tracing::info;

use crate::error::FailureReport;
use crate::model::{Decision, RepoCoordinates};
use crate::requirement::LabelRequirement;

/// Span tagged with the repository and PR number, for instrumenting a run.
///
/// # Example
///
/// ```ignore
/// evaluate_pull_request(api, &request).instrument(run_span(&repo, 101)).await;
/// // every event inside carries repo = "owner/repo", pr = 101
/// ```
pub fn run_span(repo: &RepoCoordinates, pr_number: u64) -> tracing::Span {
    tracing::info_span!("labelgate.run", repo = %repo, pr = pr_number)
}

/// Emit event: identity, PR snapshot and reviews are available.
pub fn emit_context_loaded(login: &str, head_sha: &str, reviews: usize) {
    info!(
        event = "context.loaded",
        login = %login,
        head_sha = %head_sha,
        reviews = reviews,
    );
}

/// Emit event: one active requirement was checked against eligible approvals.
pub fn emit_requirement_evaluated(requirement: &LabelRequirement, satisfied: bool) {
    let mark = if satisfied { "✅" } else { "❌" };
    let verdict = if satisfied { "satisfied" } else { "not satisfied" };
    info!(
        event = "requirement.evaluated",
        label = %requirement.label,
        satisfied = satisfied,
        "{mark} {} requirements are {verdict}",
        requirement.label,
    );
}

/// Emit event: the engine reached a decision.
pub fn emit_decision(
    decision: &Decision,
    labels_satisfied: bool,
    approvals: usize,
    minimum_required: u32,
) {
    info!(
        event = "decision.made",
        decision = %decision,
        labels_satisfied = labels_satisfied,
        approvals = approvals,
        minimum_required = minimum_required,
    );
}

/// Emit event: the approve or dismiss call went through.
pub fn emit_mutation_applied(decision: &Decision, pr_number: u64) {
    match decision {
        Decision::Approve => info!(
            event = "mutation.applied",
            decision = %decision,
            "✅ Approved pull request #{pr_number}"
        ),
        Decision::Dismiss { review_id } => info!(
            event = "mutation.applied",
            decision = %decision,
            review_id = review_id,
            "❌ Dismissed pull request #{pr_number} approval"
        ),
        Decision::NoOp => info!(event = "mutation.skipped", "Approval is up to date"),
    }
}

/// Emit event: the run resolved to a failure (error level).
pub fn emit_run_failed(report: &FailureReport) {
    tracing::error!(event = "run.failed", kind = ?report.kind, error = %report.message);
}
