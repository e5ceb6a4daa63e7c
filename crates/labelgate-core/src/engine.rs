//! Approval decision engine.
//!
//! Combines active label requirements, resolved team membership, the review
//! list and the [`ApprovalPolicy`] into an [`Evaluation`], turns that into a
//! [`Decision`], and applies the decision through the [`RepositoryApi`].
//!
//! Eligibility is decided per review entry: every `APPROVED` entry counts for
//! its author, even if the same author later requested changes. The review
//! list is taken literally rather than collapsed into a per-author state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiResult, RepositoryApi};
use crate::config::ApprovalPolicy;
use crate::loader::PullRequestContext;
use crate::model::{Decision, PullRequestSnapshot, RepoCoordinates, Review, TeamMembership};
use crate::obs;
use crate::owner::Owner;
use crate::requirement::LabelRequirement;

/// Message attached when the acting identity withdraws its approval.
pub const DISMISS_MESSAGE: &str = "Requirements are no longer satisfied";

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Outcome of checking one active requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementOutcome {
    pub label: String,
    /// Eligible approvers that satisfy this requirement (empty when unsatisfied).
    pub satisfied_by: BTreeSet<String>,
}

impl RequirementOutcome {
    pub fn satisfied(&self) -> bool {
        !self.satisfied_by.is_empty()
    }
}

/// Everything the decision is based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// One outcome per active requirement, in input order.
    pub requirements: Vec<RequirementOutcome>,
    /// AND over all active requirements; vacuously true when none are active.
    pub labels_satisfied: bool,
    /// Distinct logins with an eligible approval.
    pub approvers: BTreeSet<String>,
    pub minimum_required: u32,
    pub minimum_met: bool,
    /// Id of the acting identity's own `APPROVED` review, if any.
    pub existing_approval: Option<u64>,
}

impl Evaluation {
    pub fn has_active_requirements(&self) -> bool {
        !self.requirements.is_empty()
    }

    /// Both the label requirements and the approval threshold hold.
    pub fn approvable(&self) -> bool {
        self.labels_satisfied && self.minimum_met
    }
}

/// Logins with at least one `APPROVED` review entry.
///
/// Reviews by the acting identity never count, and neither do reviews by
/// assignees when `skip_assignees` is set.
pub fn eligible_approvers(
    reviews: &[Review],
    pull_request: &PullRequestSnapshot,
    login: &str,
    skip_assignees: bool,
) -> BTreeSet<String> {
    reviews
        .iter()
        .filter(|review| review.is_approved())
        .filter_map(|review| review.author.as_deref())
        .filter(|author| *author != login)
        .filter(|author| !(skip_assignees && pull_request.assignees.contains(*author)))
        .map(str::to_string)
        .collect()
}

/// Eligible approvers that satisfy `requirement`.
///
/// An individual owner matches itself; a team owner matches any of its
/// members. Teams missing from `teams` match nobody.
pub fn satisfying_approvers(
    requirement: &LabelRequirement,
    teams: &TeamMembership,
    approvers: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut satisfied_by = BTreeSet::new();
    for owner in &requirement.owners {
        match owner {
            Owner::Individual { login } => {
                if approvers.contains(login) {
                    satisfied_by.insert(login.clone());
                }
            }
            Owner::Team(team) => {
                if let Some(members) = teams.members(team) {
                    satisfied_by.extend(members.intersection(approvers).cloned());
                }
            }
        }
    }
    satisfied_by
}

/// The acting identity's first `APPROVED` review.
pub fn existing_approval<'a>(reviews: &'a [Review], login: &str) -> Option<&'a Review> {
    reviews
        .iter()
        .find(|review| review.is_approved() && review.is_by(login))
}

/// Evaluate active requirements and the approval threshold against the context.
pub fn evaluate(
    active: &[&LabelRequirement],
    teams: &TeamMembership,
    context: &PullRequestContext,
    policy: &ApprovalPolicy,
) -> Evaluation {
    let approvers = eligible_approvers(
        &context.reviews,
        &context.pull_request,
        &context.login,
        policy.skip_assignees,
    );

    if active.is_empty() {
        info!("No label requirements for PR");
    } else {
        for requirement in active {
            info!(
                "Label \"{}\" requires an approval from: {}",
                requirement.label,
                owners_list(requirement)
            );
        }
    }

    let requirements: Vec<RequirementOutcome> = active
        .iter()
        .map(|requirement| {
            let outcome = RequirementOutcome {
                label: requirement.label.clone(),
                satisfied_by: satisfying_approvers(requirement, teams, &approvers),
            };
            obs::emit_requirement_evaluated(requirement, outcome.satisfied());
            outcome
        })
        .collect();

    let labels_satisfied = requirements.iter().all(RequirementOutcome::satisfied);
    if labels_satisfied {
        info!("✅ All label requirements are satisfied");
    } else {
        info!("❌ At least one label requirement is not satisfied");
    }

    let minimum_met = approvers.len() as u64 >= u64::from(policy.minimum_approvals_required);
    if !minimum_met {
        info!(
            "❌ {} of {} required approvals",
            approvers.len(),
            policy.minimum_approvals_required
        );
    }

    Evaluation {
        requirements,
        labels_satisfied,
        minimum_met,
        minimum_required: policy.minimum_approvals_required,
        existing_approval: existing_approval(&context.reviews, &context.login).map(|r| r.id),
        approvers,
    }
}

fn owners_list(requirement: &LabelRequirement) -> String {
    requirement
        .owners
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Turn an [`Evaluation`] into a [`Decision`].
///
/// Dismissal is checked first and ignores the approve-gating flags: an
/// approval that no longer holds is always withdrawn.
pub fn decide(evaluation: &Evaluation, policy: &ApprovalPolicy) -> Decision {
    match evaluation.existing_approval {
        Some(review_id) if !evaluation.approvable() => Decision::Dismiss { review_id },
        None if evaluation.approvable()
            && (policy.approve_no_requirements || evaluation.has_active_requirements()) =>
        {
            Decision::Approve
        }
        _ => Decision::NoOp,
    }
}

/// Apply `decision`. Issues at most one mutating call.
pub async fn execute(
    api: &dyn RepositoryApi,
    repo: &RepoCoordinates,
    number: u64,
    decision: &Decision,
) -> ApiResult<()> {
    match decision {
        Decision::Approve => api.create_approval_review(repo, number).await?,
        Decision::Dismiss { review_id } => {
            api.dismiss_review(repo, number, *review_id, DISMISS_MESSAGE)
                .await?
        }
        Decision::NoOp => {}
    }
    obs::emit_mutation_applied(decision, number);
    Ok(())
}
