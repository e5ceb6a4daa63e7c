//! End-to-end approval scenarios against the in-memory repository API.
//!
//! Each test wires a pull request, its reviews and team rosters into
//! `MemoryRepositoryApi`, runs the full load → resolve → decide → apply
//! pipeline and asserts which mutation (if any) was issued.

use labelgate_core::fakes::{Endpoint, MemoryRepositoryApi, Mutation};
use labelgate_core::{
    run, ApiError, ApprovalPolicy, Decision, FailureKind, LabelRequirement, Owner,
    PullRequestSnapshot, RepoCoordinates, Review, ReviewState, RunOutcome, RunRequest, TeamRef,
    DISMISS_MESSAGE, FALLBACK_LOGIN,
};

const BOT: &str = "justnero-bot";
const PR: u64 = 101;

fn repo() -> RepoCoordinates {
    RepoCoordinates::new("justnero", "test")
}

fn pull_request(labels: &[&str], assignees: &[&str]) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number: PR,
        labels: labels.iter().map(|s| s.to_string()).collect(),
        assignees: assignees.iter().map(|s| s.to_string()).collect(),
        head_sha: "0123456789abcdef".to_string(),
    }
}

fn approved(id: u64, author: &str) -> Review {
    Review::new(id, ReviewState::Approved, author)
}

fn api(labels: &[&str], assignees: &[&str], reviews: Vec<Review>) -> MemoryRepositoryApi {
    // Page size 1 so every listing spans several pages.
    MemoryRepositoryApi::new()
        .with_login(BOT)
        .with_pull_request(pull_request(labels, assignees))
        .with_reviews(reviews)
        .with_page_size(1)
}

fn requirement(label: &str, owners: &[&str]) -> LabelRequirement {
    LabelRequirement::new(
        label,
        owners.iter().map(|o| o.parse::<Owner>().unwrap()).collect(),
    )
}

fn request(requirements: Vec<LabelRequirement>, policy: ApprovalPolicy) -> RunRequest {
    RunRequest {
        repo: repo(),
        pr_number: PR,
        requirements,
        policy,
    }
}

fn approve_mutation() -> Mutation {
    Mutation::Approve {
        repo: repo(),
        number: PR,
    }
}

fn dismiss_mutation(review_id: u64) -> Mutation {
    Mutation::Dismiss {
        repo: repo(),
        number: PR,
        review_id,
        message: DISMISS_MESSAGE.to_string(),
    }
}

async fn decide(api: &MemoryRepositoryApi, req: &RunRequest) -> Decision {
    let outcome = run(api, req).await;
    outcome
        .decision()
        .unwrap_or_else(|| panic!("run failed: {outcome:?}"))
}

// ---- no requirements ----

#[tokio::test]
async fn pr_left_untouched_with_no_requirements() {
    let api = api(&[], &[], vec![]);
    let decision = decide(&api, &request(vec![], ApprovalPolicy::default())).await;

    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn pr_approved_with_no_requirements_when_allowed() {
    let api = api(&[], &[], vec![]);
    let policy = ApprovalPolicy::default().with_approve_no_requirements(true);
    let decision = decide(&api, &request(vec![], policy)).await;

    assert_eq!(decision, Decision::Approve);
    assert_eq!(api.mutations(), vec![approve_mutation()]);
}

#[tokio::test]
async fn inactive_requirements_count_as_none() {
    let api = api(&["unrelated"], &[], vec![]);
    let reqs = vec![requirement("foo", &["justnero"])];

    let strict = decide(&api, &request(reqs.clone(), ApprovalPolicy::default())).await;
    assert_eq!(strict, Decision::NoOp);

    let lenient = ApprovalPolicy::default().with_approve_no_requirements(true);
    assert_eq!(decide(&api, &request(reqs, lenient)).await, Decision::Approve);
}

#[tokio::test]
async fn inactive_requirement_teams_are_never_queried() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")]);
    let reqs = vec![
        requirement("foo", &["justnero"]),
        requirement("bar", &["org/never"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
    assert!(api.team_requests().is_empty());
}

// ---- individual owners ----

#[tokio::test]
async fn pr_approved_by_individual_owner() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")]);
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
    assert_eq!(api.mutations(), vec![approve_mutation()]);
}

#[tokio::test]
async fn approval_dismissed_when_owner_has_not_approved() {
    let api = api(&["foo"], &[], vec![approved(202, BOT)]);
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
    assert_eq!(api.mutations(), vec![dismiss_mutation(202)]);
}

#[tokio::test]
async fn pr_not_approved_when_requirement_unsatisfied() {
    let api = api(&["foo"], &[], vec![approved(200, "justnero-alternative")]);
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn valid_existing_approval_is_left_alone() {
    let api = api(
        &["foo"],
        &[],
        vec![approved(201, "justnero"), approved(202, BOT)],
    );
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn dismissal_targets_only_the_bot_review() {
    let api = api(
        &["foo"],
        &[],
        vec![
            approved(200, "someone-else"),
            Review::new(201, ReviewState::Commented, BOT),
            approved(202, BOT),
            approved(203, "another"),
        ],
    );
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
    assert_eq!(api.mutations(), vec![dismiss_mutation(202)]);
}

// ---- team owners ----

#[tokio::test]
async fn pr_approved_with_team_requirement() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")])
        .with_team(TeamRef::new("org", "team"), &["justnero"]);
    let reqs = vec![requirement("foo", &["org/team"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

#[tokio::test]
async fn approval_dismissed_with_team_requirement() {
    let api = api(&["foo"], &[], vec![approved(202, BOT)])
        .with_team(TeamRef::new("org", "team"), &["justnero"]);
    let reqs = vec![requirement("foo", &["org/team"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
}

#[tokio::test]
async fn pr_not_approved_when_team_requirement_unsatisfied() {
    let api = api(&["foo"], &[], vec![approved(200, "justnero-alternative")])
        .with_team(TeamRef::new("org", "team"), &["justnero"]);
    let reqs = vec![requirement("foo", &["org/team"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn any_single_team_member_satisfies_team_owner() {
    let api = api(&["foo"], &[], vec![approved(201, "m3")])
        .with_team(TeamRef::new("org", "team"), &["m1", "m2", "m3", "m4"]);
    let reqs = vec![requirement("foo", &["org/team"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

// ---- multiple requirements ----

#[tokio::test]
async fn pr_approved_with_multiple_requirements() {
    let api = api(
        &["foo", "bar"],
        &[],
        vec![
            approved(200, "justnero-backend"),
            approved(201, "justnero-frontend"),
        ],
    )
    .with_team(TeamRef::new("org", "backend"), &["justnero-backend"])
    .with_team(TeamRef::new("org", "frontend"), &["justnero-frontend"]);
    let reqs = vec![
        requirement("foo", &["org/backend"]),
        requirement("bar", &["org/frontend"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

#[tokio::test]
async fn one_approver_in_overlapping_teams_satisfies_both() {
    let api = api(&["foo", "bar"], &[], vec![approved(201, "justnero")])
        .with_team(
            TeamRef::new("org", "backend"),
            &["justnero-backend", "justnero"],
        )
        .with_team(
            TeamRef::new("org", "frontend"),
            &["justnero-frontend", "justnero"],
        );
    let reqs = vec![
        requirement("foo", &["org/backend"]),
        requirement("bar", &["org/frontend"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

#[tokio::test]
async fn approval_dismissed_with_multiple_requirements() {
    let api = api(
        &["foo", "bar"],
        &[],
        vec![approved(201, "justnero-backend"), approved(202, BOT)],
    )
    .with_team(TeamRef::new("org", "backend"), &["justnero-backend"])
    .with_team(TeamRef::new("org", "frontend"), &["justnero-frontend"]);
    let reqs = vec![
        requirement("foo", &["org/backend"]),
        requirement("bar", &["org/frontend"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
}

#[tokio::test]
async fn disjoint_teams_with_one_satisfied_leave_pr_untouched() {
    let api = api(
        &["foo", "bar"],
        &[],
        vec![approved(201, "justnero-frontend")],
    )
    .with_team(TeamRef::new("org", "backend"), &["justnero-backend"])
    .with_team(TeamRef::new("org", "frontend"), &["justnero-frontend"]);
    let reqs = vec![
        requirement("foo", &["org/backend"]),
        requirement("bar", &["org/frontend"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn shared_team_is_listed_once() {
    let api = api(&["foo", "bar"], &[], vec![approved(201, "justnero")])
        .with_team(TeamRef::new("org", "core"), &["justnero"])
        .with_page_size(10);
    let reqs = vec![
        requirement("foo", &["org/core"]),
        requirement("bar", &["org/core", "someone"]),
    ];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
    assert_eq!(api.team_requests(), vec![TeamRef::new("org", "core")]);
}

// ---- assignees ----

#[tokio::test]
async fn pr_not_approved_with_only_assignee_approval() {
    let api = api(&["foo"], &["justnero"], vec![approved(201, "justnero")]);
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default().with_skip_assignees(true);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::NoOp);
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn assignee_approval_counts_without_skip_assignees() {
    let api = api(&["foo"], &["justnero"], vec![approved(201, "justnero")]);
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

#[tokio::test]
async fn approval_dismissed_with_only_assignee_approval() {
    let api = api(
        &["foo"],
        &["justnero"],
        vec![approved(201, "justnero"), approved(202, BOT)],
    );
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default().with_skip_assignees(true);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
}

// ---- minimum approvals ----

#[tokio::test]
async fn pr_not_approved_below_minimum_approvals() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")]);
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default()
        .with_skip_assignees(true)
        .with_minimum_approvals(2);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::NoOp);
}

#[tokio::test]
async fn pr_approved_at_minimum_approvals() {
    let api = api(
        &["foo"],
        &[],
        vec![approved(200, "justnero-backend"), approved(201, "justnero")],
    );
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default()
        .with_skip_assignees(true)
        .with_minimum_approvals(2);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::Approve);
}

#[tokio::test]
async fn assignee_approval_does_not_count_towards_minimum() {
    let api = api(
        &["foo"],
        &["justnero-backend"],
        vec![approved(200, "justnero-backend"), approved(201, "justnero")],
    );
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default()
        .with_skip_assignees(true)
        .with_minimum_approvals(2);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::NoOp);
}

#[tokio::test]
async fn approval_dismissed_when_minimum_drops_due_to_assignee() {
    let api = api(
        &["foo"],
        &["justnero-backend"],
        vec![
            approved(200, "justnero-backend"),
            approved(201, "justnero"),
            approved(202, BOT),
        ],
    );
    let reqs = vec![requirement("foo", &["justnero"])];
    let policy = ApprovalPolicy::default()
        .with_skip_assignees(true)
        .with_minimum_approvals(2);

    let decision = decide(&api, &request(reqs, policy)).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
}

#[tokio::test]
async fn minimum_approvals_apply_without_requirements() {
    let policy = ApprovalPolicy::default()
        .with_approve_no_requirements(true)
        .with_minimum_approvals(3);

    let short = api(&[], &[], vec![approved(1, "a"), approved(2, "b")]);
    assert_eq!(
        decide(&short, &request(vec![], policy)).await,
        Decision::NoOp
    );

    let enough = api(
        &[],
        &[],
        vec![approved(1, "a"), approved(2, "b"), approved(3, "c")],
    );
    assert_eq!(
        decide(&enough, &request(vec![], policy)).await,
        Decision::Approve
    );
}

#[tokio::test]
async fn repeated_approvals_from_one_author_count_once() {
    let api = api(
        &[],
        &[],
        vec![approved(1, "a"), approved(2, "a"), approved(3, "a")],
    );
    let policy = ApprovalPolicy::default()
        .with_approve_no_requirements(true)
        .with_minimum_approvals(2);

    assert_eq!(decide(&api, &request(vec![], policy)).await, Decision::NoOp);
}

// ---- literal review-list semantics ----

#[tokio::test]
async fn earlier_approval_still_counts_after_changes_requested() {
    // Documented quirk: reviews are not collapsed to each author's latest
    // state, so this PR is approved even though justnero now requests changes.
    let api = api(
        &["foo"],
        &[],
        vec![
            approved(201, "justnero"),
            Review::new(205, ReviewState::ChangesRequested, "justnero"),
        ],
    );
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Approve);
}

// ---- identity ----

#[tokio::test]
async fn actions_token_identity_falls_back_to_bot_login() {
    let api = api(&["foo"], &[], vec![approved(202, FALLBACK_LOGIN)]).failing(
        Endpoint::AuthenticatedUser,
        ApiError::status(403, "Resource not accessible by integration"),
    );
    let reqs = vec![requirement("foo", &["justnero"])];

    let decision = decide(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert_eq!(decision, Decision::Dismiss { review_id: 202 });
}

// ---- failures ----

#[tokio::test]
async fn team_listing_failure_is_reported_once() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")])
        .with_team(TeamRef::new("org", "team"), &["justnero"])
        .failing(Endpoint::TeamMembers, ApiError::status(404, "Not Found"));
    let reqs = vec![requirement("foo", &["org/team"])];

    let outcome = run(&api, &request(reqs, ApprovalPolicy::default())).await;
    match outcome {
        RunOutcome::Failed(report) => {
            assert_eq!(report.kind, FailureKind::NotFound);
            assert!(report.message.starts_with("Not Found."));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(api.mutations().is_empty());
}

#[tokio::test]
async fn self_approval_rejection_is_reported() {
    let api = api(&["foo"], &[], vec![approved(201, "justnero")]).failing(
        Endpoint::CreateReview,
        ApiError::status(422, "Can not approve your own pull request"),
    );
    let reqs = vec![requirement("foo", &["justnero"])];

    let outcome = run(&api, &request(reqs, ApprovalPolicy::default())).await;
    assert!(!outcome.is_success());
    match outcome {
        RunOutcome::Failed(report) => assert_eq!(report.kind, FailureKind::Unprocessable),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_is_unknown() {
    let api = api(&[], &[], vec![]).failing(
        Endpoint::PullRequest,
        ApiError::Transport("connection refused".to_string()),
    );

    let outcome = run(&api, &request(vec![], ApprovalPolicy::default())).await;
    match outcome {
        RunOutcome::Failed(report) => {
            assert_eq!(report.kind, FailureKind::Unknown);
            assert!(report.message.contains("connection refused"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn completed_run_exposes_evaluation() {
    let api = api(&["foo", "bar"], &[], vec![approved(201, "justnero")]);
    let reqs = vec![
        requirement("foo", &["justnero"]),
        requirement("bar", &["someone"]),
    ];

    match run(&api, &request(reqs, ApprovalPolicy::default())).await {
        RunOutcome::Completed(applied) => {
            let eval = applied.evaluation;
            assert!(!eval.labels_satisfied);
            assert_eq!(eval.requirements.len(), 2);
            assert!(eval.requirements[0].satisfied());
            assert!(!eval.requirements[1].satisfied());
            assert_eq!(applied.decision, Decision::NoOp);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}
