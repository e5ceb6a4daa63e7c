//! Action inputs and their resolution into a [`Settings`] value.
//!
//! Every input can be passed as a flag or through the environment variable
//! the GitHub Actions runner sets for it (`INPUT_<NAME>`, `GITHUB_*`).

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;

use labelgate_core::{
    parse_flag, parse_label_requirements, parse_minimum_approvals, ApprovalPolicy, ConfigError,
    RepoCoordinates, RunRequest,
};
use labelgate_github::DEFAULT_API_URL;

#[derive(Args, Debug, Clone)]
pub struct ActionArgs {
    /// Token used to read the pull request and submit reviews
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Newline-separated `label=owner1,owner2` rules
    #[arg(long, env = "INPUT_LABEL-REQUIREMENTS", default_value = "")]
    pub label_requirements: String,

    /// Approve when no requirement applies (`true` to enable)
    #[arg(long, env = "INPUT_APPROVE-NO-REQUIREMENTS", default_value = "false")]
    pub approve_no_requirements: String,

    /// Ignore approvals from assignees (`true` to enable)
    #[arg(long, env = "INPUT_SKIP-ASSIGNEES", default_value = "false")]
    pub skip_assignees: String,

    /// Minimum number of distinct eligible approvals
    #[arg(long, env = "INPUT_MINIMUM-APPROVALS-REQUIRED", default_value = "0")]
    pub minimum_approvals_required: String,

    /// Repository in `owner/repo` form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Path to the triggering event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Pull request number (overrides the event payload)
    #[arg(long)]
    pub pr_number: Option<u64>,

    /// REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Fully validated inputs for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub api_url: String,
    pub request: RunRequest,
}

impl Settings {
    /// Validate inputs in the order a user would fix them: token, rules,
    /// repository, pull request.
    pub fn resolve(args: &ActionArgs) -> Result<Self, ConfigError> {
        let token = args
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?
            .to_string();

        let requirements = parse_label_requirements(&args.label_requirements)?;

        let policy = ApprovalPolicy::default()
            .with_approve_no_requirements(parse_flag(&args.approve_no_requirements))
            .with_skip_assignees(parse_flag(&args.skip_assignees))
            .with_minimum_approvals(parse_minimum_approvals(&args.minimum_approvals_required));

        let repo: RepoCoordinates = args.repository.as_deref().unwrap_or_default().parse()?;

        // Pull request numbers start at 1; 0 means the input was not set.
        let pr_number = match (args.pr_number.filter(|n| *n != 0), args.event_path.as_deref()) {
            (Some(number), _) => number,
            (None, Some(path)) => pull_request_number_from_event(path)?
                .ok_or(ConfigError::MissingPullRequestNumber)?,
            (None, None) => return Err(ConfigError::MissingPullRequestNumber),
        };

        Ok(Settings {
            token,
            api_url: args.api_url.clone(),
            request: RunRequest {
                repo,
                pr_number,
                requirements,
                policy,
            },
        })
    }
}

/// `pull_request.number` from an event payload file, if the event has a
/// non-zero one.
pub fn pull_request_number_from_event(path: &Path) -> Result<Option<u64>, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::EventPayload(format!("{}: {e}", path.display())))?;
    let event: Value = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::EventPayload(format!("{}: {e}", path.display())))?;
    Ok(event
        .pointer("/pull_request/number")
        .and_then(Value::as_u64)
        .filter(|n| *n != 0))
}
