//! labelgate - approve pull requests once label owners have signed off
//!
//! Reads the action inputs, evaluates the pull request's label requirements
//! against its reviews and approves, dismisses or leaves the bot's approval
//! as it is. Failures are reported as a GitHub workflow `::error::` command
//! on stdout and a non-zero exit status.

mod settings;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};

use labelgate_core::{run, FailureReport, RunOutcome};
use labelgate_github::{GitHubClient, GitHubConfig};

use crate::settings::{ActionArgs, Settings};

#[derive(Parser)]
#[command(name = "labelgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Label-based pull request approvals", long_about = None)]
struct Cli {
    /// Enable verbose output (also enabled by `RUNNER_DEBUG=1`)
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    action: ActionArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose || runner_debug() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    labelgate_core::init_tracing(cli.json, level);

    let (client, settings) = match prepare(&cli.action) {
        Ok(prepared) => prepared,
        Err(err) => {
            error!(error = %format!("{err:#}"), "configuration rejected");
            workflow_error(&format!("{err:#}"));
            return ExitCode::FAILURE;
        }
    };

    match run(&client, &settings.request).await {
        RunOutcome::Completed(applied) => {
            info!(decision = %applied.decision, "labelgate finished");
            ExitCode::SUCCESS
        }
        RunOutcome::Failed(FailureReport { message, .. }) => {
            workflow_error(&message);
            ExitCode::FAILURE
        }
    }
}

/// Validate inputs and build the API client. No request is sent here.
fn prepare(args: &ActionArgs) -> Result<(GitHubClient, Settings)> {
    let settings = Settings::resolve(args)?;
    let config = GitHubConfig::new(settings.token.as_str()).with_api_url(settings.api_url.as_str());
    let client = GitHubClient::new(config).context("failed to build GitHub client")?;
    Ok((client, settings))
}

fn runner_debug() -> bool {
    std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1")
}

/// Surface a failure in the workflow run summary.
fn workflow_error(message: &str) {
    println!("::error::{}", escape_workflow_data(message));
}

/// Workflow commands end at a newline, so line breaks and `%` are encoded.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
