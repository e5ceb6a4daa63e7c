//! Log output for labelgate.
//!
//! When labelgate runs as a GitHub Action, stdout is reserved for workflow
//! commands: the runner parses `::error::` lines there and shows them in the
//! run summary. All log lines therefore go to stderr, where the runner shows
//! them as plain step output. `RUST_LOG` overrides the level picked by the
//! binary from `--verbose` or `RUNNER_DEBUG`.

use tracing::{debug, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber, as JSON lines when `json` is set.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry.with(stderr_layer.json()).try_init()
    } else {
        registry.with(stderr_layer).try_init()
    };
    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
}
