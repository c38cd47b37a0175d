//! Log subscriber setup

use crate::config::{CliConfig, Verbosity};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a verbosity level, applied to the khelcard crates
#[must_use]
pub fn default_directive(verbosity: Verbosity) -> String {
    let level = verbosity.log_filter();
    format!("{level},khelcard={level},khelcard_cli={level}")
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the `-v` count. Logs go to stderr so command output
/// on stdout stays machine-readable. Returns `false` if a subscriber was
/// already installed.
pub fn init(config: &CliConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(config.verbosity).into());

    let json = config.log_json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_ansi(config.color.should_color())
                .with_target(false)
                .with_writer(std::io::stderr)
        }))
        .try_init()
        .is_ok()
}
