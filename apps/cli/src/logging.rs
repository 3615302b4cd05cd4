use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PLUGDESK_LOG=debug`.
pub const LOG_ENV: &str = "PLUGDESK_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs a stderr subscriber; stdout stays reserved for command output.
/// Returns `false` when a global subscriber was already set.
pub fn init() -> bool {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}
