//! Tracing setup for binaries and test suites embedding janitor

use janitor_core::{Error, Result, DEFAULT_LOG_FILTER, JANITOR_LOG_VAR};
use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber writing compact lines to stderr.
///
/// The filter comes from `JANITOR_LOG`, then `RUST_LOG`, then defaults to
/// `warn`. Fails if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::configuration(format!("failed to install tracing subscriber: {e}")))
}

static TEST_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_test_writer())
        .try_init();
});

/// Install a test-friendly subscriber once per process; later calls do nothing
pub fn init_for_tests() {
    Lazy::force(&TEST_SUBSCRIBER);
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(JANITOR_LOG_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
