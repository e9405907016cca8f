//! Diagnostic stream: `tracing` events formatted to stderr.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,media_screen=info";

pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
