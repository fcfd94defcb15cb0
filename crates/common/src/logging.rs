//! Logging setup for ipset tools.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing with human readable output.
///
/// RUST_LOG takes precedence over `default_level`.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(default_level))
        .init();
}

/// Initialize tracing with JSON formatting.
pub fn init_json(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(env_filter(default_level))
        .init();
}
