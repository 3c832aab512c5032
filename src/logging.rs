//! Tracing setup.
//!
//! Verbosity comes from `LOG_LEVEL` (read once), defaulting to errors only.
//! `RUST_LOG`, when set, wins over `LOG_LEVEL`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "error";

/// Map a `LOG_LEVEL` value onto a tracing level name.
///
/// Accepts tracing names and the Python-style `WARNING`, `CRITICAL`,
/// `FATAL` and `NOTSET`. Anything unrecognised falls back to
/// [`DEFAULT_LOG_LEVEL`].
pub fn level_from_env_value(value: Option<&str>) -> &'static str {
    let Some(raw) = value else {
        return DEFAULT_LOG_LEVEL;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" | "notset" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" => "off",
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init() {
    let level = level_from_env_value(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();

    tracing::debug!(filter = level, "tracing initialized");
}
