use std::env;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`error`, `warn`, `info`, `debug`, or a full
/// `EnvFilter` directive such as `chess_history=debug`).
pub const LOG_ENV: &str = "CHESS_LOG";

const DEFAULT_LEVEL: &str = "warn";

fn level_alias(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "error" | "err" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

fn filter_from(raw: Option<&str>) -> EnvFilter {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return EnvFilter::new(DEFAULT_LEVEL);
    };

    if let Some(level) = level_alias(raw) {
        return EnvFilter::new(level);
    }

    EnvFilter::try_new(raw).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the stderr subscriber. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let raw = env::var(LOG_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from(raw.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
