use std::time::Duration;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::check::CheckOutcome;

/// Logs go to stderr so stdout only carries the check report.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub fn log_check_summary(outcome: &CheckOutcome, elapsed: Duration) {
    info!(
        severity = %outcome.severity,
        matched = outcome.count(),
        skipped_lines = outcome.skipped_lines,
        duration_ms = elapsed.as_millis(),
        "check summary"
    );
}
