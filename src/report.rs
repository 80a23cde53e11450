//! Check report rendering
//!
//! Text output follows the monitoring plugin convention `NAME STATUS: message`;
//! JSON output carries the same fields plus the matched records.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    config::OutputFormat,
    domain::{check::CheckOutcome, thresholds::Severity},
    systemd_client::UnitStateRecord,
};

pub const CHECK_NAME: &str = "Systemd";

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub name: &'static str,
    pub status: Severity,
    pub message: &'a str,
    pub count: usize,
    pub skipped_lines: usize,
    pub units: &'a [UnitStateRecord],
    pub generated_at_utc: String,
}

pub fn render(outcome: &CheckOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => render_json(outcome),
    }
}

pub fn render_text(outcome: &CheckOutcome) -> String {
    format!("{CHECK_NAME} {}: {}", outcome.severity, outcome.message)
}

pub fn render_json(outcome: &CheckOutcome) -> String {
    let report = JsonReport {
        name: CHECK_NAME,
        status: outcome.severity,
        message: &outcome.message,
        count: outcome.count(),
        skipped_lines: outcome.skipped_lines,
        units: &outcome.units,
        generated_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    match serde_json::to_string(&report) {
        Ok(json) => json,
        Err(err) => format!(
            "{{\"name\":\"{CHECK_NAME}\",\"status\":\"UNKNOWN\",\"message\":{:?}}}",
            err.to_string()
        ),
    }
}
