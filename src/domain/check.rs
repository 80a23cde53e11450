//! Check orchestration
//!
//! Compiles the match rule, parses the unit listing, selects matching records
//! and classifies their count.

use std::time::Instant;

use tracing::{debug, error};

use crate::{
    config::Config,
    domain::{
        matcher::MatchRule,
        thresholds::{classify, Severity},
    },
    errors::CheckError,
    logging::log_check_summary,
    systemd_client::{parse_unit_listing, UnitSource, UnitStateRecord},
};

/// Result of one check run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub severity: Severity,
    pub message: String,
    /// Matched records, repeated once per matching pattern where applicable.
    pub units: Vec<UnitStateRecord>,
    pub skipped_lines: usize,
}

impl CheckOutcome {
    pub fn unknown(err: &CheckError) -> Self {
        Self {
            severity: Severity::Unknown,
            message: err.to_string(),
            units: Vec::new(),
            skipped_lines: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.units.len()
    }
}

/// Runs the check over an already obtained listing.
pub fn run_check(raw_listing: &str, config: &Config) -> Result<CheckOutcome, CheckError> {
    let rule = MatchRule::compile(&config.patterns, config.exclude_pattern.as_deref())?;
    Ok(evaluate(raw_listing, &rule, config))
}

fn evaluate(raw_listing: &str, rule: &MatchRule, config: &Config) -> CheckOutcome {
    let listing = parse_unit_listing(raw_listing);
    debug!(
        parsed = listing.records.len(),
        skipped = listing.skipped_lines,
        "parsed unit listing"
    );

    let units: Vec<UnitStateRecord> = rule
        .select(&listing.records, config.match_mode)
        .into_iter()
        .cloned()
        .collect();
    let count = i64::try_from(units.len()).unwrap_or(i64::MAX);
    let severity = classify(count, &config.thresholds);

    CheckOutcome {
        severity,
        message: format_matched_units(&units),
        units,
        skipped_lines: listing.skipped_lines,
    }
}

/// Fetches the listing from `source` and runs the check. Any failure becomes
/// an UNKNOWN outcome carrying the error text.
pub async fn execute(source: &dyn UnitSource, config: &Config) -> CheckOutcome {
    let started_at = Instant::now();

    // Patterns are validated before the source is queried.
    let outcome = match MatchRule::compile(&config.patterns, config.exclude_pattern.as_deref()) {
        Err(err) => CheckOutcome::unknown(&err),
        Ok(rule) => match source.failed_unit_listing().await {
            Ok(raw_listing) => evaluate(&raw_listing, &rule, config),
            Err(err) => {
                error!(error = %err, "failed to obtain unit states");
                CheckOutcome::unknown(&err)
            }
        },
    };

    log_check_summary(&outcome, started_at.elapsed());
    outcome
}

pub fn format_matched_units(units: &[UnitStateRecord]) -> String {
    let rendered = units
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("\n[{rendered}]")
}
