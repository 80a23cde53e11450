pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod report;
pub mod systemd_client;

use config::{Config, SourceKind};
use systemd_client::{DbusSystemdSource, FileSource, SystemctlSource, UnitSource};

pub use domain::check::{execute, run_check, CheckOutcome};
pub use domain::thresholds::Severity;

pub fn unit_source(config: &Config) -> Box<dyn UnitSource> {
    match (config.source, config.input.as_ref()) {
        (SourceKind::Dbus, _) => Box::new(DbusSystemdSource::new()),
        (SourceKind::File, Some(path)) => Box::new(FileSource::new(path)),
        // `Config::from_cli` rejects a file source without a path
        (SourceKind::File, None) | (SourceKind::Systemctl, _) => Box::new(SystemctlSource::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::errors::CheckError;
    use crate::report::render_text;

    use super::*;

    struct MockSource {
        listing: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn listing(listing: &'static str) -> Self {
            Self {
                listing: Ok(listing),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                listing: Err(message),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl UnitSource for MockSource {
        async fn failed_unit_listing(&self) -> Result<String, CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.listing
                .map(str::to_string)
                .map_err(CheckError::source_unavailable)
        }
    }

    const FAILED_UNITS: &str = "\
nginx.service   loaded    failed failed A high performance web server
foo.service     not-found failed failed foo.service
backup.timer    loaded    failed failed Nightly backup

";

    #[tokio::test]
    async fn reports_failed_units_over_thresholds() {
        let source = MockSource::listing(FAILED_UNITS);
        let config = Config::from_args(["check-systemd", "-w", "1", "-c", "2"])
            .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(outcome.count(), 3);
        assert_eq!(outcome.skipped_lines, 1);
        assert!(render_text(&outcome).starts_with("Systemd CRITICAL: \n[{\"nginx.service\""));
    }

    #[tokio::test]
    async fn pattern_multiplicity_reaches_classification() {
        let source = MockSource::listing("nginx.service loaded failed failed Web server\n");
        let config = Config::from_args([
            "check-systemd",
            "--warning-over",
            "1",
            "-p",
            "ngin.*",
            "-p",
            ".*service",
        ])
        .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.count(), 2);
        assert_eq!(outcome.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn exclusion_keeps_check_ok() {
        let source = MockSource::listing(FAILED_UNITS);
        let config = Config::from_args(["check-systemd", "-w", "0", "-p", "service$", "-x", "^foo"])
            .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.units[0].unit, "nginx.service");
        assert_eq!(outcome.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn source_failure_is_unknown_with_detail() {
        let source = MockSource::failing("systemctl exited with exit status: 1");
        let config = Config::from_args(["check-systemd"]).expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.severity, Severity::Unknown);
        assert!(outcome.message.contains("systemctl exited with exit status: 1"));
        assert!(outcome.units.is_empty());
    }

    #[tokio::test]
    async fn invalid_pattern_short_circuits_before_source() {
        let source = MockSource::listing(FAILED_UNITS);
        let config = Config::from_args(["check-systemd", "-c", "0", "-p", "nginx(", "-x", "ok"])
            .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.severity, Severity::Unknown);
        assert!(outcome.message.starts_with("invalid pattern \"nginx(\""));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_exclusion_is_unknown() {
        let source = MockSource::listing(FAILED_UNITS);
        let config = Config::from_args(["check-systemd", "-x", "*bad"])
            .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.severity, Severity::Unknown);
        assert!(outcome.message.contains("*bad"));
    }

    #[tokio::test]
    async fn empty_listing_is_ok() {
        let source = MockSource::listing("");
        let config = Config::from_args(["check-systemd", "-w", "0", "-c", "0"])
            .expect("config should parse");

        let outcome = execute(&source, &config).await;

        assert_eq!(outcome.severity, Severity::Ok);
        assert_eq!(render_text(&outcome), "Systemd OK: \n[]");
    }

    #[test]
    fn file_source_is_selected_with_input() {
        let config = Config::from_args(["check-systemd", "--source", "file", "--input", "-"])
            .expect("config should parse");
        // construction only; reading stdin is not exercised here
        let _source = unit_source(&config);
    }
}
