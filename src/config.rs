use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::domain::{matcher::MatchMode, thresholds::ThresholdConfig};

/// Where the failed-unit listing is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// `systemctl --failed --no-legend --plain`
    #[default]
    Systemctl,
    /// systemd manager over the system D-Bus
    Dbus,
    /// A saved listing, see `--input`
    File,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "check-systemd")]
#[command(version, about = "Count failed systemd units and report a check severity")]
#[command(long_about = "Count failed systemd units and report a check severity.\n\n\
    Exit codes:\n  \
    0 - OK\n  \
    1 - WARNING\n  \
    2 - CRITICAL\n  \
    3 - UNKNOWN")]
pub struct Cli {
    /// Trigger a warning if over a number
    #[arg(short = 'w', long, value_name = "N", allow_negative_numbers = true)]
    pub warning_over: Option<i64>,

    /// Trigger a critical if over a number
    #[arg(short = 'c', long, value_name = "N", allow_negative_numbers = true)]
    pub critical_over: Option<i64>,

    /// Match a unit name against these patterns
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Don't match against a pattern to prevent false positives
    #[arg(short = 'x', long, value_name = "PATTERN")]
    pub exclude_pattern: Option<String>,

    /// Count a unit once per matching pattern, or once if any pattern matches
    #[arg(long, value_enum, default_value = "per-pattern")]
    pub match_mode: MatchMode,

    /// Where to read failed units from
    #[arg(long, value_enum, default_value = "systemctl")]
    pub source: SourceKind,

    /// Listing file used with `--source file` (`-` reads stdin)
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("--input is required when --source is file")]
    MissingInputPath,
}

/// Immutable settings for one check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub patterns: Vec<String>,
    pub exclude_pattern: Option<String>,
    pub match_mode: MatchMode,
    pub source: SourceKind,
    pub input: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        // An empty exclusion pattern means no exclusion at all.
        let exclude_pattern = cli.exclude_pattern.filter(|pattern| !pattern.is_empty());

        if cli.source == SourceKind::File && cli.input.is_none() {
            return Err(ConfigError::MissingInputPath);
        }

        Ok(Self {
            thresholds: ThresholdConfig {
                warning_over: cli.warning_over,
                critical_over: cli.critical_over,
            },
            patterns: cli.patterns,
            exclude_pattern,
            match_mode: cli.match_mode,
            source: cli.source,
            input: cli.input,
            format: cli.format,
        })
    }

    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)
            .map_err(|err| ConfigError::InvalidArguments(err.to_string().trim().to_string()))?;
        Self::from_cli(cli)
    }
}
