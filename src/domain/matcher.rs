//! Inclusion and exclusion pattern matching over unit names

use clap::ValueEnum;
use regex::Regex;

use crate::{errors::CheckError, systemd_client::UnitStateRecord};

const CATCH_ALL_PATTERN: &str = ".*";

/// How a record matched by several inclusion patterns is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Once per matching inclusion pattern
    #[default]
    PerPattern,
    /// Once if any inclusion pattern matches
    Any,
}

#[derive(Debug, Clone)]
pub struct MatchRule {
    inclusions: Vec<Regex>,
    inclusion_configured: bool,
    exclusion: Option<Regex>,
}

impl MatchRule {
    /// Compiles every pattern up front. With no inclusion patterns a single
    /// catch-all pattern stands in, so every record is considered.
    pub fn compile(patterns: &[String], exclude_pattern: Option<&str>) -> Result<Self, CheckError> {
        let mut inclusions = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| CheckError::invalid_pattern(pattern, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inclusion_configured = !inclusions.is_empty();
        if !inclusion_configured {
            inclusions.push(
                Regex::new(CATCH_ALL_PATTERN)
                    .map_err(|err| CheckError::invalid_pattern(CATCH_ALL_PATTERN, err))?,
            );
        }

        let exclusion = exclude_pattern
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| CheckError::invalid_pattern(pattern, err))
            })
            .transpose()?;

        Ok(Self {
            inclusions,
            inclusion_configured,
            exclusion,
        })
    }

    pub fn inclusion_count(&self) -> usize {
        self.inclusions.len()
    }

    /// Returns the selected records. In `PerPattern` mode this walks every
    /// inclusion pattern against every record, so a unit matched by two
    /// patterns appears twice.
    pub fn select<'a>(
        &self,
        records: &'a [UnitStateRecord],
        mode: MatchMode,
    ) -> Vec<&'a UnitStateRecord> {
        let exclusion = self.exclusion.as_ref();
        match mode {
            MatchMode::PerPattern => {
                let mut selected = Vec::new();
                for inclusion in &self.inclusions {
                    for record in records {
                        if matches(record, inclusion, exclusion, self.inclusion_configured) {
                            selected.push(record);
                        }
                    }
                }
                selected
            }
            MatchMode::Any => records
                .iter()
                .filter(|record| {
                    self.inclusions.iter().any(|inclusion| {
                        matches(record, inclusion, exclusion, self.inclusion_configured)
                    })
                })
                .collect(),
        }
    }
}

pub fn matches(
    record: &UnitStateRecord,
    inclusion: &Regex,
    exclusion: Option<&Regex>,
    inclusion_configured: bool,
) -> bool {
    let included = !inclusion_configured || inclusion.is_match(&record.unit);
    let excluded = exclusion.is_some_and(|exclusion| exclusion.is_match(&record.unit));
    included && !excluded
}
