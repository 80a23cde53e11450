//! Severity levels and count thresholds
//!
//! Maps a matched-unit count onto OK, WARNING or CRITICAL.

use std::{cmp::Ordering, fmt};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }

    fn rank(self) -> Option<u8> {
        match self {
            Self::Ok => Some(0),
            Self::Warning => Some(1),
            Self::Critical => Some(2),
            Self::Unknown => None,
        }
    }
}

/// UNKNOWN sits outside the OK < WARNING < CRITICAL scale and only compares
/// equal to itself.
impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exclusive lower bounds; `None` disables that level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdConfig {
    pub warning_over: Option<i64>,
    pub critical_over: Option<i64>,
}

pub fn classify(count: i64, thresholds: &ThresholdConfig) -> Severity {
    if thresholds
        .critical_over
        .is_some_and(|critical_over| count > critical_over)
    {
        return Severity::Critical;
    }

    if thresholds
        .warning_over
        .is_some_and(|warning_over| count > warning_over)
    {
        return Severity::Warning;
    }

    Severity::Ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(warning_over: Option<i64>, critical_over: Option<i64>) -> ThresholdConfig {
        ThresholdConfig {
            warning_over,
            critical_over,
        }
    }

    #[test]
    fn no_thresholds_is_always_ok() {
        let config = ThresholdConfig::default();
        for count in [0, 1, 42, i64::MAX] {
            assert_eq!(classify(count, &config), Severity::Ok);
        }
    }

    #[test]
    fn bounds_are_exclusive() {
        let config = thresholds(Some(2), Some(5));
        assert_eq!(classify(2, &config), Severity::Ok);
        assert_eq!(classify(3, &config), Severity::Warning);
        assert_eq!(classify(5, &config), Severity::Warning);
        assert_eq!(classify(6, &config), Severity::Critical);
    }

    #[test]
    fn critical_wins_when_both_are_breached() {
        // critical below warning still takes priority
        let config = thresholds(Some(10), Some(1));
        assert_eq!(classify(11, &config), Severity::Critical);
        assert_eq!(classify(5, &config), Severity::Critical);
        assert_eq!(classify(1, &config), Severity::Ok);
    }

    #[test]
    fn warning_only_threshold() {
        let config = thresholds(Some(0), None);
        assert_eq!(classify(0, &config), Severity::Ok);
        assert_eq!(classify(1, &config), Severity::Warning);
        assert_eq!(classify(1_000, &config), Severity::Warning);
    }

    #[test]
    fn critical_only_threshold() {
        let config = thresholds(None, Some(0));
        assert_eq!(classify(0, &config), Severity::Ok);
        assert_eq!(classify(1, &config), Severity::Critical);
    }

    #[test]
    fn unknown_is_not_on_the_ordinal_scale() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(Severity::Unknown.partial_cmp(&Severity::Ok), None);
        assert_eq!(Severity::Critical.partial_cmp(&Severity::Unknown), None);
        assert_eq!(
            Severity::Unknown.partial_cmp(&Severity::Unknown),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn exit_codes_follow_plugin_convention() {
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warning.exit_code(), 1);
        assert_eq!(Severity::Critical.exit_code(), 2);
        assert_eq!(Severity::Unknown.exit_code(), 3);
    }
}
