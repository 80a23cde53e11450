//! Unit selection and severity classification
//!
//! Provides the core logic of the failed-unit check: pattern matching, count
//! thresholds and the orchestration tying them to a unit listing.

pub mod check;
pub mod matcher;
pub mod thresholds;
