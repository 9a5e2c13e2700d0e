//! Audit results and reporting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// A single file that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeFailure {
    /// Path to the offending file.
    pub path: PathBuf,

    /// Decoder error message.
    pub reason: String,
}

impl DecodeFailure {
    /// Creates a new decode failure record.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Aggregate results of an image audit walk.
///
/// # Example
///
/// ```
/// use facenet_dataset::{AuditReport, DecodeFailure};
///
/// let mut report = AuditReport::new();
/// report.scanned = 3;
/// report.record_failure(DecodeFailure::new("bad.jpg", "truncated"));
///
/// assert_eq!(report.error_count(), 1);
/// assert!(!report.is_clean());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuditReport {
    /// Number of files whose extension matched and were decode-attempted.
    pub scanned: usize,

    /// Files that failed to decode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DecodeFailure>,

    /// Files skipped because their extension did not match.
    pub skipped: usize,

    /// Directory entries the walk could not read.
    pub walk_errors: usize,
}

impl AuditReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scanned: 0,
            failures: Vec::new(),
            skipped: 0,
            walk_errors: 0,
        }
    }

    /// Records a decode failure.
    pub fn record_failure(&mut self, failure: DecodeFailure) {
        self.failures.push(failure);
    }

    /// Number of files that failed to decode.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if every attempted file decoded and the walk read every
    /// entry.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.walk_errors == 0
    }

    /// Returns a human-readable summary string.
    #[must_use]
    #[allow(clippy::let_underscore_must_use)] // String::write_fmt is infallible
    pub fn to_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        let _ = writeln!(report, "Image Audit");
        let _ = writeln!(report, "===========");
        let _ = writeln!(report, "Files scanned: {}", self.scanned);
        let _ = writeln!(report, "Decode failures: {}", self.error_count());
        let _ = writeln!(report, "Skipped (extension): {}", self.skipped);
        let _ = writeln!(report, "Walk errors: {}", self.walk_errors);

        if !self.failures.is_empty() {
            let _ = writeln!(report, "\nFailures:");
            for failure in &self.failures {
                let _ = writeln!(report, "  {}: {}", failure.path.display(), failure.reason);
            }
        }

        report
    }

    /// Serializes the report to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(DatasetError::from)
    }

    /// Deserializes a report from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(DatasetError::from)
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files scanned, {} decode failures, {} skipped, {} walk errors",
            self.scanned,
            self.error_count(),
            self.skipped,
            self.walk_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AuditReport {
        let mut report = AuditReport::new();
        report.scanned = 12;
        report.skipped = 3;
        report.record_failure(DecodeFailure::new("images/bad.jpg", "truncated file"));
        report.record_failure(DecodeFailure::new("images/worse.png", "bad signature"));
        report
    }

    #[test]
    fn report_new_is_clean() {
        let report = AuditReport::new();
        assert_eq!(report.scanned, 0);
        assert_eq!(report.error_count(), 0);
        assert!(report.is_clean());
        assert_eq!(AuditReport::default(), report);
    }

    #[test]
    fn report_records_failures() {
        let report = sample_report();
        assert_eq!(report.error_count(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].path, PathBuf::from("images/bad.jpg"));
        assert_eq!(report.failures[0].reason, "truncated file");
    }

    #[test]
    fn report_walk_errors_are_not_clean() {
        let mut report = AuditReport::new();
        report.walk_errors = 1;
        assert!(!report.is_clean());
    }

    #[test]
    fn report_to_report() {
        let report = sample_report();
        let text = report.to_report();

        assert!(text.contains("Files scanned: 12"));
        assert!(text.contains("Decode failures: 2"));
        assert!(text.contains("Skipped (extension): 3"));
        assert!(text.contains("images/bad.jpg: truncated file"));
    }

    #[test]
    fn report_display() {
        let report = sample_report();
        let line = format!("{report}");
        assert!(line.contains("12 files scanned"));
        assert!(line.contains("2 decode failures"));
    }

    #[test]
    fn report_json_round_trip() {
        let report = sample_report();
        let json = report.to_json();
        assert!(json.is_ok());

        let parsed = AuditReport::from_json(&json.unwrap_or_default());
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap_or_default(), report);
    }

    #[test]
    fn report_serialization_skips_empty_failures() {
        let report = AuditReport::new();
        let json = report.to_json().unwrap_or_default();
        assert!(!json.contains("failures"));
    }
}
