//! Per-run outcome aggregation.

use serde::{Deserialize, Serialize};

/// An attachment that was analyzed, whether committed or skipped as a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedEntry {
    pub filename: String,
    pub subject: String,
    pub address: String,
    pub price: Option<f64>,
    /// True when an existing row already covered this address and date.
    pub skipped: bool,
}

/// An attachment whose processing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntry {
    pub filename: String,
    pub subject: String,
    pub error: String,
}

/// Outcomes for one pipeline invocation. Consumed by the notification step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub successes: Vec<ProcessedEntry>,
    pub failures: Vec<FailedEntry>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }

    /// Number of rows actually written to the store.
    pub fn committed(&self) -> usize {
        self.successes.iter().filter(|s| !s.skipped).count()
    }

    /// Number of attachments skipped as duplicates.
    pub fn skipped(&self) -> usize {
        self.successes.iter().filter(|s| s.skipped).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(skipped: bool) -> ProcessedEntry {
        ProcessedEntry {
            filename: "offer.pdf".to_string(),
            subject: "New offer".to_string(),
            address: "123 Main St".to_string(),
            price: Some(500000.0),
            skipped,
        }
    }

    #[test]
    fn default_summary_is_empty() {
        assert!(RunSummary::default().is_empty());
    }

    #[test]
    fn counts_split_committed_and_skipped() {
        let summary = RunSummary {
            successes: vec![success(false), success(true), success(false)],
            failures: vec![],
        };
        assert!(!summary.is_empty());
        assert_eq!(summary.committed(), 2);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn failures_alone_make_summary_non_empty() {
        let summary = RunSummary {
            successes: vec![],
            failures: vec![FailedEntry {
                filename: "big.pdf".to_string(),
                subject: String::new(),
                error: "too large".to_string(),
            }],
        };
        assert!(!summary.is_empty());
    }
}
