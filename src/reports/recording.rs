//! In-memory report recording.
//!
//! Used by the test suite and by embedders that want to inspect reports
//! programmatically after an analysis instead of rendering them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::engine::Reporter;
use crate::error::Result;
use crate::model::Report;

/// Shared handle onto the reports a [`RecordingReporter`] received.
///
/// Clones observe the same underlying storage, so a handle taken before
/// the reporter is handed to the engine stays valid afterwards.
#[derive(Clone, Default)]
pub struct RecordedReports {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordedReports {
    /// All recorded reports, in delivery order.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().expect("recorded reports lock").clone()
    }

    /// Difference counts keyed by code, across all reports.
    #[must_use]
    pub fn count_by_code(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for report in self.reports.lock().expect("recorded reports lock").iter() {
            for difference in &report.differences {
                *counts.entry(difference.code.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().expect("recorded reports lock").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, report: Report) {
        self.reports.lock().expect("recorded reports lock").push(report);
    }
}

/// A reporter that stores every delivered report in memory.
#[derive(Default)]
pub struct RecordingReporter {
    records: RecordedReports,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stays valid after the reporter is moved into the
    /// engine.
    #[must_use]
    pub fn records(&self) -> RecordedReports {
        self.records.clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, report: &Report) -> Result<()> {
        self.records.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difference;

    #[test]
    fn handle_survives_reporter_move() {
        let reporter = RecordingReporter::new();
        let records = reporter.records();

        let mut boxed: Box<dyn Reporter> = Box::new(reporter);
        boxed
            .report(&Report::new(
                None,
                None,
                vec![
                    Difference::builder("a.b").build(),
                    Difference::builder("a.b").build(),
                ],
            ))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records.count_by_code().get("a.b"), Some(&2));
    }
}
