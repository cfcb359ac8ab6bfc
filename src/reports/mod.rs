//! Built-in reporters.
//!
//! Reporters are terminal consumers of non-empty reports, invoked in
//! registration order as the traversal closes each element pair. The
//! built-ins cover human-readable summaries, buffered JSON, streamed
//! NDJSON (one object per report, written as delivered) and an in-memory
//! recorder for tests and embedding.

mod json;
mod recording;
mod summary;

pub use json::{JsonReporter, NdjsonReporter};
pub use recording::{RecordedReports, RecordingReporter};
pub use summary::SummaryReporter;

use std::io::Write;

use crate::engine::Reporter;

/// Output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable per-difference lines with severity totals.
    Summary,
    /// One JSON document holding every report.
    Json,
    /// Newline-delimited JSON, one object per report, streamed.
    Ndjson,
}

/// Create a reporter for the given format writing to `writer`.
#[must_use]
pub fn create_reporter(format: ReportFormat, writer: Box<dyn Write + Send>) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Summary => Box::new(SummaryReporter::new(writer)),
        ReportFormat::Json => Box::new(JsonReporter::new(writer)),
        ReportFormat::Ndjson => Box::new(NdjsonReporter::new(writer)),
    }
}
