//! JSON report output.
//!
//! Two flavors: [`JsonReporter`] buffers every report and writes one JSON
//! document on close; [`NdjsonReporter`] streams one JSON object per
//! report as it is delivered, which keeps memory flat for very large
//! analyses.

use std::io::Write;

use serde::Serialize;

use crate::engine::Reporter;
use crate::error::{ApiDriftError, ReportErrorKind, Result};
use crate::model::Report;

#[derive(Serialize)]
struct JsonDocument<'a> {
    reports: &'a [Report],
}

/// Buffers reports and writes a single JSON document on close.
pub struct JsonReporter {
    writer: Box<dyn Write + Send>,
    reports: Vec<Report>,
}

impl JsonReporter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            reports: Vec::new(),
        }
    }

    #[must_use]
    pub fn to_stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl Reporter for JsonReporter {
    fn report(&mut self, report: &Report) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let document = JsonDocument {
            reports: &self.reports,
        };
        serde_json::to_writer_pretty(&mut self.writer, &document).map_err(|e| {
            ApiDriftError::report("writing JSON report", ReportErrorKind::Serialization(e.to_string()))
        })?;
        writeln!(self.writer).map_err(|e| {
            ApiDriftError::report("writing JSON report", ReportErrorKind::Write(e.to_string()))
        })?;
        self.writer.flush().map_err(|e| {
            ApiDriftError::report("flushing JSON report", ReportErrorKind::Write(e.to_string()))
        })
    }
}

/// Streams one JSON object per report, newline-delimited.
pub struct NdjsonReporter {
    writer: Box<dyn Write + Send>,
}

impl NdjsonReporter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }

    #[must_use]
    pub fn to_stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl Reporter for NdjsonReporter {
    fn report(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report).map_err(|e| {
            ApiDriftError::report("writing NDJSON report", ReportErrorKind::Serialization(e.to_string()))
        })?;
        writeln!(self.writer).map_err(|e| {
            ApiDriftError::report("writing NDJSON report", ReportErrorKind::Write(e.to_string()))
        })
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            ApiDriftError::report("flushing NDJSON report", ReportErrorKind::Write(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Compatibility, Difference, Severity};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_report(code: &str) -> Report {
        Report::new(
            None,
            None,
            vec![Difference::builder(code)
                .classify(Compatibility::Source, Severity::Breaking)
                .build()],
        )
    }

    #[test]
    fn json_reporter_writes_one_document() {
        let buf = SharedBuf::default();
        let mut reporter = JsonReporter::new(Box::new(buf.clone()));
        reporter.report(&sample_report("a.b")).unwrap();
        reporter.report(&sample_report("c.d")).unwrap();
        reporter.close().unwrap();

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["reports"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn ndjson_reporter_writes_one_line_per_report() {
        let buf = SharedBuf::default();
        let mut reporter = NdjsonReporter::new(Box::new(buf.clone()));
        reporter.report(&sample_report("a.b")).unwrap();
        reporter.report(&sample_report("c.d")).unwrap();
        reporter.close().unwrap();

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(parsed["differences"].is_array());
        }
    }
}
