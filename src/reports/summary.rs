//! Human-readable summary output.

use std::collections::BTreeMap;
use std::io::Write;

use crate::engine::Reporter;
use crate::error::{ApiDriftError, ReportErrorKind, Result};
use crate::model::{Report, Severity};

/// Writes one line per difference as reports arrive and severity totals on
/// close.
pub struct SummaryReporter {
    writer: Box<dyn Write + Send>,
    totals: BTreeMap<Severity, usize>,
}

impl SummaryReporter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            totals: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn to_stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn write_error(e: std::io::Error) -> ApiDriftError {
        ApiDriftError::report("writing summary", ReportErrorKind::Write(e.to_string()))
    }
}

impl Reporter for SummaryReporter {
    fn report(&mut self, report: &Report) -> Result<()> {
        let subject = report.subject_name();
        for difference in &report.differences {
            let severity = difference.max_severity();
            *self.totals.entry(severity).or_insert(0) += 1;

            writeln!(
                self.writer,
                "{:<22} {:<34} {subject}",
                severity.as_str(),
                difference.code,
            )
            .map_err(Self::write_error)?;
            if let Some(description) = &difference.description {
                for line in description.lines().filter(|l| !l.is_empty()) {
                    writeln!(self.writer, "{:<22} {line}", "").map_err(Self::write_error)?;
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let total: usize = self.totals.values().sum();
        if total == 0 {
            writeln!(self.writer, "no API differences found").map_err(Self::write_error)?;
        } else {
            // Most severe first.
            let parts: Vec<String> = self
                .totals
                .iter()
                .rev()
                .map(|(severity, count)| format!("{count} {severity}"))
                .collect();
            writeln!(self.writer, "{total} differences: {}", parts.join(", "))
                .map_err(Self::write_error)?;
        }
        self.writer.flush().map_err(Self::write_error)
    }
}
