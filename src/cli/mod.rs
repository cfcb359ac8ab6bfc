//! Command handler for the `apidrift` binary.
//!
//! The binary is a thin wrapper over the engine: two positional archives,
//! every built-in extension registered, configuration taken from
//! `APIDRIFT_*` environment variables. Findings are data, not failures:
//! the command succeeds regardless of what the analysis reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzers::ManifestApiAnalyzer;
use crate::config::AnalysisConfig;
use crate::engine::{DriftEngine, StaticRegistry};
use crate::error::{ApiDriftError, Result};
use crate::model::{Api, Archive, FileArchive};
use crate::reports::{create_reporter, ReportFormat};
use crate::transforms::{IgnoreTransform, ReclassifyTransform};

/// Arguments of one `apidrift` invocation.
pub struct DiffInvocation {
    /// The old-side primary archive.
    pub old: PathBuf,
    /// The new-side primary archive.
    pub new: PathBuf,
    /// Dependency archives resolving references on the old side.
    pub old_supplementary: Vec<PathBuf>,
    /// Dependency archives resolving references on the new side.
    pub new_supplementary: Vec<PathBuf>,
    pub format: ReportFormat,
    /// Report destination; stdout when absent.
    pub output_file: Option<PathBuf>,
    pub locale: String,
}

/// The registry of every built-in extension: the manifest analyzer and the
/// configuration-driven transforms. Reporters are constructed separately
/// because their output destination comes from the invocation.
#[must_use]
pub fn default_registry() -> StaticRegistry {
    StaticRegistry::new()
        .with_analyzer(ManifestApiAnalyzer::new)
        .with_transform(IgnoreTransform::new)
        .with_transform(ReclassifyTransform::new)
}

fn file_api(primary: &Path, supplementary: &[PathBuf]) -> Api {
    Api::new(
        [Arc::new(FileArchive::new(primary)) as Arc<dyn Archive>],
        supplementary
            .iter()
            .map(|p| Arc::new(FileArchive::new(p)) as Arc<dyn Archive>),
    )
}

/// Run one analysis. Returns `Ok` on a successful analysis regardless of
/// findings; reporters decide what to do with those.
pub fn run_diff(invocation: DiffInvocation) -> Result<()> {
    let config = AnalysisConfig::from_env(&invocation.locale);

    let writer: Box<dyn Write + Send> = match &invocation.output_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| ApiDriftError::io(path, e))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };
    let reporter = create_reporter(invocation.format, writer);

    let mut engine = DriftEngine::builder()
        .with_extensions(&default_registry())
        .with_reporter(reporter)
        .with_configuration(config)
        .build()?;

    let old = file_api(&invocation.old, &invocation.old_supplementary);
    let new = file_api(&invocation.new, &invocation.new_supplementary);

    tracing::info!(
        old = %invocation.old.display(),
        new = %invocation.new.display(),
        "starting API compatibility analysis"
    );
    engine.analyze(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_carries_analyzer_and_transforms() {
        use crate::engine::ExtensionRegistry;

        let registry = default_registry();
        assert_eq!(registry.analyzers().len(), 1);
        assert_eq!(registry.transforms().len(), 2);
        assert!(registry.reporters().is_empty());
    }

    #[test]
    fn missing_archive_surfaces_an_error() {
        let invocation = DiffInvocation {
            old: PathBuf::from("/nonexistent/old.api.json"),
            new: PathBuf::from("/nonexistent/new.api.json"),
            old_supplementary: Vec::new(),
            new_supplementary: Vec::new(),
            format: ReportFormat::Summary,
            output_file: None,
            locale: "en-US".to_string(),
        };
        assert!(run_diff(invocation).is_err());
    }
}
