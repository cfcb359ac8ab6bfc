//! The differencing engine.
//!
//! [`DriftEngine`] walks two parallel API element trees in locked step
//! using ordered co-iteration, hands each element pair to the analyzer's
//! difference analyzer, passes the collected differences through the
//! transform chain and delivers the surviving reports to the reporters.
//!
//! The engine is assembled once per analysis run from pluggable
//! components, either registered explicitly on the builder or discovered
//! through an [`ExtensionRegistry`]. One engine instance runs one analysis
//! at a time; distinct instances are independent.
//!
//! ```no_run
//! use apidrift::engine::DriftEngine;
//! use apidrift::analyzers::ManifestApiAnalyzer;
//! use apidrift::reports::SummaryReporter;
//! use apidrift::model::{Api, Archive, FileArchive};
//! use std::sync::Arc;
//!
//! # fn main() -> apidrift::error::Result<()> {
//! let mut engine = DriftEngine::builder()
//!     .with_analyzer(Box::new(ManifestApiAnalyzer::new()))
//!     .with_reporter(Box::new(SummaryReporter::to_stdout()))
//!     .build()?;
//!
//! let old = Api::of([Arc::new(FileArchive::new("old.api.json")) as Arc<dyn Archive>]);
//! let new = Api::of([Arc::new(FileArchive::new("new.api.json")) as Arc<dyn Archive>]);
//! engine.analyze(old, new)?;
//! # Ok(())
//! # }
//! ```

pub mod coiter;
pub mod dispatch;
pub mod filter;
pub mod registry;
pub mod traits;

pub use coiter::CoIterator;
pub use dispatch::{CheckDifferenceAnalyzer, USE_REPORTING_CODES_KEY};
pub use filter::CompoundFilter;
pub use registry::{ExtensionRegistry, StaticRegistry};
pub use traits::{
    ApiAnalyzer, ArchiveAnalyzer, Check, DifferenceAnalyzer, ElementFilter, Environment, Reporter,
    Transform,
};

use crate::config::AnalysisConfig;
use crate::error::{ApiDriftError, ErrorContext, Result};
use crate::model::{sibling_cmp, Api, ApiTree, ElementId, ElementNode, Report};

/// Builder for [`DriftEngine`].
///
/// At least one analyzer is required; reporter, transform and filter sets
/// may be empty.
#[derive(Default)]
pub struct DriftEngineBuilder {
    analyzers: Vec<Box<dyn ApiAnalyzer>>,
    reporters: Vec<Box<dyn Reporter>>,
    transforms: Vec<Box<dyn Transform>>,
    filters: Vec<Box<dyn ElementFilter>>,
    locale: Option<String>,
    config: AnalysisConfig,
}

impl DriftEngineBuilder {
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Box<dyn ApiAnalyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    #[must_use]
    pub fn with_analyzers(
        mut self,
        analyzers: impl IntoIterator<Item = Box<dyn ApiAnalyzer>>,
    ) -> Self {
        self.analyzers.extend(analyzers);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    #[must_use]
    pub fn with_reporters(
        mut self,
        reporters: impl IntoIterator<Item = Box<dyn Reporter>>,
    ) -> Self {
        self.reporters.extend(reporters);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.transforms.push(transform);
        self
    }

    #[must_use]
    pub fn with_transforms(
        mut self,
        transforms: impl IntoIterator<Item = Box<dyn Transform>>,
    ) -> Self {
        self.transforms.extend(transforms);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn ElementFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_filters(
        mut self,
        filters: impl IntoIterator<Item = Box<dyn ElementFilter>>,
    ) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Register every component kind from an extension registry.
    #[must_use]
    pub fn with_extensions(self, registry: &dyn ExtensionRegistry) -> Self {
        self.with_analyzers(registry.analyzers())
            .with_reporters(registry.reporters())
            .with_transforms(registry.transforms())
            .with_filters(registry.filters())
    }

    /// Override the configuration locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Replace the configuration handed to every component.
    #[must_use]
    pub fn with_configuration(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DriftEngine> {
        if self.analyzers.is_empty() {
            return Err(ApiDriftError::config(
                "at least one API analyzer must be registered",
            ));
        }

        let config = match self.locale {
            Some(locale) => AnalysisConfig::from_iter(locale, self.config.iter()),
            None => self.config,
        };

        Ok(DriftEngine {
            analyzers: self.analyzers,
            reporters: self.reporters,
            transforms: self.transforms,
            filters: CompoundFilter::new(self.filters),
            config,
        })
    }
}

/// The assembled engine for one analysis run.
pub struct DriftEngine {
    analyzers: Vec<Box<dyn ApiAnalyzer>>,
    reporters: Vec<Box<dyn Reporter>>,
    transforms: Vec<Box<dyn Transform>>,
    filters: CompoundFilter,
    config: AnalysisConfig,
}

impl DriftEngine {
    #[must_use]
    pub fn builder() -> DriftEngineBuilder {
        DriftEngineBuilder::default()
    }

    /// Run the analysis: build both trees per registered analyzer,
    /// co-iterate them, and route reports through transforms to reporters.
    ///
    /// Analyzers run sequentially in registration order; reports from one
    /// analyzer are delivered entirely before the next one begins. A fatal
    /// failure in one analyzer does not prevent the remaining analyzers
    /// from running and closing; the first error is surfaced after all
    /// lifecycles complete. Reporters are closed on every exit path.
    pub fn analyze(&mut self, old: Api, new: Api) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.initialize(&self.config).context("initializing reporter")?;
        }
        for analyzer in &mut self.analyzers {
            analyzer
                .initialize(&self.config)
                .with_context(|| format!("initializing analyzer '{}'", analyzer.name()))?;
        }
        for transform in &mut self.transforms {
            transform
                .initialize(&self.config)
                .with_context(|| format!("initializing transform '{}'", transform.name()))?;
        }

        let mut first_error: Option<ApiDriftError> = None;
        for index in 0..self.analyzers.len() {
            let analyzer = &self.analyzers[index];
            tracing::debug!(analyzer = analyzer.name(), "running analyzer");
            let result = run_analyzer(
                analyzer.as_ref(),
                old.clone(),
                new.clone(),
                &self.filters,
                &self.transforms,
                &mut self.reporters,
            );
            if let Err(e) = result {
                tracing::debug!(analyzer = self.analyzers[index].name(), error = %e, "analyzer failed");
                first_error.get_or_insert(e);
            }
        }

        for reporter in &mut self.reporters {
            if let Err(e) = reporter.close() {
                tracing::warn!("closing a reporter failed: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Scoped resources of one analyzer's run. Whatever is still held when the
/// guard drops (error or panic unwinding) is force-closed, with failures
/// logged at warn level and never re-raised.
struct AnalyzerResources {
    old_archives: Option<Box<dyn ArchiveAnalyzer>>,
    new_archives: Option<Box<dyn ArchiveAnalyzer>>,
    differences: Option<Box<dyn DifferenceAnalyzer>>,
}

impl AnalyzerResources {
    fn new() -> Self {
        Self {
            old_archives: None,
            new_archives: None,
            differences: None,
        }
    }

    /// Close everything, surfacing the first close error. Runs innermost
    /// resource first, mirroring acquisition order.
    fn close_all(&mut self) -> Result<()> {
        let mut first: Option<ApiDriftError> = None;
        if let Some(mut da) = self.differences.take() {
            if let Err(e) = da.close() {
                first.get_or_insert(e);
            }
        }
        if let Some(mut aa) = self.new_archives.take() {
            if let Err(e) = aa.close() {
                first.get_or_insert(e);
            }
        }
        if let Some(mut aa) = self.old_archives.take() {
            if let Err(e) = aa.close() {
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for AnalyzerResources {
    fn drop(&mut self) {
        if let Err(e) = self.close_all() {
            tracing::warn!("forced close of analysis resources failed: {e}");
        }
    }
}

/// One analyzer's full run: build both trees, obtain the difference
/// analyzer, bracket the traversal with open/close.
fn run_analyzer(
    analyzer: &dyn ApiAnalyzer,
    old: Api,
    new: Api,
    filters: &CompoundFilter,
    transforms: &[Box<dyn Transform>],
    reporters: &mut [Box<dyn Reporter>],
) -> Result<()> {
    fn build_tree(
        slot: &mut Option<Box<dyn ArchiveAnalyzer>>,
        side: &str,
    ) -> Result<std::sync::Arc<ApiTree>> {
        let analyzer = slot
            .as_deref_mut()
            .ok_or_else(|| ApiDriftError::config(format!("{side} archive analyzer unavailable")))?;
        analyzer
            .analyze()
            .with_context(|| format!("analyzing {side} archives"))
    }

    let mut resources = AnalyzerResources::new();

    // Stored into the guard before use so panics and early errors still
    // close whatever compilation handles the analyzer holds.
    resources.old_archives = Some(analyzer.archive_analyzer(old)?);
    resources.new_archives = Some(analyzer.archive_analyzer(new)?);

    let old_tree = build_tree(&mut resources.old_archives, "old")?;
    let new_tree = build_tree(&mut resources.new_archives, "new")?;

    let old_env = Environment::new(old_tree.clone());
    let new_env = Environment::new(new_tree.clone());

    resources.differences = Some(analyzer.difference_analyzer(&old_env, &new_env)?);
    let da = resources
        .differences
        .as_deref_mut()
        .ok_or_else(|| ApiDriftError::config("difference analyzer unavailable"))?;

    da.open()?;
    traverse(
        da,
        &old_tree,
        &new_tree,
        old_tree.roots(),
        new_tree.roots(),
        filters,
        transforms,
        reporters,
    )?;

    resources.close_all()
}

/// Recursive locked-step traversal of two sibling lists.
///
/// For every co-iterated pair: filter, begin, recurse into children when
/// both sides are present and descent is permitted, end, and deliver the
/// resulting report. `end_analysis` on a parent runs after every child's,
/// so reporters see a parent's report strictly after all of its
/// descendants'.
#[allow(clippy::too_many_arguments)]
fn traverse(
    da: &mut dyn DifferenceAnalyzer,
    old_tree: &ApiTree,
    new_tree: &ApiTree,
    old_siblings: &[ElementId],
    new_siblings: &[ElementId],
    filters: &CompoundFilter,
    transforms: &[Box<dyn Transform>],
    reporters: &mut [Box<dyn Reporter>],
) -> Result<()> {
    let pairs = CoIterator::new(
        old_siblings.iter().copied(),
        new_siblings.iter().copied(),
        |&a, &b| sibling_cmp(old_tree.node(a), new_tree.node(b)),
    );

    for (old_id, new_id) in pairs {
        let old_node = old_id.map(|id| old_tree.node(id));
        let new_node = new_id.map(|id| new_tree.node(id));

        let analyze_this = filters.applies_to(old_node) && filters.applies_to(new_node);

        if analyze_this {
            da.begin_analysis(old_id, new_id)?;
        }

        if let (Some(o), Some(n)) = (old_node, new_node) {
            if filters.should_descend_into(o) && filters.should_descend_into(n) {
                traverse(
                    da,
                    old_tree,
                    new_tree,
                    o.children(),
                    n.children(),
                    filters,
                    transforms,
                    reporters,
                )?;
            }
        }

        if analyze_this {
            let report = da.end_analysis(old_id, new_id)?;
            deliver(report, old_node, new_node, transforms, reporters)?;
        }
    }

    Ok(())
}

/// Pass a report through the transform chain and hand it to the reporters.
///
/// Empty reports are dropped without touching the transforms; reports
/// emptied by the transforms are dropped before delivery.
fn deliver(
    report: Report,
    old_node: Option<&ElementNode>,
    new_node: Option<&ElementNode>,
    transforms: &[Box<dyn Transform>],
    reporters: &mut [Box<dyn Reporter>],
) -> Result<()> {
    if report.is_empty() {
        return Ok(());
    }

    let mut differences = report.differences;
    for transform in transforms {
        let mut surviving = Vec::with_capacity(differences.len());
        for difference in &differences {
            let outcome = transform
                .transform(old_node, new_node, difference)
                .with_context(|| format!("in transform '{}'", transform.name()))?;
            if let Some(replacement) = outcome {
                surviving.push(replacement);
            }
        }
        differences = surviving;
    }

    if differences.is_empty() {
        return Ok(());
    }

    let transformed = Report::new(report.old_element, report.new_element, differences);
    for reporter in reporters.iter_mut() {
        reporter.report(&transformed)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_analyzers_is_a_config_error() {
        let result = DriftEngine::builder().build();
        match result {
            Err(ApiDriftError::Config(msg)) => assert!(msg.contains("analyzer")),
            _ => panic!("expected a configuration error"),
        }
    }
}
