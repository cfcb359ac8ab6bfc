//! **API compatibility analysis between two versions of a software artifact.**
//!
//! `apidrift` discovers differences between two versions of an API,
//! classifies each difference by its impact across compatibility dimensions
//! (source, binary, semantic), lets those classifications be rewritten by
//! configuration-driven transforms, and routes the results to reporters.
//!
//! The core is a language-agnostic *differencing engine*: it walks two
//! parallel trees of API elements in locked step using an ordered
//! co-iteration, dispatches each element pair to a set of pluggable
//! *checks* that keep per-element open/close state across the descent,
//! collects the resulting *differences*, passes them through a chain of
//! *transforms*, and delivers the surviving reports to *reporters*. The
//! engine treats elements as opaque ordered nodes; *analyzers* produce the
//! trees from concrete artifacts.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: archives, APIs, element trees, use-sites, differences
//!   and reports: the vocabulary everything else speaks.
//! - **[`engine`]**: the [`DriftEngine`] itself, the component traits, the
//!   co-iterator, filter composition, the check-multiplexing difference
//!   analyzer and the extension registry.
//! - **[`checks`]**: the built-in check catalog with its stable
//!   difference-code table.
//! - **[`analyzers`]**: the built-in manifest analyzer turning declarative
//!   JSON API descriptions into element trees.
//! - **[`transforms`]**: configuration-driven rewriting (ignore,
//!   reclassify) of differences before delivery.
//! - **[`reports`]**: summary, JSON, NDJSON and in-memory reporters.
//!
//! ## Getting Started
//!
//! ```no_run
//! use apidrift::analyzers::ManifestApiAnalyzer;
//! use apidrift::engine::DriftEngine;
//! use apidrift::model::{Api, Archive, FileArchive};
//! use apidrift::reports::RecordingReporter;
//! use std::sync::Arc;
//!
//! fn main() -> apidrift::error::Result<()> {
//!     let reporter = RecordingReporter::new();
//!     let records = reporter.records();
//!
//!     let mut engine = DriftEngine::builder()
//!         .with_analyzer(Box::new(ManifestApiAnalyzer::new()))
//!         .with_reporter(Box::new(reporter))
//!         .build()?;
//!
//!     let old = Api::of([Arc::new(FileArchive::new("v1.api.json")) as Arc<dyn Archive>]);
//!     let new = Api::of([Arc::new(FileArchive::new("v2.api.json")) as Arc<dyn Archive>]);
//!     engine.analyze(old, new)?;
//!
//!     for (code, count) in records.count_by_code() {
//!         println!("{code}: {count}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Extending
//!
//! Every component is a trait: implement
//! [`Check`](engine::Check) for new compatibility rules,
//! [`Transform`](engine::Transform) to rewrite or suppress differences,
//! [`Reporter`](engine::Reporter) for new output destinations,
//! [`ElementFilter`](engine::ElementFilter) to scope the traversal, and
//! [`ApiAnalyzer`](engine::ApiAnalyzer) to feed the engine trees from any
//! artifact format. Components register on the builder directly or through
//! an [`ExtensionRegistry`](engine::ExtensionRegistry).

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod analyzers;
pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod messages;
pub mod model;
pub mod reports;
pub mod transforms;

// Re-export main types for convenience
pub use config::AnalysisConfig;
pub use engine::{
    ApiAnalyzer, ArchiveAnalyzer, Check, CheckDifferenceAnalyzer, CoIterator, CompoundFilter,
    DifferenceAnalyzer, DriftEngine, DriftEngineBuilder, ElementFilter, Environment,
    ExtensionRegistry, Reporter, StaticRegistry, Transform,
};
pub use error::{ApiDriftError, ErrorContext, OptionContext, Result};
pub use model::{
    Api, ApiTree, Archive, BytesArchive, Compatibility, Difference, ElementId, ElementKind,
    ElementNode, ElementSnapshot, FileArchive, Report, Severity, TreeBuilder, UseSite, UseType,
};
pub use reports::{RecordedReports, RecordingReporter, ReportFormat};
