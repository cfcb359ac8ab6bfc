//! Built-in analyzers.
//!
//! The engine is parameterized by analyzers that turn archives into element
//! trees. The built-in [`ManifestApiAnalyzer`] understands declarative JSON
//! API manifests; language-specific analyzers implementing
//! [`ApiAnalyzer`](crate::engine::ApiAnalyzer) can be registered alongside
//! or instead of it.

mod manifest;

pub use manifest::{ManifestApiAnalyzer, ManifestArchiveAnalyzer};
