//! Core data model: archives, APIs, element trees, use-sites, differences
//! and reports.
//!
//! The engine treats API elements as opaque ordered nodes. Analyzers build
//! [`ApiTree`]s from archives; the engine co-iterates two trees and hands
//! element pairs to checks, which emit [`Difference`]s collected into
//! [`Report`]s.

mod api;
mod archive;
mod difference;
mod element;
mod report;
mod usesite;

pub use api::Api;
pub use archive::{Archive, BytesArchive, FileArchive};
pub use difference::{Compatibility, Difference, DifferenceBuilder, Severity};
pub use element::{
    sibling_cmp, ApiTree, ElementId, ElementKind, ElementNode, NewElement, TreeBuilder,
};
pub use report::{ElementSnapshot, Report};
pub use usesite::{example_path_to_api, PathStep, UseSite, UseType};
