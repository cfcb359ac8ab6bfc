//! The manifest analyzer: element trees from declarative JSON API
//! descriptions.
//!
//! A manifest archive lists the types of an API with their sub-kind,
//! fields, methods and annotations:
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "com.acme.Counter",
//!       "kind": "class",
//!       "annotations": ["@Stable"],
//!       "fields": [{ "name": "LIMIT", "type": "int", "constant": "42" }],
//!       "methods": [
//!         { "name": "get", "return": "int", "parameters": [] },
//!         { "name": "add", "return": "void", "parameters": ["int"] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Types may declare `nested` types, which become child class elements of
//! the outer type. References from fields, methods, supertypes,
//! annotations and containment to types declared anywhere in the archive
//! set become use-site back-edges, which is what powers use-chain
//! reporting.
//!
//! Parsed documents are kept in a process-wide cache so the old and new
//! sides of one analysis do not re-parse shared supplementary archives.
//! The cache is cleared when archive analyzers close; clearing is forced
//! even if the primary close path failed, and forced-cleanup problems are
//! logged at warn level, never re-raised.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::sync::{Arc, Mutex, OnceLock};

use serde::Deserialize;

use crate::checks::default_checks;
use crate::config::AnalysisConfig;
use crate::engine::{
    ApiAnalyzer, ArchiveAnalyzer, Check, CheckDifferenceAnalyzer, DifferenceAnalyzer, Environment,
};
use crate::error::{AnalysisErrorKind, ApiDriftError, Result};
use crate::messages::{DefaultBundle, MessageBundle};
use crate::model::{
    Api, ApiTree, Archive, ElementId, ElementKind, NewElement, TreeBuilder, UseSite, UseType,
};

// ============================================================================
// Manifest document model
// ============================================================================

#[derive(Debug, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    types: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
struct TypeDecl {
    name: String,
    #[serde(default = "default_type_kind")]
    kind: String,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    implements: Vec<String>,
    #[serde(default)]
    annotations: Vec<String>,
    #[serde(default)]
    fields: Vec<FieldDecl>,
    #[serde(default)]
    methods: Vec<MethodDecl>,
    /// Types declared inside this one. Nesting is containment: the outer
    /// type becomes a `contains` use-site of each nested type.
    #[serde(default)]
    nested: Vec<TypeDecl>,
}

fn default_type_kind() -> String {
    "class".to_string()
}

#[derive(Debug, Deserialize)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    constant: Option<String>,
    #[serde(default)]
    annotations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MethodDecl {
    name: String,
    #[serde(rename = "return", default)]
    return_type: Option<String>,
    #[serde(default)]
    parameters: Vec<String>,
    #[serde(default)]
    throws: Vec<String>,
    #[serde(default)]
    annotations: Vec<String>,
}

// ============================================================================
// Process-wide parsed-document cache
// ============================================================================

fn doc_cache() -> &'static Mutex<HashMap<u64, Arc<ManifestDoc>>> {
    static CACHE: OnceLock<Mutex<HashMap<u64, Arc<ManifestDoc>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn cache_key(name: &str, content: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    content.hash(&mut hasher);
    hasher.finish()
}

/// Clear the whole parsed-document cache. Failures never propagate.
fn force_clear_doc_cache() {
    match doc_cache().lock() {
        Ok(mut cache) => cache.clear(),
        Err(poisoned) => {
            tracing::warn!("manifest document cache was poisoned; force-clearing anyway");
            poisoned.into_inner().clear();
        }
    }
}

// ============================================================================
// Archive analyzer
// ============================================================================

/// Builds one side's element tree from manifest archives.
pub struct ManifestArchiveAnalyzer {
    api: Api,
    cached_keys: Vec<u64>,
}

impl ManifestArchiveAnalyzer {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            cached_keys: Vec::new(),
        }
    }

    fn parse_archive(&mut self, archive: &Arc<dyn Archive>) -> Result<Arc<ManifestDoc>> {
        let mut content = Vec::new();
        archive
            .open()?
            .read_to_end(&mut content)
            .map_err(|e| ApiDriftError::archive_read(archive.name(), e.to_string()))?;

        let key = cache_key(archive.name(), &content);
        let cache = doc_cache()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(doc) = cache.get(&key) {
            tracing::trace!(archive = archive.name(), "manifest cache hit");
            return Ok(doc.clone());
        }
        drop(cache);

        let doc: ManifestDoc = serde_json::from_slice(&content).map_err(|e| {
            ApiDriftError::analysis(
                format!("parsing manifest '{}'", archive.name()),
                AnalysisErrorKind::MalformedManifest {
                    archive: archive.name().to_string(),
                    message: e.to_string(),
                },
            )
        })?;
        let doc = Arc::new(doc);

        let mut cache = doc_cache()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.insert(key, doc.clone());
        self.cached_keys.push(key);
        Ok(doc)
    }
}

impl ArchiveAnalyzer for ManifestArchiveAnalyzer {
    fn analyze(&mut self) -> Result<Arc<ApiTree>> {
        let api = self.api.clone();
        let mut builder = TreeBuilder::new(api.clone());
        let mut declared_types: HashMap<String, ElementId> = HashMap::new();
        // (referenced type name, use kind, referring site)
        let mut pending_uses: Vec<(String, UseType, ElementId)> = Vec::new();

        let archives: Vec<Arc<dyn Archive>> = api.all_archives().cloned().collect();
        for archive in &archives {
            let doc = self.parse_archive(archive)?;
            for type_decl in &doc.types {
                add_type(
                    &mut builder,
                    archive.name(),
                    type_decl,
                    None,
                    &mut declared_types,
                    &mut pending_uses,
                );
            }
        }

        for (type_name, use_type, site) in pending_uses {
            if let Some(&used) = declared_types.get(&type_name) {
                builder.add_use_site(used, UseSite::new(use_type, site));
            }
        }

        Ok(Arc::new(builder.build()?))
    }

    fn close(&mut self) -> Result<()> {
        let primary = match doc_cache().lock() {
            Ok(mut cache) => {
                for key in self.cached_keys.drain(..) {
                    cache.remove(&key);
                }
                Ok(())
            }
            Err(_) => Err(ApiDriftError::analysis(
                "releasing parsed manifests",
                AnalysisErrorKind::TreeConstruction("manifest cache lock poisoned".to_string()),
            )),
        };

        // Clear the shared cache even when the primary path failed; a stale
        // entry surviving here would leak parsed documents across analyses.
        force_clear_doc_cache();

        primary
    }
}

fn annotation_sort_key(annotation: &str) -> String {
    if annotation.starts_with('@') {
        annotation.to_string()
    } else {
        format!("@{annotation}")
    }
}

fn annotation_type_name(annotation: &str) -> String {
    annotation.trim_start_matches('@').to_string()
}

fn add_annotations(
    builder: &mut TreeBuilder,
    archive: &str,
    parent: ElementId,
    parent_name: &str,
    annotations: &[String],
    pending_uses: &mut Vec<(String, UseType, ElementId)>,
) {
    for annotation in annotations {
        let key = annotation_sort_key(annotation);
        builder.add(
            Some(parent),
            NewElement::new(
                ElementKind::Annotation,
                key.clone(),
                format!("{key} on {parent_name}"),
            )
            .in_archive(archive),
        );
        pending_uses.push((annotation_type_name(annotation), UseType::Annotates, parent));
    }
}

fn add_type(
    builder: &mut TreeBuilder,
    archive: &str,
    type_decl: &TypeDecl,
    parent: Option<ElementId>,
    declared_types: &mut HashMap<String, ElementId>,
    pending_uses: &mut Vec<(String, UseType, ElementId)>,
) {
    let type_name = &type_decl.name;
    let class = builder.add(
        parent,
        NewElement::new(
            ElementKind::Class,
            type_name.clone(),
            format!("class {type_name}"),
        )
        .in_archive(archive),
    );
    builder.set_attr(class, "kind", &type_decl.kind);
    declared_types.insert(type_name.clone(), class);

    if let Some(supertype) = &type_decl.extends {
        builder.set_attr(class, "extends", supertype);
        pending_uses.push((supertype.clone(), UseType::IsInherited, class));
    }
    for interface in &type_decl.implements {
        pending_uses.push((interface.clone(), UseType::IsImplemented, class));
    }
    for nested in &type_decl.nested {
        add_type(builder, archive, nested, Some(class), declared_types, pending_uses);
        pending_uses.push((nested.name.clone(), UseType::Contains, class));
    }

    add_annotations(
        builder,
        archive,
        class,
        type_name,
        &type_decl.annotations,
        pending_uses,
    );

    for field in &type_decl.fields {
        let field_el = builder.add(
            Some(class),
            NewElement::new(
                ElementKind::Field,
                field.name.clone(),
                format!("field {type_name}.{}", field.name),
            )
            .in_archive(archive),
        );
        if let Some(field_type) = &field.field_type {
            builder.set_attr(field_el, "type", field_type);
            pending_uses.push((field_type.clone(), UseType::HasType, field_el));
        }
        if let Some(constant) = &field.constant {
            builder.set_attr(field_el, "constant", constant);
        }
        add_annotations(
            builder,
            archive,
            field_el,
            &format!("{type_name}.{}", field.name),
            &field.annotations,
            pending_uses,
        );
    }

    for method in &type_decl.methods {
        let signature = format!("{}({})", method.name, method.parameters.join(","));
        let method_el = builder.add(
            Some(class),
            NewElement::new(
                ElementKind::Method,
                signature.clone(),
                format!("method {type_name}::{signature}"),
            )
            .in_archive(archive),
        );
        if let Some(return_type) = &method.return_type {
            builder.set_attr(method_el, "return", return_type);
            pending_uses.push((return_type.clone(), UseType::ReturnType, method_el));
        }
        for thrown in &method.throws {
            pending_uses.push((thrown.clone(), UseType::IsThrown, method_el));
        }
        for (index, parameter_type) in method.parameters.iter().enumerate() {
            let parameter = builder.add(
                Some(method_el),
                NewElement::new(
                    ElementKind::MethodParameter,
                    index.to_string(),
                    format!("parameter {index} of {type_name}::{signature}"),
                )
                .in_archive(archive),
            );
            builder.set_attr(parameter, "type", parameter_type);
            pending_uses.push((parameter_type.clone(), UseType::ParameterType, method_el));
        }
        add_annotations(
            builder,
            archive,
            method_el,
            &format!("{type_name}::{signature}"),
            &method.annotations,
            pending_uses,
        );
    }
}

// ============================================================================
// API analyzer
// ============================================================================

type CheckFactory = Box<dyn Fn() -> Vec<Box<dyn Check>>>;

/// The manifest-based [`ApiAnalyzer`].
///
/// Runs the built-in check catalog by default; [`with_checks`] swaps in a
/// custom set.
///
/// [`with_checks`]: ManifestApiAnalyzer::with_checks
pub struct ManifestApiAnalyzer {
    config: AnalysisConfig,
    bundle: Arc<dyn MessageBundle>,
    check_factory: CheckFactory,
}

impl ManifestApiAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            bundle: Arc::new(DefaultBundle),
            check_factory: Box::new(default_checks),
        }
    }

    /// Use a custom check set instead of the built-in catalog.
    #[must_use]
    pub fn with_checks(mut self, factory: impl Fn() -> Vec<Box<dyn Check>> + 'static) -> Self {
        self.check_factory = Box::new(factory);
        self
    }

    /// Use a custom message bundle for difference descriptions.
    #[must_use]
    pub fn with_bundle(mut self, bundle: Arc<dyn MessageBundle>) -> Self {
        self.bundle = bundle;
        self
    }
}

impl Default for ManifestApiAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiAnalyzer for ManifestApiAnalyzer {
    fn name(&self) -> &str {
        "manifest"
    }

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        self.config = config.clone();
        Ok(())
    }

    fn archive_analyzer(&self, api: Api) -> Result<Box<dyn ArchiveAnalyzer>> {
        Ok(Box::new(ManifestArchiveAnalyzer::new(api)))
    }

    fn difference_analyzer(
        &self,
        old: &Environment,
        new: &Environment,
    ) -> Result<Box<dyn DifferenceAnalyzer>> {
        let analyzer = CheckDifferenceAnalyzer::new(
            &self.config,
            old.clone(),
            new.clone(),
            (self.check_factory)(),
            self.bundle.clone(),
        )?;
        Ok(Box::new(analyzer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BytesArchive;

    fn api_of(manifests: &[(&str, &str)]) -> Api {
        Api::of(manifests.iter().map(|(name, content)| {
            Arc::new(BytesArchive::new(*name, content.as_bytes().to_vec())) as Arc<dyn Archive>
        }))
    }

    const COUNTER: &str = r#"{
        "types": [{
            "name": "com.acme.Counter",
            "kind": "class",
            "annotations": ["@Stable"],
            "fields": [{"name": "LIMIT", "type": "int", "constant": "42"}],
            "methods": [{"name": "add", "return": "void", "parameters": ["int"]}]
        }]
    }"#;

    #[test]
    fn builds_tree_with_members_and_annotations() {
        let mut analyzer = ManifestArchiveAnalyzer::new(api_of(&[("app.api.json", COUNTER)]));
        let tree = analyzer.analyze().unwrap();
        analyzer.close().unwrap();

        assert_eq!(tree.roots().len(), 1);
        let class = tree.roots()[0];
        assert_eq!(tree.node(class).name(), "class com.acme.Counter");
        assert_eq!(tree.node(class).attr("kind"), Some("class"));

        let children: Vec<_> = tree
            .children(class)
            .iter()
            .map(|&c| (tree.node(c).kind(), tree.node(c).sort_key().to_string()))
            .collect();
        assert_eq!(
            children,
            vec![
                (ElementKind::Field, "LIMIT".to_string()),
                (ElementKind::Method, "add(int)".to_string()),
                (ElementKind::Annotation, "@Stable".to_string()),
            ]
        );

        // The method has one parameter child.
        let method = tree.children(class)[1];
        assert_eq!(tree.children(method).len(), 1);
        assert_eq!(
            tree.node(tree.children(method)[0]).kind(),
            ElementKind::MethodParameter
        );
    }

    #[test]
    fn use_sites_point_at_declared_types() {
        let manifest = r#"{
            "types": [
                {"name": "A", "fields": [{"name": "b", "type": "B"}]},
                {"name": "B"}
            ]
        }"#;
        let mut analyzer = ManifestArchiveAnalyzer::new(api_of(&[("app.api.json", manifest)]));
        let tree = analyzer.analyze().unwrap();
        analyzer.close().unwrap();

        let b = tree
            .iter_depth_first()
            .find(|&id| tree.node(id).sort_key() == "B")
            .unwrap();
        let sites = tree.node(b).use_sites();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].use_type, UseType::HasType);
        assert_eq!(tree.node(sites[0].site).sort_key(), "b");
    }

    #[test]
    fn nested_types_become_children_with_containment_use_sites() {
        let manifest = r#"{
            "types": [{
                "name": "com.acme.Outer",
                "nested": [{
                    "name": "com.acme.Outer.Inner",
                    "fields": [{"name": "x", "type": "int"}]
                }]
            }]
        }"#;
        let mut analyzer = ManifestArchiveAnalyzer::new(api_of(&[("app.api.json", manifest)]));
        let tree = analyzer.analyze().unwrap();
        analyzer.close().unwrap();

        assert_eq!(tree.roots().len(), 1, "the nested type is not a root");
        let outer = tree.roots()[0];
        let inner = tree.children(outer)[0];
        assert_eq!(tree.node(inner).kind(), ElementKind::Class);
        assert_eq!(tree.node(inner).name(), "class com.acme.Outer.Inner");
        assert_eq!(tree.node(inner).parent(), Some(outer));

        // The outer type is a containment use-site of the nested type.
        let sites = tree.node(inner).use_sites();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].use_type, UseType::Contains);
        assert_eq!(sites[0].site, outer);
    }

    #[test]
    fn duplicate_members_are_an_analysis_error() {
        let manifest = r#"{
            "types": [{
                "name": "com.acme.Dup",
                "fields": [
                    {"name": "same", "type": "int"},
                    {"name": "same", "type": "long"}
                ]
            }]
        }"#;
        let mut analyzer = ManifestArchiveAnalyzer::new(api_of(&[("dup.api.json", manifest)]));
        let result = analyzer.analyze();
        analyzer.close().unwrap();

        match result {
            Err(ApiDriftError::Analysis { source, .. }) => {
                assert!(
                    matches!(source, AnalysisErrorKind::DuplicateSibling { .. }),
                    "expected a duplicate-sibling error, got {source}"
                );
            }
            other => panic!("expected an analysis error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_manifest_is_an_analysis_error() {
        let mut analyzer =
            ManifestArchiveAnalyzer::new(api_of(&[("broken.api.json", "not json")]));
        let result = analyzer.analyze();
        analyzer.close().unwrap();
        assert!(matches!(result, Err(ApiDriftError::Analysis { .. })));
    }

    #[test]
    fn empty_manifest_builds_empty_tree() {
        let mut analyzer = ManifestArchiveAnalyzer::new(api_of(&[("empty.api.json", "{}")]));
        let tree = analyzer.analyze().unwrap();
        analyzer.close().unwrap();
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn cache_round_trip_survives_two_sides() {
        let api = api_of(&[("shared.api.json", COUNTER)]);
        let mut old_side = ManifestArchiveAnalyzer::new(api.clone());
        let mut new_side = ManifestArchiveAnalyzer::new(api);

        let old_tree = old_side.analyze().unwrap();
        let new_tree = new_side.analyze().unwrap();
        assert_eq!(old_tree.len(), new_tree.len());

        old_side.close().unwrap();
        new_side.close().unwrap();
    }
}
