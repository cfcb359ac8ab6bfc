//! API element trees.
//!
//! Elements are nodes in an arena-backed tree owned by an [`ApiTree`] and
//! addressed by [`ElementId`]. Every element carries a kind tag, a sort key
//! defining its position among siblings, a full human-readable name (used
//! in messages only), optional provenance (owning archive), free-form
//! string attributes, and use-site back-edges.
//!
//! Sibling order is total: `(kind rank, sort key)`, with annotations ranked
//! strictly last. The same comparator orders siblings on the old and the new
//! side of an analysis, which is what makes ordered co-iteration of the two
//! trees possible. Two distinct siblings comparing equal would break the
//! pairing, so [`TreeBuilder::build`] rejects duplicate keys.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::api::Api;
use super::usesite::UseSite;
use crate::error::{AnalysisErrorKind, ApiDriftError, Result};

/// Kind tag of an API element.
///
/// One `Class` tag covers all type sub-kinds (class, interface, enum,
/// annotation type); the sub-kind travels in the element's `kind` attribute
/// and is routed inside individual checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Class,
    Field,
    Method,
    MethodParameter,
    Annotation,
}

impl ElementKind {
    /// Position of this kind in the sibling order. Annotations sort last,
    /// which the check dispatcher relies on when buffering their results.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            ElementKind::Class => 0,
            ElementKind::Field => 1,
            ElementKind::Method => 2,
            ElementKind::MethodParameter => 3,
            ElementKind::Annotation => 4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::Field => "field",
            ElementKind::Method => "method",
            ElementKind::MethodParameter => "method-parameter",
            ElementKind::Annotation => "annotation",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of an element within its owning [`ApiTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node in an API element tree.
#[derive(Debug, Clone)]
pub struct ElementNode {
    kind: ElementKind,
    sort_key: String,
    name: String,
    archive: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    use_sites: Vec<UseSite>,
}

impl ElementNode {
    /// The element's kind tag.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The key ordering this element among its siblings.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    /// Full human-readable name, used in messages only.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the archive this element was read from, if known. May differ
    /// from the tree's primary archives for referenced types.
    #[must_use]
    pub fn archive(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    /// Parent link; absent for roots.
    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Free-form string attribute, e.g. `kind`, `type`, `constant`.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes, in key order.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Use-site back-edges: elements referring to this one.
    #[must_use]
    pub fn use_sites(&self) -> &[UseSite] {
        &self.use_sites
    }
}

/// Total sibling order shared by both sides of an analysis.
///
/// Comparing equal means "the same element" for co-iteration purposes; it
/// never holds for two elements of different kinds.
#[must_use]
pub fn sibling_cmp(a: &ElementNode, b: &ElementNode) -> Ordering {
    (a.kind.rank(), a.sort_key.as_str()).cmp(&(b.kind.rank(), b.sort_key.as_str()))
}

/// An immutable API element tree plus the [`Api`] it was built from.
///
/// Trees are produced by archive analyzers through a [`TreeBuilder`] and
/// are read-only afterwards; elements live as long as the tree.
#[derive(Debug, Clone)]
pub struct ApiTree {
    api: Api,
    nodes: Vec<ElementNode>,
    roots: Vec<ElementId>,
}

impl ApiTree {
    /// The API this tree was built from.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Ordered root elements.
    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Resolve an element by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: ElementId) -> &ElementNode {
        &self.nodes[id.index()]
    }

    /// Ordered children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).children()
    }

    /// Number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk parent links up to the nearest enclosing element of the given
    /// kind, including the element itself.
    #[must_use]
    pub fn enclosing(&self, id: ElementId, kind: ElementKind) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(c) = current {
            if self.node(c).kind() == kind {
                return Some(c);
            }
            current = self.node(c).parent();
        }
        None
    }

    /// All element ids in depth-first pre-order.
    pub fn iter_depth_first(&self) -> impl Iterator<Item = ElementId> + '_ {
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev());
            Some(next)
        })
    }
}

/// Incremental construction of an [`ApiTree`].
///
/// Children may be added in any order; `build` sorts every sibling list by
/// the shared comparator and rejects duplicates.
pub struct TreeBuilder {
    api: Api,
    nodes: Vec<ElementNode>,
    roots: Vec<ElementId>,
}

/// Descriptor for one element being added to a [`TreeBuilder`].
pub struct NewElement {
    pub kind: ElementKind,
    pub sort_key: String,
    pub name: String,
    pub archive: Option<String>,
}

impl NewElement {
    pub fn new(kind: ElementKind, sort_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            sort_key: sort_key.into(),
            name: name.into(),
            archive: None,
        }
    }

    #[must_use]
    pub fn in_archive(mut self, archive: impl Into<String>) -> Self {
        self.archive = Some(archive.into());
        self
    }
}

impl TreeBuilder {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Add an element under `parent` (or as a root when `parent` is `None`).
    pub fn add(&mut self, parent: Option<ElementId>, element: NewElement) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(ElementNode {
            kind: element.kind,
            sort_key: element.sort_key,
            name: element.name,
            archive: element.archive,
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            use_sites: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Set a free-form attribute on an element.
    pub fn set_attr(&mut self, id: ElementId, key: impl Into<String>, value: impl Into<String>) {
        self.nodes[id.index()]
            .attributes
            .insert(key.into(), value.into());
    }

    /// Record a use-site back-edge on the used element.
    pub fn add_use_site(&mut self, used: ElementId, site: UseSite) {
        self.nodes[used.index()].use_sites.push(site);
    }

    /// Read access to an element added so far.
    #[must_use]
    pub fn node(&self, id: ElementId) -> &ElementNode {
        &self.nodes[id.index()]
    }

    /// Finish the tree: sort every sibling list and validate strictness.
    pub fn build(mut self) -> Result<ApiTree> {
        let mut sibling_lists: Vec<(Option<ElementId>, Vec<ElementId>)> = Vec::new();
        sibling_lists.push((None, std::mem::take(&mut self.roots)));
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if !node.children.is_empty() {
                let children = std::mem::take(&mut node.children);
                sibling_lists.push((Some(ElementId(index as u32)), children));
            }
        }

        for (parent, mut siblings) in sibling_lists {
            siblings.sort_by(|&a, &b| sibling_cmp(&self.nodes[a.index()], &self.nodes[b.index()]));
            for pair in siblings.windows(2) {
                let (a, b) = (&self.nodes[pair[0].index()], &self.nodes[pair[1].index()]);
                if sibling_cmp(a, b) == Ordering::Equal {
                    let parent_name = parent
                        .map(|p| self.nodes[p.index()].name.clone())
                        .unwrap_or_else(|| "<roots>".to_string());
                    return Err(ApiDriftError::analysis(
                        "element tree has ambiguous sibling order",
                        AnalysisErrorKind::DuplicateSibling {
                            parent: parent_name,
                            key: a.sort_key().to_string(),
                        },
                    ));
                }
            }
            match parent {
                Some(p) => self.nodes[p.index()].children = siblings,
                None => self.roots = siblings,
            }
        }

        Ok(ApiTree {
            api: self.api,
            nodes: self.nodes,
            roots: self.roots,
        })
    }
}
