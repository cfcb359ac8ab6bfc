//! Use-sites: the directed references-between-elements graph.
//!
//! A use-site records that element *S* (the site) refers to a type *T*, with
//! a tag describing the nature of the reference. Sites are stored as
//! back-edges on the used type. The graph may contain cycles; traversal
//! tolerates them with an explicit visited set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::element::{ApiTree, ElementId, ElementKind};

/// The nature of one element's reference to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UseType {
    /// The type annotates the site.
    Annotates,
    /// The site is a field of the type.
    HasType,
    /// The site is a method with a parameter of the type.
    ParameterType,
    /// The site is a method returning the type.
    ReturnType,
    /// The site is a method throwing the type.
    IsThrown,
    /// The site implements the type.
    IsImplemented,
    /// The site inherits from the type.
    IsInherited,
    /// The site contains the type (nesting).
    Contains,
}

impl UseType {
    /// Whether this kind of use can propagate API membership transitively.
    ///
    /// A type used this way by an API element becomes part of the API
    /// surface itself; annotation references do not have that effect.
    #[must_use]
    pub fn moves_to_api(self) -> bool {
        !matches!(self, UseType::Annotates)
    }

    /// Message-bundle key describing this use, e.g. `uses.hasType`.
    #[must_use]
    pub fn message_key(self) -> &'static str {
        match self {
            UseType::Annotates => "uses.annotates",
            UseType::HasType => "uses.hasType",
            UseType::ParameterType => "uses.parameterType",
            UseType::ReturnType => "uses.returnType",
            UseType::IsThrown => "uses.isThrown",
            UseType::IsImplemented => "uses.isImplemented",
            UseType::IsInherited => "uses.isInherited",
            UseType::Contains => "uses.contains",
        }
    }
}

/// One edge of the use graph: `site` refers to the element this use-site is
/// stored on, in the manner described by `use_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseSite {
    pub use_type: UseType,
    pub site: ElementId,
}

impl UseSite {
    pub fn new(use_type: UseType, site: ElementId) -> Self {
        Self { use_type, site }
    }
}

/// One step of a use chain: `used_type` is referenced by `use_site.site`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub used_type: ElementId,
    pub use_site: UseSite,
}

/// Find an example chain of uses leading from `start_type` to an element in
/// the tree's primary archives.
///
/// The walk follows use-site back-edges depth-first: the class enclosing
/// each site is either in the primary archive set (a sink, ending the
/// chain) or has its own use-sites to follow. Cycles are cut with a visited
/// set. Returns the steps from `start_type` outward, the sink last, or
/// `None` when no path reaches the API.
///
/// The graph may be deep; the walk is iterative with an explicit frame
/// stack.
#[must_use]
pub fn example_path_to_api(
    tree: &ApiTree,
    start_type: ElementId,
    start_use: UseSite,
) -> Option<Vec<PathStep>> {
    struct Frame {
        step: PathStep,
        /// Class whose use-sites this frame iterates, once entered.
        site_class: ElementId,
        next_use: usize,
    }

    let mut visited: HashSet<ElementId> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut pending = Some(PathStep {
        used_type: start_type,
        use_site: start_use,
    });

    loop {
        if let Some(step) = pending.take() {
            // Enter a new frame, unless its site class was already seen.
            let site_class = match tree.enclosing(step.use_site.site, ElementKind::Class) {
                Some(c) => c,
                None => {
                    // A site outside any class cannot lead anywhere.
                    if !advance(&mut stack, &mut pending, tree) {
                        return None;
                    }
                    continue;
                }
            };
            if !visited.insert(site_class) {
                if !advance(&mut stack, &mut pending, tree) {
                    return None;
                }
                continue;
            }

            let in_primary = tree
                .node(step.use_site.site)
                .archive()
                .is_some_and(|a| tree.api().is_primary(a));

            stack.push(Frame {
                step,
                site_class,
                next_use: 0,
            });

            if in_primary {
                return Some(stack.iter().map(|f| f.step).collect());
            }
        }

        if !advance(&mut stack, &mut pending, tree) {
            return None;
        }
    }

    /// Move to the next candidate use-site of the top frame, popping
    /// exhausted frames. Returns false when the whole search is exhausted.
    fn advance(stack: &mut Vec<Frame>, pending: &mut Option<PathStep>, tree: &ApiTree) -> bool {
        while let Some(frame) = stack.last_mut() {
            let uses = tree.node(frame.site_class).use_sites();
            if frame.next_use < uses.len() {
                let use_site = uses[frame.next_use];
                frame.next_use += 1;
                *pending = Some(PathStep {
                    used_type: frame.site_class,
                    use_site,
                });
                return true;
            }
            stack.pop();
        }
        false
    }
}
