//! Component traits the engine is assembled from.
//!
//! One analysis run wires together analyzers (which build element trees
//! and supply a difference analyzer), checks (stateful open/close visitors
//! multiplexed by the default difference analyzer), transforms (difference
//! rewriters), reporters (terminal consumers) and element filters. All
//! components are constructed once, initialized once with the
//! configuration, used for a whole analysis and torn down once.

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::model::{Api, ApiTree, Difference, ElementId, ElementKind, ElementNode, Report};

/// Read access to one side's analyzed tree, handed to checks.
///
/// Cheap to clone; the tree is shared and read-only for the whole analysis.
#[derive(Clone)]
pub struct Environment {
    tree: Arc<ApiTree>,
}

impl Environment {
    pub fn new(tree: Arc<ApiTree>) -> Self {
        Self { tree }
    }

    #[must_use]
    pub fn tree(&self) -> &ApiTree {
        &self.tree
    }

    #[must_use]
    pub fn api(&self) -> &Api {
        self.tree.api()
    }

    /// Resolve an element of this side's tree.
    #[must_use]
    pub fn element(&self, id: ElementId) -> &ElementNode {
        self.tree.node(id)
    }
}

/// Produces element trees from archives and a matching difference analyzer.
pub trait ApiAnalyzer {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Called exactly once, before any other method.
    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Create an archive analyzer for one side of the comparison.
    fn archive_analyzer(&self, api: Api) -> Result<Box<dyn ArchiveAnalyzer>>;

    /// Create a difference analyzer parameterized by both analyzed sides.
    fn difference_analyzer(
        &self,
        old: &Environment,
        new: &Environment,
    ) -> Result<Box<dyn DifferenceAnalyzer>>;
}

/// Builds the element tree for one archive set.
///
/// `close` releases whatever the tree build acquired (parsed documents,
/// compilation handles); the engine calls it on every exit path.
pub trait ArchiveAnalyzer {
    fn analyze(&mut self) -> Result<Arc<ApiTree>>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Stateful visitor of element pairs.
///
/// The engine guarantees that every `begin_analysis` is matched by exactly
/// one `end_analysis` after all descendant begin/end calls have completed,
/// and that `open`/`close` bracket the traversal on all exit paths. This
/// discipline is what allows implementations to keep a stack.
pub trait DifferenceAnalyzer {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_analysis(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()>;

    /// Close the analysis of a pair, returning the differences found for it.
    fn end_analysis(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<Report>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One compatibility check: an open/close visitor keyed by element kind.
///
/// The engine guarantees `initialize` runs exactly once before any visit,
/// that each visit it makes is matched by exactly one `visit_end` in LIFO
/// order, and that visits are never concurrent for the same check. The
/// typical implementation pushes a pending record in `visit_*` and pops it
/// in `visit_end`, emitting differences when the record warrants it.
pub trait Check {
    /// Short identifier used in logs and error attribution.
    fn name(&self) -> &str;

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    fn set_old_environment(&mut self, env: Environment);

    fn set_new_environment(&mut self, env: Environment);

    /// Which element kinds this check wants to visit. A check declaring no
    /// interests never receives a visit.
    fn interest(&self) -> &[ElementKind];

    fn visit_class(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let _ = (old, new);
        Ok(())
    }

    fn visit_field(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let _ = (old, new);
        Ok(())
    }

    fn visit_method(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let _ = (old, new);
        Ok(())
    }

    fn visit_method_parameter(
        &mut self,
        old: Option<ElementId>,
        new: Option<ElementId>,
    ) -> Result<()> {
        let _ = (old, new);
        Ok(())
    }

    /// Annotations are leaves sorted last among siblings; their differences
    /// are returned inline and attached to the parent's report rather than
    /// going through the open/close stack.
    fn visit_annotation(
        &mut self,
        old: Option<ElementId>,
        new: Option<ElementId>,
    ) -> Result<Vec<Difference>> {
        let _ = (old, new);
        Ok(Vec::new())
    }

    /// Close the most recent visit, in LIFO order, returning any
    /// differences for the pair it opened.
    fn visit_end(&mut self) -> Result<Vec<Difference>> {
        Ok(Vec::new())
    }
}

/// Rewrites or drops individual differences based on the pair they were
/// raised against.
///
/// Returning `None` removes the difference; returning `Some` replaces it.
/// Transforms are applied in registration order, each consuming the
/// previous one's output, and must not mutate elements or other
/// differences.
pub trait Transform {
    /// Short identifier used in logs and error attribution.
    fn name(&self) -> &str;

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    fn transform(
        &self,
        old: Option<&ElementNode>,
        new: Option<&ElementNode>,
        difference: &Difference,
    ) -> Result<Option<Difference>>;
}

/// Terminal consumer of non-empty reports.
pub trait Reporter {
    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    fn report(&mut self, report: &Report) -> Result<()>;

    /// Flush and release output resources; runs once per analysis.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Predicate gate over elements: whether a pair is analyzed at all and
/// whether the traversal descends into its children.
pub trait ElementFilter {
    fn applies(&self, element: &ElementNode) -> bool;

    fn should_descend_into(&self, element: &ElementNode) -> bool;
}
