//! Reports: differences bound to the element pair they were raised against.

use serde::{Deserialize, Serialize};

use super::difference::{Difference, Severity};
use super::element::{ApiTree, ElementId, ElementKind};

/// A lightweight, serializable snapshot of an element for report delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Full human-readable name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

impl ElementSnapshot {
    /// Snapshot an element out of its tree.
    #[must_use]
    pub fn of(tree: &ApiTree, id: ElementId) -> Self {
        let node = tree.node(id);
        Self {
            id,
            kind: node.kind(),
            name: node.name().to_string(),
            archive: node.archive().map(String::from),
        }
    }
}

/// Differences raised against one element pair.
///
/// Either side may be absent (addition or removal). An empty difference
/// list is legal; the engine drops such reports before they reach
/// reporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_element: Option<ElementSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_element: Option<ElementSnapshot>,
    pub differences: Vec<Difference>,
}

impl Report {
    pub fn new(
        old_element: Option<ElementSnapshot>,
        new_element: Option<ElementSnapshot>,
        differences: Vec<Difference>,
    ) -> Self {
        Self {
            old_element,
            new_element,
            differences,
        }
    }

    /// Whether the report carries no differences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Highest severity among this report's differences.
    #[must_use]
    pub fn max_severity(&self) -> Severity {
        self.differences
            .iter()
            .map(Difference::max_severity)
            .max()
            .unwrap_or(Severity::None)
    }

    /// The name of whichever element is present, preferring the new side.
    #[must_use]
    pub fn subject_name(&self) -> &str {
        self.new_element
            .as_ref()
            .or(self.old_element.as_ref())
            .map_or("<none>", |e| e.name.as_str())
    }
}
