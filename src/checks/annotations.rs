//! Checks over annotation elements.
//!
//! Annotations are leaves sorted last among siblings; the dispatcher routes
//! them through `visit_annotation`, which returns its differences inline to
//! be attached to the enclosing element's report. No pending stack is
//! needed.

use super::{CheckCommon, Code};
use crate::config::AnalysisConfig;
use crate::engine::{Check, Environment};
use crate::error::Result;
use crate::model::{Difference, ElementId, ElementKind};

/// Reports annotations appearing or disappearing on an element.
pub struct AnnotationChanges {
    common: CheckCommon,
}

impl AnnotationChanges {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
        }
    }
}

impl Default for AnnotationChanges {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for AnnotationChanges {
    fn name(&self) -> &str {
        "annotations.changes"
    }

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        self.common.initialize(config);
        Ok(())
    }

    fn set_old_environment(&mut self, env: Environment) {
        self.common.set_old(env);
    }

    fn set_new_environment(&mut self, env: Environment) {
        self.common.set_new(env);
    }

    fn interest(&self) -> &[ElementKind] {
        &[ElementKind::Annotation]
    }

    fn visit_annotation(
        &mut self,
        old: Option<ElementId>,
        new: Option<ElementId>,
    ) -> Result<Vec<Difference>> {
        let difference = match (old, new) {
            (None, Some(n)) => {
                let node = self.common.new_side().element(n);
                Some(
                    self.common
                        .difference(Code::AnnotationAdded, &[node.sort_key()])
                        .attachment("annotation", node.sort_key())
                        .build(),
                )
            }
            (Some(o), None) => {
                let node = self.common.old().element(o);
                Some(
                    self.common
                        .difference(Code::AnnotationRemoved, &[node.sort_key()])
                        .attachment("annotation", node.sort_key())
                        .build(),
                )
            }
            // A matched annotation pair is identical by the sort order.
            _ => None,
        };
        Ok(difference.into_iter().collect())
    }
}
