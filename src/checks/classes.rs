//! Checks over class elements.

use super::{ActiveStack, CheckCommon, Code};
use crate::config::AnalysisConfig;
use crate::engine::{Check, Environment};
use crate::error::Result;
use crate::model::{Difference, ElementId, ElementKind};

/// Reports classes present only on the new side.
pub struct ClassAdded {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl ClassAdded {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for ClassAdded {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for ClassAdded {
    fn name(&self) -> &str {
        "classes.added"
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
        &[ElementKind::Class]
    }

    fn visit_class(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        self.pending.open(match (old, new) {
            (None, Some(n)) => Some(n),
            _ => None,
        });
        Ok(())
    }

    fn visit_end(&mut self) -> Result<Vec<Difference>> {
        let Some(added) = self.pending.close() else {
            return Ok(Vec::new());
        };
        let node = self.common.new_side().element(added);
        let difference = self
            .common
            .difference(Code::ClassAdded, &[node.sort_key()])
            .attachment("class", node.sort_key())
            .build();
        Ok(vec![difference])
    }
}

/// Reports classes present only on the old side.
pub struct ClassRemoved {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl ClassRemoved {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for ClassRemoved {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for ClassRemoved {
    fn name(&self) -> &str {
        "classes.removed"
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
        &[ElementKind::Class]
    }

    fn visit_class(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        self.pending.open(match (old, new) {
            (Some(o), None) => Some(o),
            _ => None,
        });
        Ok(())
    }

    fn visit_end(&mut self) -> Result<Vec<Difference>> {
        let Some(removed) = self.pending.close() else {
            return Ok(Vec::new());
        };
        let node = self.common.old().element(removed);
        let difference = self
            .common
            .difference(Code::ClassRemoved, &[node.sort_key()])
            .attachment("class", node.sort_key())
            .build();
        Ok(vec![difference])
    }
}

/// Reports a type whose sub-kind changed (class became interface, enum
/// became class, ...). The sub-kind travels in the `kind` attribute; a
/// single element kind tag covers all of them.
pub struct ClassKindChanged {
    common: CheckCommon,
    pending: ActiveStack<(ElementId, ElementId)>,
}

impl ClassKindChanged {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for ClassKindChanged {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for ClassKindChanged {
    fn name(&self) -> &str {
        "classes.kindChanged"
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
        &[ElementKind::Class]
    }

    fn visit_class(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let record = match (old, new) {
            (Some(o), Some(n)) => {
                let old_kind = self.common.old().element(o).attr("kind");
                let new_kind = self.common.new_side().element(n).attr("kind");
                (old_kind != new_kind).then_some((o, n))
            }
            _ => None,
        };
        self.pending.open(record);
        Ok(())
    }

    fn visit_end(&mut self) -> Result<Vec<Difference>> {
        let Some((o, n)) = self.pending.close() else {
            return Ok(Vec::new());
        };
        let old_kind = self
            .common
            .old()
            .element(o)
            .attr("kind")
            .unwrap_or("class")
            .to_string();
        let new_kind = self
            .common
            .new_side()
            .element(n)
            .attr("kind")
            .unwrap_or("class")
            .to_string();

        let difference = self
            .common
            .difference(Code::ClassKindChanged, &[&old_kind, &new_kind])
            .attachment("oldKind", &old_kind)
            .attachment("newKind", &new_kind)
            .build();
        Ok(vec![difference])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, NewElement, TreeBuilder};
    use std::sync::Arc;

    fn class_env(entries: &[(&str, &str)]) -> Environment {
        let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
        for (name, kind) in entries {
            let id = builder.add(
                None,
                NewElement::new(ElementKind::Class, *name, format!("class {name}")),
            );
            builder.set_attr(id, "kind", *kind);
        }
        Environment::new(Arc::new(builder.build().unwrap()))
    }

    #[test]
    fn kind_change_is_reported() {
        let old_env = class_env(&[("A", "class")]);
        let new_env = class_env(&[("A", "interface")]);

        let mut check = ClassKindChanged::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check
            .visit_class(Some(ElementId(0)), Some(ElementId(0)))
            .unwrap();
        let differences = check.visit_end().unwrap();

        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "class.kindChanged");
        assert_eq!(
            differences[0].description.as_deref(),
            Some("kind changed from class to interface")
        );
    }

    #[test]
    fn same_kind_is_silent() {
        let old_env = class_env(&[("A", "class")]);
        let new_env = class_env(&[("A", "class")]);

        let mut check = ClassKindChanged::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check
            .visit_class(Some(ElementId(0)), Some(ElementId(0)))
            .unwrap();
        assert!(check.visit_end().unwrap().is_empty());
    }

    #[test]
    fn added_class_is_reported_by_added_check() {
        let old_env = class_env(&[]);
        let new_env = class_env(&[("B", "class")]);

        let mut check = ClassAdded::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_class(None, Some(ElementId(0))).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "class.added");
    }
}
