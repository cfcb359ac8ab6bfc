//! Checks over method elements.
//!
//! Methods carry their return type in the `return` attribute; the sort key
//! is the full signature, so overloads pair independently.

use super::{ActiveStack, CheckCommon, Code};
use crate::config::AnalysisConfig;
use crate::engine::{Check, Environment};
use crate::error::Result;
use crate::model::{Difference, ElementId, ElementKind};

/// Reports methods present only on the new side.
pub struct MethodAdded {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl MethodAdded {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for MethodAdded {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for MethodAdded {
    fn name(&self) -> &str {
        "methods.added"
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
        &[ElementKind::Method]
    }

    fn visit_method(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
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
            .difference(Code::MethodAdded, &[node.sort_key()])
            .attachment("method", node.sort_key())
            .build();
        Ok(vec![difference])
    }
}

/// Reports methods present only on the old side.
pub struct MethodRemoved {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl MethodRemoved {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for MethodRemoved {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for MethodRemoved {
    fn name(&self) -> &str {
        "methods.removed"
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
        &[ElementKind::Method]
    }

    fn visit_method(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
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
            .difference(Code::MethodRemoved, &[node.sort_key()])
            .attachment("method", node.sort_key())
            .build();
        Ok(vec![difference])
    }
}

/// Reports methods whose return type changed.
pub struct MethodReturnTypeChanged {
    common: CheckCommon,
    pending: ActiveStack<(ElementId, ElementId)>,
}

impl MethodReturnTypeChanged {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for MethodReturnTypeChanged {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for MethodReturnTypeChanged {
    fn name(&self) -> &str {
        "methods.returnTypeChanged"
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
        &[ElementKind::Method]
    }

    fn visit_method(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let record = match (old, new) {
            (Some(o), Some(n)) => {
                let old_return = self.common.old().element(o).attr("return");
                let new_return = self.common.new_side().element(n).attr("return");
                (old_return != new_return).then_some((o, n))
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
        let old_return = self
            .common
            .old()
            .element(o)
            .attr("return")
            .unwrap_or("void")
            .to_string();
        let new_return = self
            .common
            .new_side()
            .element(n)
            .attr("return")
            .unwrap_or("void")
            .to_string();

        let difference = self
            .common
            .difference(Code::MethodReturnTypeChanged, &[&old_return, &new_return])
            .attachment("oldReturn", &old_return)
            .attachment("newReturn", &new_return)
            .build();
        Ok(vec![difference])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, NewElement, TreeBuilder};
    use std::sync::Arc;

    fn method_env(methods: &[(&str, &str)]) -> Environment {
        let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
        let class = builder.add(None, NewElement::new(ElementKind::Class, "C", "class C"));
        for (signature, return_type) in methods {
            let id = builder.add(
                Some(class),
                NewElement::new(
                    ElementKind::Method,
                    *signature,
                    format!("method C::{signature}"),
                ),
            );
            builder.set_attr(id, "return", *return_type);
        }
        Environment::new(Arc::new(builder.build().unwrap()))
    }

    fn first_method(env: &Environment) -> ElementId {
        env.tree().children(env.tree().roots()[0])[0]
    }

    #[test]
    fn return_type_change_is_reported() {
        let old_env = method_env(&[("get()", "int")]);
        let new_env = method_env(&[("get()", "long")]);
        let (o, n) = (first_method(&old_env), first_method(&new_env));

        let mut check = MethodReturnTypeChanged::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_method(Some(o), Some(n)).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "method.returnTypeChanged");
    }

    #[test]
    fn removed_method_is_reported() {
        let old_env = method_env(&[("run()", "void")]);
        let new_env = method_env(&[]);
        let o = first_method(&old_env);

        let mut check = MethodRemoved::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_method(Some(o), None).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "method.removed");
        assert_eq!(differences[0].max_severity(), crate::model::Severity::Breaking);
    }
}
