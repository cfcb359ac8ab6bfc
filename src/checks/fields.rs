//! Checks over field elements.
//!
//! Fields carry their declared type in the `type` attribute and their
//! compile-time constant value, if any, in the `constant` attribute.

use super::{ActiveStack, CheckCommon, Code};
use crate::config::AnalysisConfig;
use crate::engine::{Check, Environment};
use crate::error::Result;
use crate::model::{Difference, ElementId, ElementKind};

/// Reports fields present only on the new side.
pub struct FieldAdded {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl FieldAdded {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for FieldAdded {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for FieldAdded {
    fn name(&self) -> &str {
        "fields.added"
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
        &[ElementKind::Field]
    }

    fn visit_field(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
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
            .difference(Code::FieldAdded, &[node.sort_key()])
            .attachment("field", node.sort_key())
            .build();
        Ok(vec![difference])
    }
}

/// Reports fields present only on the old side. A removed field that held a
/// compile-time constant gets its own code, because call sites may have
/// inlined the value.
pub struct FieldRemoved {
    common: CheckCommon,
    pending: ActiveStack<ElementId>,
}

impl FieldRemoved {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for FieldRemoved {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for FieldRemoved {
    fn name(&self) -> &str {
        "fields.removed"
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
        &[ElementKind::Field]
    }

    fn visit_field(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
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
        let difference = match node.attr("constant") {
            Some(constant) => self
                .common
                .difference(Code::FieldConstantRemoved, &[constant])
                .attachment("field", node.sort_key())
                .attachment("constant", constant)
                .build(),
            None => self
                .common
                .difference(Code::FieldRemoved, &[node.sort_key()])
                .attachment("field", node.sort_key())
                .build(),
        };
        Ok(vec![difference])
    }
}

/// Reports fields whose declared type changed.
pub struct FieldTypeChanged {
    common: CheckCommon,
    pending: ActiveStack<(ElementId, ElementId)>,
}

impl FieldTypeChanged {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for FieldTypeChanged {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for FieldTypeChanged {
    fn name(&self) -> &str {
        "fields.typeChanged"
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
        &[ElementKind::Field]
    }

    fn visit_field(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let record = match (old, new) {
            (Some(o), Some(n)) => {
                let old_type = self.common.old().element(o).attr("type");
                let new_type = self.common.new_side().element(n).attr("type");
                (old_type != new_type).then_some((o, n))
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
        let old_type = self
            .common
            .old()
            .element(o)
            .attr("type")
            .unwrap_or("?")
            .to_string();
        let new_type = self
            .common
            .new_side()
            .element(n)
            .attr("type")
            .unwrap_or("?")
            .to_string();

        let difference = self
            .common
            .difference(Code::FieldTypeChanged, &[&old_type, &new_type])
            .attachment("oldType", &old_type)
            .attachment("newType", &new_type)
            .build();
        Ok(vec![difference])
    }
}

/// Reports constant-value movement on fields present on both sides: a
/// changed constant value, or a field that newly became a constant.
pub struct FieldConstantChanges {
    common: CheckCommon,
    pending: ActiveStack<(ElementId, ElementId)>,
}

impl FieldConstantChanges {
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: CheckCommon::new(),
            pending: ActiveStack::new(),
        }
    }
}

impl Default for FieldConstantChanges {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for FieldConstantChanges {
    fn name(&self) -> &str {
        "fields.constants"
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
        &[ElementKind::Field]
    }

    fn visit_field(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        let record = match (old, new) {
            (Some(o), Some(n)) => Some((o, n)),
            _ => None,
        };
        self.pending.open(record);
        Ok(())
    }

    fn visit_end(&mut self) -> Result<Vec<Difference>> {
        let Some((o, n)) = self.pending.close() else {
            return Ok(Vec::new());
        };
        let old_constant = self.common.old().element(o).attr("constant").map(String::from);
        let new_constant = self
            .common
            .new_side()
            .element(n)
            .attr("constant")
            .map(String::from);

        let difference = match (old_constant, new_constant) {
            (Some(old_value), Some(new_value)) if old_value != new_value => Some(
                self.common
                    .difference(Code::FieldConstantValueChanged, &[&old_value, &new_value])
                    .attachment("oldValue", &old_value)
                    .attachment("newValue", &new_value)
                    .build(),
            ),
            (None, Some(new_value)) => Some(
                self.common
                    .difference(Code::FieldNowConstant, &[])
                    .attachment("value", &new_value)
                    .build(),
            ),
            _ => None,
        };

        Ok(difference.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, NewElement, TreeBuilder};
    use std::sync::Arc;

    /// A single class with the given fields, each `(name, type, constant)`.
    fn field_env(fields: &[(&str, &str, Option<&str>)]) -> Environment {
        let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
        let class = builder.add(None, NewElement::new(ElementKind::Class, "C", "class C"));
        for (name, field_type, constant) in fields {
            let id = builder.add(
                Some(class),
                NewElement::new(ElementKind::Field, *name, format!("field C.{name}")),
            );
            builder.set_attr(id, "type", *field_type);
            if let Some(value) = constant {
                builder.set_attr(id, "constant", *value);
            }
        }
        Environment::new(Arc::new(builder.build().unwrap()))
    }

    fn first_field(env: &Environment) -> ElementId {
        env.tree().children(env.tree().roots()[0])[0]
    }

    #[test]
    fn constant_value_change_is_reported() {
        let old_env = field_env(&[("LIMIT", "int", Some("42"))]);
        let new_env = field_env(&[("LIMIT", "int", Some("43"))]);
        let (o, n) = (first_field(&old_env), first_field(&new_env));

        let mut check = FieldConstantChanges::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_field(Some(o), Some(n)).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "field.constantValueChanged");
    }

    #[test]
    fn becoming_constant_is_reported() {
        let old_env = field_env(&[("LIMIT", "int", None)]);
        let new_env = field_env(&[("LIMIT", "int", Some("42"))]);
        let (o, n) = (first_field(&old_env), first_field(&new_env));

        let mut check = FieldConstantChanges::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_field(Some(o), Some(n)).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "field.nowConstant");
    }

    #[test]
    fn removed_constant_field_uses_dedicated_code() {
        let old_env = field_env(&[("LIMIT", "int", Some("42"))]);
        let new_env = field_env(&[]);
        let o = first_field(&old_env);

        let mut check = FieldRemoved::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_field(Some(o), None).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "field.constantRemoved");
    }

    #[test]
    fn type_change_is_reported() {
        let old_env = field_env(&[("count", "int", None)]);
        let new_env = field_env(&[("count", "long", None)]);
        let (o, n) = (first_field(&old_env), first_field(&new_env));

        let mut check = FieldTypeChanged::new();
        check.initialize(&AnalysisConfig::new("en-US")).unwrap();
        check.set_old_environment(old_env);
        check.set_new_environment(new_env);

        check.visit_field(Some(o), Some(n)).unwrap();
        let differences = check.visit_end().unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].code, "field.typeChanged");
        assert_eq!(
            differences[0].description.as_deref(),
            Some("field type changed from int to long")
        );
    }
}
