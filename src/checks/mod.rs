//! The built-in check catalog.
//!
//! Each check is a small state machine following the same pattern: its
//! `visit_*` inspects the pair and pushes a pending record (or an explicit
//! "nothing interesting" marker) onto its own stack, and `visit_end` pops
//! the top record and emits differences when the record warrants it. The
//! engine's LIFO begin/end discipline keeps the stack aligned with the
//! traversal.

mod annotations;
mod classes;
mod code;
mod fields;
mod methods;

pub use annotations::AnnotationChanges;
pub use classes::{ClassAdded, ClassKindChanged, ClassRemoved};
pub use code::Code;
pub use fields::{FieldAdded, FieldConstantChanges, FieldRemoved, FieldTypeChanged};
pub use methods::{MethodAdded, MethodRemoved, MethodReturnTypeChanged};

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::engine::{Check, Environment};
use crate::messages::{DefaultBundle, MessageBundle};
use crate::model::DifferenceBuilder;

/// Every built-in check, in the order their differences should appear.
#[must_use]
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ClassAdded::new()),
        Box::new(ClassRemoved::new()),
        Box::new(ClassKindChanged::new()),
        Box::new(FieldAdded::new()),
        Box::new(FieldRemoved::new()),
        Box::new(FieldTypeChanged::new()),
        Box::new(FieldConstantChanges::new()),
        Box::new(MethodAdded::new()),
        Box::new(MethodRemoved::new()),
        Box::new(MethodReturnTypeChanged::new()),
        Box::new(AnnotationChanges::new()),
    ]
}

/// Per-check stack of pending records.
///
/// Every visit pushes exactly one entry, interesting or not, and every
/// `visit_end` pops exactly one, which keeps pushes and pops balanced by
/// construction.
#[derive(Debug)]
pub struct ActiveStack<T> {
    stack: Vec<Option<T>>,
}

impl<T> ActiveStack<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Record the outcome of a visit: `Some` when the pair is of interest.
    pub fn open(&mut self, record: Option<T>) {
        self.stack.push(record);
    }

    /// Close the most recent visit, returning its record if it was
    /// interesting.
    pub fn close(&mut self) -> Option<T> {
        debug_assert!(!self.stack.is_empty(), "visit_end without matching visit");
        self.stack.pop().flatten()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<T> Default for ActiveStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by all built-in checks: the two environments, the locale
/// and the message bundle used to render descriptions.
pub(crate) struct CheckCommon {
    old_env: Option<Environment>,
    new_env: Option<Environment>,
    locale: String,
    bundle: Arc<dyn MessageBundle>,
}

impl CheckCommon {
    pub(crate) fn new() -> Self {
        Self {
            old_env: None,
            new_env: None,
            locale: "en".to_string(),
            bundle: Arc::new(DefaultBundle),
        }
    }

    pub(crate) fn initialize(&mut self, config: &AnalysisConfig) {
        self.locale = config.locale().to_string();
    }

    pub(crate) fn set_old(&mut self, env: Environment) {
        self.old_env = Some(env);
    }

    pub(crate) fn set_new(&mut self, env: Environment) {
        self.new_env = Some(env);
    }

    /// The old side's environment. Set by the engine before any visit.
    pub(crate) fn old(&self) -> &Environment {
        self.old_env
            .as_ref()
            .expect("old environment is set before any visit")
    }

    /// The new side's environment. Set by the engine before any visit.
    pub(crate) fn new_side(&self) -> &Environment {
        self.new_env
            .as_ref()
            .expect("new environment is set before any visit")
    }

    /// Start a difference for `code`, rendering its description in the
    /// configured locale.
    pub(crate) fn difference(&self, code: Code, args: &[&str]) -> DifferenceBuilder {
        code.into_difference(self.bundle.as_ref(), &self.locale, args)
    }
}
