//! The default difference analyzer: multiplexes element pairs over a check
//! set.
//!
//! Dispatch is keyed by element kind. A kind stack is pushed on begin and
//! popped on end so the right checks are closed in LIFO order. Annotations
//! are special-cased: the element comparator sorts them last among siblings
//! and they are leaves, so their visits return differences inline, buffered
//! until the parent element's close instead of going through the stack.
//! Pushing annotations onto the kind stack would corrupt it.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;

use super::traits::{Check, DifferenceAnalyzer, Environment};
use crate::config::AnalysisConfig;
use crate::error::{ApiDriftError, ErrorContext, Result};
use crate::messages::MessageBundle;
use crate::model::{
    example_path_to_api, Difference, ElementId, ElementKind, ElementSnapshot, PathStep, Report,
};

/// Configuration key listing difference codes that get an example use chain
/// appended to their description.
pub const USE_REPORTING_CODES_KEY: &str = "checks.use.reporting.codes";

const ALL_KINDS: [ElementKind; 5] = [
    ElementKind::Class,
    ElementKind::Field,
    ElementKind::Method,
    ElementKind::MethodParameter,
    ElementKind::Annotation,
];

/// Difference analyzer dispatching to a set of [`Check`]s.
pub struct CheckDifferenceAnalyzer {
    checks: Vec<Box<dyn Check>>,
    checks_by_interest: IndexMap<ElementKind, Vec<usize>>,
    kind_stack: Vec<ElementKind>,
    // Annotations always sort last among siblings, so by the time the
    // parent closes there are no more children coming for it and a single
    // buffer (rather than a stack of buffers) is enough.
    annotation_buffer: Vec<Difference>,
    old_env: Environment,
    new_env: Environment,
    use_reporting_codes: BTreeSet<String>,
    bundle: Arc<dyn MessageBundle>,
    locale: String,
}

impl CheckDifferenceAnalyzer {
    /// Wire up the checks: initialize each exactly once, hand out the two
    /// environments, and index the checks by their declared interests in
    /// registration order.
    pub fn new(
        config: &AnalysisConfig,
        old_env: Environment,
        new_env: Environment,
        mut checks: Vec<Box<dyn Check>>,
        bundle: Arc<dyn MessageBundle>,
    ) -> Result<Self> {
        for check in &mut checks {
            check
                .initialize(config)
                .with_context(|| format!("initializing check '{}'", check.name()))?;
            check.set_old_environment(old_env.clone());
            check.set_new_environment(new_env.clone());
        }

        let mut checks_by_interest: IndexMap<ElementKind, Vec<usize>> =
            ALL_KINDS.iter().map(|&k| (k, Vec::new())).collect();
        for (index, check) in checks.iter().enumerate() {
            for &kind in check.interest() {
                if let Some(interested) = checks_by_interest.get_mut(&kind) {
                    if !interested.contains(&index) {
                        interested.push(index);
                    }
                }
            }
        }

        let use_reporting_codes = config
            .strings(USE_REPORTING_CODES_KEY)
            .into_iter()
            .collect();

        Ok(Self {
            checks,
            checks_by_interest,
            kind_stack: Vec::new(),
            annotation_buffer: Vec::new(),
            old_env,
            new_env,
            use_reporting_codes,
            bundle,
            locale: config.locale().to_string(),
        })
    }

    /// Kind of a pair. Both present sides have the same kind; the sibling
    /// order makes mixed-kind pairs impossible.
    fn pair_kind(&self, old: Option<ElementId>, new: Option<ElementId>) -> Option<ElementKind> {
        let old_kind = old.map(|id| self.old_env.element(id).kind());
        let new_kind = new.map(|id| self.new_env.element(id).kind());
        debug_assert!(
            old_kind.is_none() || new_kind.is_none() || old_kind == new_kind,
            "mixed-kind pair: {old_kind:?} vs {new_kind:?}"
        );
        old_kind.or(new_kind)
    }

    fn snapshot(&self, old: Option<ElementId>, new: Option<ElementId>) -> (Option<ElementSnapshot>, Option<ElementSnapshot>) {
        (
            old.map(|id| ElementSnapshot::of(self.old_env.tree(), id)),
            new.map(|id| ElementSnapshot::of(self.new_env.tree(), id)),
        )
    }

    /// Render an example chain of uses leading from `element`'s enclosing
    /// class to the primary API, if one exists.
    fn render_uses(&self, env: &Environment, element: ElementId) -> Option<String> {
        let tree = env.tree();
        if tree.node(element).kind() != ElementKind::Class {
            return None;
        }
        tracing::trace!(element = tree.node(element).name(), "reporting uses");

        for &use_site in tree.node(element).use_sites() {
            if !use_site.use_type.moves_to_api() {
                continue;
            }
            let Some(path) = example_path_to_api(tree, element, use_site) else {
                tracing::debug!(
                    element = tree.node(element).name(),
                    "no example path to an API element found"
                );
                continue;
            };

            let rendered: Vec<String> = path
                .iter()
                .map(|step| self.render_step(env, step))
                .collect();
            let last_site = path
                .last()
                .map(|step| tree.node(step.use_site.site).name().to_string())
                .unwrap_or_default();
            let part_of_api =
                self.bundle
                    .message("uses.partOfApi", &self.locale, &[last_site.as_str()]);

            return Some(format!("\n{} ({part_of_api})", rendered.join(" <- ")));
        }

        None
    }

    fn render_step(&self, env: &Environment, step: &PathStep) -> String {
        let tree = env.tree();
        let site_name = tree.node(step.use_site.site).name();
        let type_name = tree.node(step.used_type).name();
        self.bundle.message(
            step.use_site.use_type.message_key(),
            &self.locale,
            &[site_name, type_name],
        )
    }

    /// Append example use chains to differences whose code asks for it.
    fn append_use_reporting(
        &self,
        old: Option<ElementId>,
        new: Option<ElementId>,
        differences: Vec<Difference>,
    ) -> Vec<Difference> {
        if self.use_reporting_codes.is_empty() {
            return differences;
        }

        differences
            .into_iter()
            .map(|d| {
                if !self.use_reporting_codes.contains(&d.code) {
                    return d;
                }
                let mut description = d.description.clone().unwrap_or_default();
                if let Some(uses) = old.and_then(|id| self.render_uses(&self.old_env, id)) {
                    description.push_str(&uses);
                }
                if let Some(uses) = new.and_then(|id| self.render_uses(&self.new_env, id)) {
                    description.push_str(&uses);
                }
                if description.is_empty() {
                    d
                } else {
                    let mut replacement = d;
                    replacement.description = Some(description);
                    replacement
                }
            })
            .collect()
    }
}

impl DifferenceAnalyzer for CheckDifferenceAnalyzer {
    fn open(&mut self) -> Result<()> {
        tracing::debug!("opening difference analyzer");
        Ok(())
    }

    fn begin_analysis(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<()> {
        tracing::trace!(?old, ?new, "beginning analysis");

        let Some(kind) = self.pair_kind(old, new) else {
            return Ok(());
        };

        if kind == ElementKind::Annotation {
            // Not pushed onto the kind stack; results buffer into the
            // parent's close.
            let interested = self.checks_by_interest[&ElementKind::Annotation].clone();
            for index in interested {
                let check = &mut self.checks[index];
                let name = check.name().to_string();
                let differences = check
                    .visit_annotation(old, new)
                    .with_context(|| format!("in check '{name}'"))?;
                self.annotation_buffer.extend(differences);
            }
            return Ok(());
        }

        self.kind_stack.push(kind);
        let interested = self.checks_by_interest[&kind].clone();
        for index in interested {
            let check = &mut self.checks[index];
            let name = check.name().to_string();
            let result = match kind {
                ElementKind::Class => check.visit_class(old, new),
                ElementKind::Field => check.visit_field(old, new),
                ElementKind::Method => check.visit_method(old, new),
                ElementKind::MethodParameter => check.visit_method_parameter(old, new),
                ElementKind::Annotation => unreachable!("annotations never reach the kind stack"),
            };
            result.with_context(|| format!("in check '{name}'"))?;
        }

        Ok(())
    }

    fn end_analysis(&mut self, old: Option<ElementId>, new: Option<ElementId>) -> Result<Report> {
        let (old_snapshot, new_snapshot) = self.snapshot(old, new);

        if self.pair_kind(old, new) == Some(ElementKind::Annotation) {
            // Reported at the parent element.
            return Ok(Report::new(old_snapshot, new_snapshot, Vec::new()));
        }

        let kind = self.kind_stack.pop().ok_or_else(|| {
            ApiDriftError::check(
                "dispatch",
                "end_analysis without matching begin_analysis",
            )
        })?;

        let mut differences = Vec::new();
        let interested = self.checks_by_interest[&kind].clone();
        for index in interested {
            let check = &mut self.checks[index];
            let name = check.name().to_string();
            let emitted = check
                .visit_end()
                .with_context(|| format!("in check '{name}'"))?;
            differences.extend(emitted);
        }

        if !self.annotation_buffer.is_empty() {
            differences.append(&mut self.annotation_buffer);
        }

        if !differences.is_empty() {
            tracing::trace!(count = differences.len(), "detected differences");
        }

        let differences = self.append_use_reporting(old, new, differences);

        Ok(Report::new(old_snapshot, new_snapshot, differences))
    }

    fn close(&mut self) -> Result<()> {
        tracing::debug!("difference analyzer closed");
        debug_assert!(
            self.kind_stack.is_empty(),
            "kind stack not empty at close: {:?}",
            self.kind_stack
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultBundle;
    use crate::model::{Api, NewElement, TreeBuilder};

    fn env_of(keys: &[(&str, ElementKind)]) -> Environment {
        let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
        for (key, kind) in keys {
            builder.add(None, NewElement::new(*kind, *key, *key));
        }
        Environment::new(Arc::new(builder.build().unwrap()))
    }

    struct CountingCheck {
        visits: usize,
        ends: usize,
    }

    impl Check for CountingCheck {
        fn name(&self) -> &str {
            "test.counting"
        }

        fn set_old_environment(&mut self, _env: Environment) {}

        fn set_new_environment(&mut self, _env: Environment) {}

        fn interest(&self) -> &[ElementKind] {
            &[ElementKind::Class]
        }

        fn visit_class(&mut self, _old: Option<ElementId>, _new: Option<ElementId>) -> Result<()> {
            self.visits += 1;
            Ok(())
        }

        fn visit_end(&mut self) -> Result<Vec<Difference>> {
            self.ends += 1;
            Ok(Vec::new())
        }
    }

    #[test]
    fn begin_end_round_trip_produces_report() {
        let old_env = env_of(&[("A", ElementKind::Class)]);
        let new_env = env_of(&[("A", ElementKind::Class)]);
        let mut analyzer = CheckDifferenceAnalyzer::new(
            &AnalysisConfig::new("en-US"),
            old_env,
            new_env,
            vec![Box::new(CountingCheck { visits: 0, ends: 0 })],
            Arc::new(DefaultBundle),
        )
        .unwrap();

        analyzer.open().unwrap();
        analyzer
            .begin_analysis(Some(ElementId(0)), Some(ElementId(0)))
            .unwrap();
        let report = analyzer
            .end_analysis(Some(ElementId(0)), Some(ElementId(0)))
            .unwrap();
        analyzer.close().unwrap();

        assert!(report.is_empty());
        assert_eq!(report.old_element.unwrap().name, "A");
    }

    #[test]
    fn annotation_pair_returns_empty_report_and_buffers() {
        struct AnnotationCheck;

        impl Check for AnnotationCheck {
            fn name(&self) -> &str {
                "test.annotations"
            }

            fn set_old_environment(&mut self, _env: Environment) {}

            fn set_new_environment(&mut self, _env: Environment) {}

            fn interest(&self) -> &[ElementKind] {
                &[ElementKind::Annotation]
            }

            fn visit_annotation(
                &mut self,
                _old: Option<ElementId>,
                _new: Option<ElementId>,
            ) -> Result<Vec<Difference>> {
                Ok(vec![Difference::builder("annotation.changed").build()])
            }
        }

        // Tree: class A with annotation child.
        let build_env = || {
            let mut builder = TreeBuilder::new(Api::of(std::iter::empty()));
            let class = builder.add(None, NewElement::new(ElementKind::Class, "A", "class A"));
            builder.add(
                Some(class),
                NewElement::new(ElementKind::Annotation, "@X", "@X on A"),
            );
            Environment::new(Arc::new(builder.build().unwrap()))
        };
        let old_env = build_env();
        let new_env = build_env();

        let mut analyzer = CheckDifferenceAnalyzer::new(
            &AnalysisConfig::new("en-US"),
            old_env,
            new_env,
            vec![Box::new(AnnotationCheck)],
            Arc::new(DefaultBundle),
        )
        .unwrap();

        let class = Some(ElementId(0));
        let annotation = Some(ElementId(1));

        analyzer.begin_analysis(class, class).unwrap();
        analyzer.begin_analysis(annotation, annotation).unwrap();
        let annotation_report = analyzer.end_analysis(annotation, annotation).unwrap();
        assert!(
            annotation_report.is_empty(),
            "annotation pairs report at the parent"
        );

        let class_report = analyzer.end_analysis(class, class).unwrap();
        assert_eq!(class_report.differences.len(), 1);
        assert_eq!(class_report.differences[0].code, "annotation.changed");
    }

    #[test]
    fn unbalanced_end_is_an_error() {
        let old_env = env_of(&[("A", ElementKind::Class)]);
        let new_env = env_of(&[("A", ElementKind::Class)]);
        let mut analyzer = CheckDifferenceAnalyzer::new(
            &AnalysisConfig::new("en-US"),
            old_env,
            new_env,
            Vec::new(),
            Arc::new(DefaultBundle),
        )
        .unwrap();

        let result = analyzer.end_analysis(Some(ElementId(0)), Some(ElementId(0)));
        assert!(result.is_err());
    }
}
