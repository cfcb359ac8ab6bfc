//! Dropping differences by code pattern.

use regex::Regex;

use crate::config::AnalysisConfig;
use crate::engine::Transform;
use crate::error::{ApiDriftError, Result};
use crate::model::{Difference, ElementNode};

/// Configuration key: comma-separated regular expressions matched against
/// whole difference codes.
pub const IGNORE_CODES_KEY: &str = "transform.ignore.codes";

/// Drops differences whose code matches any configured pattern.
///
/// With no patterns configured, every difference passes through unchanged.
#[derive(Default)]
pub struct IgnoreTransform {
    patterns: Vec<Regex>,
}

impl IgnoreTransform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(&self, code: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(code))
    }
}

impl Transform for IgnoreTransform {
    fn name(&self) -> &str {
        "ignore"
    }

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        self.patterns = config
            .strings(IGNORE_CODES_KEY)
            .into_iter()
            .map(|pattern| {
                // Anchor so `field.removed` does not also drop
                // `field.removedFromInterface`.
                Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    ApiDriftError::config(format!("invalid ignore pattern '{pattern}': {e}"))
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn transform(
        &self,
        _old: Option<&ElementNode>,
        _new: Option<&ElementNode>,
        difference: &Difference,
    ) -> Result<Option<Difference>> {
        if self.matches(&difference.code) {
            tracing::debug!(code = difference.code, "difference ignored");
            Ok(None)
        } else {
            Ok(Some(difference.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_with(codes: &str) -> IgnoreTransform {
        let mut t = IgnoreTransform::new();
        t.initialize(&AnalysisConfig::from_iter("en", [(IGNORE_CODES_KEY, codes)]))
            .unwrap();
        t
    }

    fn diff(code: &str) -> Difference {
        Difference::builder(code).build()
    }

    #[test]
    fn matching_code_is_dropped() {
        let t = transform_with("class\\.added");
        assert!(t.transform(None, None, &diff("class.added")).unwrap().is_none());
        assert!(t.transform(None, None, &diff("class.removed")).unwrap().is_some());
    }

    #[test]
    fn patterns_are_anchored() {
        let t = transform_with("field\\.removed");
        assert!(t
            .transform(None, None, &diff("field.removedFromInterface"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn wildcard_pattern_drops_a_family() {
        let t = transform_with("annotation\\..*");
        assert!(t.transform(None, None, &diff("annotation.added")).unwrap().is_none());
        assert!(t.transform(None, None, &diff("annotation.removed")).unwrap().is_none());
        assert!(t.transform(None, None, &diff("class.added")).unwrap().is_some());
    }

    #[test]
    fn no_patterns_passes_everything_unchanged() {
        let mut t = IgnoreTransform::new();
        t.initialize(&AnalysisConfig::new("en")).unwrap();
        let d = diff("anything");
        assert_eq!(t.transform(None, None, &d).unwrap(), Some(d));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let mut t = IgnoreTransform::new();
        let result = t.initialize(&AnalysisConfig::from_iter("en", [(IGNORE_CODES_KEY, "(")]));
        assert!(matches!(result, Err(ApiDriftError::Config(_))));
    }
}
