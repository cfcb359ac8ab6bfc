//! Overriding difference classifications by code.

use std::collections::{BTreeMap, HashMap};

use crate::config::AnalysisConfig;
use crate::engine::Transform;
use crate::error::{ApiDriftError, Result};
use crate::model::{Compatibility, Difference, ElementNode, Severity};

/// Configuration key prefix. A property
/// `transform.reclassify.field.removed = source=non-breaking,binary=breaking`
/// replaces the classification of every `field.removed` difference.
pub const RECLASSIFY_KEY_PREFIX: &str = "transform.reclassify.";

/// Replaces the classification of differences whose code is configured.
///
/// Unconfigured codes pass through unchanged.
#[derive(Default)]
pub struct ReclassifyTransform {
    overrides: HashMap<String, BTreeMap<Compatibility, Severity>>,
}

impl ReclassifyTransform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_classification(code: &str, value: &str) -> Result<BTreeMap<Compatibility, Severity>> {
    let mut classification = BTreeMap::new();
    for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (dimension, severity) = entry.split_once('=').ok_or_else(|| {
            ApiDriftError::config(format!(
                "reclassification of '{code}' must use dimension=severity entries, got '{entry}'"
            ))
        })?;
        let dimension: Compatibility = dimension.trim().parse().map_err(|e: String| {
            ApiDriftError::config(format!("reclassification of '{code}': {e}"))
        })?;
        let severity: Severity = severity.trim().parse().map_err(|e: String| {
            ApiDriftError::config(format!("reclassification of '{code}': {e}"))
        })?;
        classification.insert(dimension, severity);
    }
    Ok(classification)
}

impl Transform for ReclassifyTransform {
    fn name(&self) -> &str {
        "reclassify"
    }

    fn initialize(&mut self, config: &AnalysisConfig) -> Result<()> {
        self.overrides = config
            .with_prefix(RECLASSIFY_KEY_PREFIX)
            .map(|(code, value)| Ok((code.to_string(), parse_classification(code, value)?)))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn transform(
        &self,
        _old: Option<&ElementNode>,
        _new: Option<&ElementNode>,
        difference: &Difference,
    ) -> Result<Option<Difference>> {
        match self.overrides.get(&difference.code) {
            Some(classification) => {
                tracing::debug!(code = difference.code, "difference reclassified");
                Ok(Some(difference.reclassified(classification.clone())))
            }
            None => Ok(Some(difference.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_code_is_reclassified() {
        let mut t = ReclassifyTransform::new();
        t.initialize(&AnalysisConfig::from_iter(
            "en",
            [(
                "transform.reclassify.field.removed",
                "source=non-breaking,binary=potentially-breaking",
            )],
        ))
        .unwrap();

        let d = Difference::builder("field.removed")
            .classify(Compatibility::Source, Severity::Breaking)
            .classify(Compatibility::Binary, Severity::Breaking)
            .build();
        let out = t.transform(None, None, &d).unwrap().unwrap();

        assert_eq!(
            out.classification.get(&Compatibility::Source),
            Some(&Severity::NonBreaking)
        );
        assert_eq!(out.max_severity(), Severity::PotentiallyBreaking);
    }

    #[test]
    fn unconfigured_code_passes_unchanged() {
        let mut t = ReclassifyTransform::new();
        t.initialize(&AnalysisConfig::from_iter(
            "en",
            [("transform.reclassify.field.removed", "source=none")],
        ))
        .unwrap();

        let d = Difference::builder("class.removed")
            .classify(Compatibility::Source, Severity::Breaking)
            .build();
        assert_eq!(t.transform(None, None, &d).unwrap(), Some(d));
    }

    #[test]
    fn malformed_entry_is_a_config_error() {
        let mut t = ReclassifyTransform::new();
        let result = t.initialize(&AnalysisConfig::from_iter(
            "en",
            [("transform.reclassify.x", "not-an-entry")],
        ));
        assert!(matches!(result, Err(ApiDriftError::Config(_))));
    }

    #[test]
    fn unknown_severity_is_a_config_error() {
        let mut t = ReclassifyTransform::new();
        let result = t.initialize(&AnalysisConfig::from_iter(
            "en",
            [("transform.reclassify.x", "source=catastrophic")],
        ));
        assert!(matches!(result, Err(ApiDriftError::Config(_))));
    }
}
