//! Differences: the atoms of an analysis result.
//!
//! A difference describes one API change: a stable machine code, a human
//! name, an optional locale-dependent description, free-form string
//! attachments, and a classification of its impact per compatibility
//! dimension. Differences never mutate after creation; transforms produce
//! replacements.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How severely a change impacts consumers, per compatibility dimension.
///
/// The derived order is the severity order: `None` is the least severe,
/// `Breaking` the most.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    None,
    NonBreaking,
    PotentiallyBreaking,
    Breaking,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::NonBreaking => "non-breaking",
            Severity::PotentiallyBreaking => "potentially-breaking",
            Severity::Breaking => "breaking",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Severity::None),
            "non-breaking" | "nonBreaking" => Ok(Severity::NonBreaking),
            "potentially-breaking" | "potentiallyBreaking" => Ok(Severity::PotentiallyBreaking),
            "breaking" => Ok(Severity::Breaking),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A dimension along which compatibility can break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    Source,
    Binary,
    Semantic,
    Other,
}

impl Compatibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Compatibility::Source => "source",
            Compatibility::Binary => "binary",
            Compatibility::Semantic => "semantic",
            Compatibility::Other => "other",
        }
    }
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Compatibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Compatibility::Source),
            "binary" => Ok(Compatibility::Binary),
            "semantic" => Ok(Compatibility::Semantic),
            "other" => Ok(Compatibility::Other),
            unknown => Err(format!("unknown compatibility dimension '{unknown}'")),
        }
    }
}

/// One detected API change.
///
/// Fields are public but the record is immutable by contract: nothing in
/// the engine mutates a difference after it is built, and transforms return
/// replacement instances instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Stable machine code, e.g. `class.kindChanged`. Part of the external
    /// contract for downstream filtering; stable across releases.
    pub code: String,
    /// Short human name.
    pub name: String,
    /// Locale-dependent description; may embed formatted arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form attachments, in insertion order.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub attachments: IndexMap<String, String>,
    /// Impact per compatibility dimension.
    pub classification: BTreeMap<Compatibility, Severity>,
}

impl Difference {
    /// Start building a difference with the given code.
    #[must_use]
    pub fn builder(code: impl Into<String>) -> DifferenceBuilder {
        DifferenceBuilder {
            code: code.into(),
            name: String::new(),
            description: None,
            attachments: IndexMap::new(),
            classification: BTreeMap::new(),
        }
    }

    /// The highest severity across all dimensions.
    #[must_use]
    pub fn max_severity(&self) -> Severity {
        self.classification
            .values()
            .copied()
            .max()
            .unwrap_or(Severity::None)
    }

    /// A copy of this difference with a different classification.
    #[must_use]
    pub fn reclassified(&self, classification: BTreeMap<Compatibility, Severity>) -> Self {
        Self {
            classification,
            ..self.clone()
        }
    }
}

/// Builder for [`Difference`].
#[derive(Debug, Clone)]
pub struct DifferenceBuilder {
    code: String,
    name: String,
    description: Option<String>,
    attachments: IndexMap<String, String>,
    classification: BTreeMap<Compatibility, Severity>,
}

impl DifferenceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn classify(mut self, dimension: Compatibility, severity: Severity) -> Self {
        self.classification.insert(dimension, severity);
        self
    }

    #[must_use]
    pub fn build(self) -> Difference {
        Difference {
            code: self.code,
            name: self.name,
            description: self.description,
            attachments: self.attachments,
            classification: self.classification,
        }
    }
}
