//! Analysis configuration.
//!
//! Every component (analyzers, checks, transforms, reporters) is handed the
//! same immutable [`AnalysisConfig`] at initialization: a locale plus a flat
//! string-to-string property map. Components interpret their own key
//! namespaces; the engine reserves none and performs no schema validation.
//! A missing key behaves identically to an empty map.
//!
//! The CLI fills the map from `APIDRIFT_*` environment variables, so
//! `APIDRIFT_TRANSFORM_IGNORE_CODES=class.added` becomes the property
//! `transform.ignore.codes = class.added`.

use std::collections::BTreeMap;

/// Environment variable prefix recognized by [`AnalysisConfig::from_env`].
pub const ENV_PREFIX: &str = "APIDRIFT_";

/// Immutable configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    locale: String,
    properties: BTreeMap<String, String>,
}

impl AnalysisConfig {
    /// Create a configuration with the given locale and an empty property map.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Create a configuration from key/value pairs.
    pub fn from_iter<K, V, I>(locale: impl Into<String>, properties: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            locale: locale.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Create a configuration from `APIDRIFT_*` environment variables.
    ///
    /// The prefix is stripped and the remainder lowercased with underscores
    /// mapped to dots: `APIDRIFT_CHECKS_USE_REPORTING_CODES` becomes the
    /// property key `checks.use.reporting.codes`.
    pub fn from_env(locale: impl Into<String>) -> Self {
        let properties = std::env::vars()
            .filter_map(|(k, v)| {
                let key = k.strip_prefix(ENV_PREFIX)?;
                Some((key.to_lowercase().replace('_', "."), v))
            })
            .collect();

        Self {
            locale: locale.into(),
            properties,
        }
    }

    /// The locale for message formatting, e.g. `en-US`.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Look up a property value, falling back to a default.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Interpret a property as a comma-separated list of strings.
    ///
    /// A missing key yields an empty list; whitespace around entries is
    /// trimmed and empty entries are skipped.
    #[must_use]
    pub fn strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Interpret a property as a boolean (`true`/`false`, `1`/`0`, `yes`/`no`).
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            _ => default,
        }
    }

    /// Iterate over all properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over all properties whose key starts with the given prefix.
    ///
    /// Yields `(suffix, value)` pairs with the prefix stripped, in key order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.properties.iter().filter_map(move |(k, v)| {
            k.strip_prefix(prefix).map(|suffix| (suffix, v.as_str()))
        })
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the property map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
