//! Locale-dependent message formatting.
//!
//! The engine itself only carries stable difference codes; human-readable
//! text comes from a [`MessageBundle`] resolver. Resolution is a pure
//! function of `(key, locale, args)`. The built-in [`DefaultBundle`]
//! carries English messages for the built-in check catalog and the use-site
//! chain rendering; embedders can supply their own bundle for other
//! locales.

use std::fmt::Write as _;

/// Resolves message keys to formatted, locale-dependent strings.
pub trait MessageBundle: Send + Sync {
    /// Resolve `key` for `locale`, substituting `{0}`, `{1}`, ... with `args`.
    ///
    /// Unknown keys must produce a stable placeholder rather than panic.
    fn message(&self, key: &str, locale: &str, args: &[&str]) -> String;
}

/// Substitute `{n}` placeholders in a message pattern.
fn format_pattern(pattern: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match rest.find('}') {
            Some(end) => {
                let index: Option<usize> = rest[1..end].parse().ok();
                match index.and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&rest[..=end]),
                }
                rest = &rest[end + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// English message bundle for the built-in catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBundle;

impl DefaultBundle {
    fn pattern(key: &str) -> Option<&'static str> {
        Some(match key {
            "class.added" => "class {0} added",
            "class.removed" => "class {0} removed",
            "class.kindChanged" => "kind changed from {0} to {1}",
            "field.added" => "field {0} added",
            "field.removed" => "field {0} removed",
            "field.typeChanged" => "field type changed from {0} to {1}",
            "field.constantValueChanged" => "constant value changed from {0} to {1}",
            "field.nowConstant" => "field became a compile-time constant",
            "field.constantRemoved" => "field with constant value {0} removed",
            "method.added" => "method {0} added",
            "method.removed" => "method {0} removed",
            "method.returnTypeChanged" => "return type changed from {0} to {1}",
            "annotation.added" => "annotation {0} added",
            "annotation.removed" => "annotation {0} removed",
            "uses.annotates" => "{0} is annotated by {1}",
            "uses.hasType" => "{0} has type {1}",
            "uses.parameterType" => "{0} has parameter of type {1}",
            "uses.returnType" => "{0} returns {1}",
            "uses.isThrown" => "{0} throws {1}",
            "uses.isImplemented" => "{0} implements {1}",
            "uses.isInherited" => "{0} inherits from {1}",
            "uses.contains" => "{0} contains {1}",
            "uses.partOfApi" => "{0} is part of the API",
            _ => return None,
        })
    }
}

impl MessageBundle for DefaultBundle {
    fn message(&self, key: &str, _locale: &str, args: &[&str]) -> String {
        match Self::pattern(key) {
            Some(pattern) => format_pattern(pattern, args),
            None => {
                let mut out = String::new();
                let _ = write!(out, "!{key}!");
                out
            }
        }
    }
}
