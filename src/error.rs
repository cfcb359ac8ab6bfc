//! Unified error types for apidrift.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages. The taxonomy follows
//! the engine's failure model: configuration errors are programmer errors
//! and fail immediately; analyzer failures surface as I/O-class errors
//! after opened resources are closed; check, transform and reporter
//! failures are fatal for the analysis that raised them.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for apidrift operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiDriftError {
    /// Errors while building element trees from archives
    #[error("Analysis failed: {context}")]
    Analysis {
        context: String,
        #[source]
        source: AnalysisErrorKind,
    },

    /// A check raised during visit or close
    #[error("Check '{check}' failed: {message}")]
    Check { check: String, message: String },

    /// A transform raised while rewriting a difference
    #[error("Transform '{transform}' failed: {message}")]
    Transform { transform: String, message: String },

    /// A reporter raised while consuming a report
    #[error("Reporter failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors (invalid component set, malformed config values)
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific tree-building and archive-analysis error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisErrorKind {
    #[error("Failed to read archive '{archive}': {message}")]
    ArchiveRead { archive: String, message: String },

    #[error("Malformed API manifest in '{archive}': {message}")]
    MalformedManifest { archive: String, message: String },

    #[error("Duplicate sibling sort key '{key}' under '{parent}'")]
    DuplicateSibling { parent: String, key: String },

    #[error("Element tree construction failed: {0}")]
    TreeConstruction(String),
}

/// Specific report delivery error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Write failed: {0}")]
    Write(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for apidrift operations
pub type Result<T> = std::result::Result<T, ApiDriftError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ApiDriftError {
    /// Create an analysis error with context
    pub fn analysis(context: impl Into<String>, source: AnalysisErrorKind) -> Self {
        Self::Analysis {
            context: context.into(),
            source,
        }
    }

    /// Create an analysis error for an unreadable archive
    pub fn archive_read(archive: impl Into<String>, message: impl Into<String>) -> Self {
        let archive = archive.into();
        Self::analysis(
            format!("reading archive '{archive}'"),
            AnalysisErrorKind::ArchiveRead {
                archive,
                message: message.into(),
            },
        )
    }

    /// Create a check error
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Check {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            transform: transform.into(),
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ApiDriftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ApiDriftError {
    fn from(err: serde_json::Error) -> Self {
        Self::report(
            "JSON serialization",
            ReportErrorKind::Serialization(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    ///
    /// The closure is only called if the result is an error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ApiDriftError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ApiDriftError, new_ctx: &str) -> ApiDriftError {
    match err {
        ApiDriftError::Analysis {
            context: existing,
            source,
        } => ApiDriftError::Analysis {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiDriftError::Check { check, message } => ApiDriftError::Check {
            check,
            message: chain_context(new_ctx, &message),
        },
        ApiDriftError::Transform { transform, message } => ApiDriftError::Transform {
            transform,
            message: chain_context(new_ctx, &message),
        },
        ApiDriftError::Report {
            context: existing,
            source,
        } => ApiDriftError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiDriftError::Io {
            path,
            message,
            source,
        } => ApiDriftError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ApiDriftError::Config(msg) => ApiDriftError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to a configuration error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| ApiDriftError::Config(context.into()))
    }
}
