//! Checker traits for defining descriptor checks and fixes.

use crate::catalog::CatalogLoadError;
use crate::context::{DocumentContext, ProjectContext};
use crate::document::{Document, ParseError};
use crate::edit::EditError;
use crate::types::{Severity, Violation};

/// Errors a checker can raise.
///
/// Findings are never errors; these are failures that make a check
/// impossible to complete.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The reference catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),

    /// A rewritten document does not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Edits could not be applied.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external delegate failed.
    #[error("delegate failed: {0}")]
    Delegate(Box<dyn std::error::Error + Send + Sync>),
}

/// When a checker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckScope {
    /// Once per descriptor.
    Document,
    /// Once per walk, after every descriptor has been indexed.
    Project,
}

impl std::fmt::Display for CheckScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// Output of a project-scope check.
#[derive(Debug, Default)]
pub struct ProjectFindings {
    /// Violations found.
    pub violations: Vec<Violation>,
    /// A message recorded instead of (or next to) violations.
    pub note: Option<String>,
}

impl ProjectFindings {
    /// Findings holding only violations.
    #[must_use]
    pub fn violations(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            note: None,
        }
    }

    /// Findings holding only a note.
    #[must_use]
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            violations: Vec::new(),
            note: Some(note.into()),
        }
    }
}

/// A descriptor check.
///
/// Document-scope checkers implement [`check`](Self::check); project-scope
/// checkers implement [`check_project`](Self::check_project). A checker
/// that can also correct what it reports returns itself from
/// [`as_fixer`](Self::as_fixer).
///
/// # Example
///
/// ```ignore
/// use pom_lint_core::{Checker, CheckError, DocumentContext, Violation};
///
/// pub struct RequireName;
///
/// impl Checker for RequireName {
///     fn name(&self) -> &'static str { "require-name" }
///     fn code(&self) -> &'static str { "PL900" }
///
///     fn check(&self, ctx: &DocumentContext<'_>) -> Result<Vec<Violation>, CheckError> {
///         if ctx.model().name.is_some() {
///             return Ok(vec![]);
///         }
///         Ok(vec![ctx.violation(self, 1, "Descriptor has no <name>")])
///     }
/// }
/// ```
pub trait Checker: Send + Sync {
    /// Returns the unique kebab-case name (e.g., "duplicate-dependency").
    fn name(&self) -> &'static str;

    /// Returns the checker code (e.g., "PL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this checker reports.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this checker.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Returns when this checker runs.
    fn scope(&self) -> CheckScope {
        CheckScope::Document
    }

    /// Checks a single descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot complete.
    fn check(&self, _ctx: &DocumentContext<'_>) -> Result<Vec<Violation>, CheckError> {
        Ok(Vec::new())
    }

    /// Checks the whole walk.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot complete.
    fn check_project(&self, _ctx: &ProjectContext<'_>) -> Result<ProjectFindings, CheckError> {
        Ok(ProjectFindings::default())
    }

    /// Returns the fixing side of this checker, if it has one.
    fn as_fixer(&self) -> Option<&dyn Fixer> {
        None
    }
}

/// A checker that can rewrite descriptors.
pub trait Fixer: Checker {
    /// Returns a corrected document, or `None` when nothing needs fixing.
    ///
    /// The input document is never modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite cannot be produced.
    fn rewrite(&self, ctx: &DocumentContext<'_>) -> Result<Option<Document>, CheckError>;
}

/// Type alias for boxed Checker trait objects.
pub type CheckerBox = Box<dyn Checker>;
