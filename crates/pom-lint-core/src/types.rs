//! Core types for lint violations and results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Location of a violation inside a descriptor or linted file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the walk root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A lint violation found during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Checker code (e.g., "PL001").
    pub code: String,
    /// Checker name (e.g., "duplicate-dependency").
    pub checker: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Where the violation was found.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        checker: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            checker: checker.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}\n",
            self.code,
            self.checker,
            self.location.file.display(),
            self.location.line,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// A message recorded by a checker instead of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerNote {
    /// Checker name.
    pub checker: String,
    /// The message.
    pub message: String,
}

/// Aggregated result of a check walk.
///
/// Violations are grouped by document path; paths iterate in sorted order and
/// violations keep their insertion order within a path.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Violations keyed by document path.
    pub violations: BTreeMap<PathBuf, Vec<Violation>>,
    /// Number of documents processed.
    pub documents_checked: usize,
    /// Messages recorded by checkers that did not run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<CheckerNote>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a violation under its location's file.
    pub fn add(&mut self, violation: Violation) {
        self.violations
            .entry(violation.location.file.clone())
            .or_default()
            .push(violation);
    }

    /// Records a checker note.
    pub fn add_note(&mut self, checker: impl Into<String>, message: impl Into<String>) {
        self.notes.push(CheckerNote {
            checker: checker.into(),
            message: message.into(),
        });
    }

    /// Total number of violations.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    /// Returns true if no violation was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_count() == 0
    }

    /// Violations for one document.
    #[must_use]
    pub fn for_document(&self, path: &Path) -> &[Violation] {
        self.violations.get(path).map_or(&[], Vec::as_slice)
    }

    /// Iterates over all violations, by sorted path then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.values().flatten()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.iter().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.iter().filter(|v| v.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }
}

/// Result of a fix walk.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FixReport {
    /// Number of documents processed.
    pub documents_processed: usize,
    /// Documents whose text was rewritten, in walk order.
    pub changed: Vec<PathBuf>,
}

impl FixReport {
    /// Returns true if nothing needed fixing.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}
