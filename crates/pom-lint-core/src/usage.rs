//! Cross-document index of declared and used properties.

use crate::document::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Whole-text placeholder pattern. Only an element whose entire text content
/// matches counts as a use; `${a}-x` does not use `a`.
#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\{[A-Za-z0-9_]+(.[A-Za-z0-9_]+)*(-[A-Za-z0-9_]+)*\}$")
        .expect("placeholder pattern is valid")
});

/// Where a property is declared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeclarationSite {
    /// Declaring document, relative to the walk root.
    pub document: PathBuf,
    /// Declaration line.
    pub line: usize,
}

/// Declared property names and referenced names across a set of documents.
///
/// Built fresh for every walk.
#[derive(Debug, Default, Clone)]
pub struct PropertyUsageIndex {
    declared: BTreeMap<String, Vec<DeclarationSite>>,
    used: HashSet<String>,
}

impl PropertyUsageIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the declarations and usages of one document.
    pub fn index(&mut self, relative_path: &Path, document: &Document) {
        for property in document.select(&["project", "properties", "*"]) {
            self.declared
                .entry(property.name().to_string())
                .or_default()
                .push(DeclarationSite {
                    document: relative_path.to_path_buf(),
                    line: property.line(),
                });
        }

        for node in document.descendants() {
            if let Some(name) = used_property(&node.text_content()) {
                self.used.insert(name);
            }
        }
    }

    /// Whether a property name is referenced anywhere.
    #[must_use]
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Declaration sites of a property, in indexing order.
    #[must_use]
    pub fn declarations(&self, name: &str) -> &[DeclarationSite] {
        self.declared.get(name).map_or(&[], Vec::as_slice)
    }

    /// All declared names with their sites, sorted by name.
    pub fn declared(&self) -> impl Iterator<Item = (&str, &[DeclarationSite])> {
        self.declared
            .iter()
            .map(|(name, sites)| (name.as_str(), sites.as_slice()))
    }

    /// Declared names that are never referenced.
    pub fn unused(&self) -> impl Iterator<Item = (&str, &[DeclarationSite])> {
        self.declared().filter(|(name, _)| !self.is_used(name))
    }

    /// Number of distinct referenced names.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used.len()
    }
}

/// Returns the referenced property name if `text` is exactly one placeholder.
#[must_use]
pub fn used_property(text: &str) -> Option<String> {
    PLACEHOLDER
        .is_match(text)
        .then(|| text.chars().filter(|c| !matches!(c, '$' | '{' | '}')).collect())
}
