//! Fixtures for checker unit tests.

use pom_lint_core::{
    Checker, Config, Descriptor, Document, DocumentContext, Fixer, PassContext, ProjectContext,
    ProjectFindings, PropertyUsageIndex, Violation,
};
use std::path::Path;

const ROOT: &str = "/ws";

/// A set of in-memory descriptors with the state of one walk.
pub(crate) struct Fixture {
    config: Config,
    descriptors: Vec<Descriptor>,
    usage: PropertyUsageIndex,
    recommended_version: Option<String>,
}

impl Fixture {
    /// Parses `(relative path, text)` pairs under a fixed root.
    pub(crate) fn new(documents: &[(&str, &str)]) -> Self {
        let root = Path::new(ROOT);
        let descriptors: Vec<Descriptor> = documents
            .iter()
            .map(|(path, text)| {
                let document =
                    Document::parse(root.join(path), *text).expect("fixture should parse");
                Descriptor::new(document, root)
            })
            .collect();
        let mut usage = PropertyUsageIndex::new();
        for d in &descriptors {
            usage.index(&d.relative_path, &d.document);
        }
        Self {
            config: Config::default(),
            descriptors,
            usage,
            recommended_version: None,
        }
    }

    /// A single `pom.xml`.
    pub(crate) fn single(text: &str) -> Self {
        Self::new(&[("pom.xml", text)])
    }

    pub(crate) fn config(mut self, toml: &str) -> Self {
        self.config = Config::parse(toml).expect("fixture config should parse");
        self
    }

    pub(crate) fn recommended_version(mut self, version: &str) -> Self {
        self.recommended_version = Some(version.to_string());
        self
    }

    fn pass(&self) -> PassContext<'_> {
        PassContext {
            root: Path::new(ROOT),
            config: &self.config,
            usage: &self.usage,
            recommended_version: self.recommended_version.as_deref(),
        }
    }

    /// Runs a document-scope check over every descriptor.
    pub(crate) fn check(&self, checker: &dyn Checker) -> Vec<Violation> {
        let pass = self.pass();
        self.descriptors
            .iter()
            .flat_map(|d| {
                checker
                    .check(&DocumentContext::new(d, &pass))
                    .expect("check should succeed")
            })
            .collect()
    }

    /// Runs a project-scope check.
    pub(crate) fn check_project(&self, checker: &dyn Checker) -> ProjectFindings {
        let pass = self.pass();
        checker
            .check_project(&ProjectContext::new(&self.descriptors, &pass))
            .expect("project check should succeed")
    }

    /// Rewrites the descriptor at `index`, returning its new text.
    pub(crate) fn rewrite(&self, fixer: &dyn Fixer, index: usize) -> Option<String> {
        let pass = self.pass();
        fixer
            .rewrite(&DocumentContext::new(&self.descriptors[index], &pass))
            .expect("rewrite should succeed")
            .map(|d| d.text().to_string())
    }
}
