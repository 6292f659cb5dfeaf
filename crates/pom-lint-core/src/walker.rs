//! Walk orchestrator applying checkers and fixers to a set of descriptors.

use crate::checker::{CheckError, CheckScope, Checker, CheckerBox};
use crate::config::Config;
use crate::context::{module_name, Descriptor, DocumentContext, PassContext, ProjectContext};
use crate::document::{Document, DocumentError, ParseError};
use crate::types::{FixReport, LintResult, Violation};
use crate::usage::PropertyUsageIndex;

use miette::Diagnostic;
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on fix passes over the whole descriptor set.
const MAX_FIX_PASSES: usize = 8;

/// Stage of per-document processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Running a check.
    Check,
    /// Running a rewrite.
    Rewrite,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Check => write!(f, "check"),
            Self::Rewrite => write!(f, "rewrite"),
        }
    }
}

/// Errors that abort a walk.
///
/// A walk that fails returns no partial result.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// The walk root could not be resolved.
    #[error("cannot resolve walk root {}: {source}", path.display())]
    #[diagnostic(code(pom_lint::root))]
    Root {
        /// Requested root.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A descriptor could not be read.
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(code(pom_lint::read))]
    Read {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A descriptor is malformed.
    #[error(transparent)]
    #[diagnostic(
        code(pom_lint::parse),
        help("fix the markup of this descriptor and run again")
    )]
    Parse(#[from] ParseError),

    /// A checker or fixer failed on a descriptor.
    #[error("{checker} failed during {stage} of {}: {source}", path.display())]
    #[diagnostic(code(pom_lint::check))]
    Check {
        /// Descriptor path.
        path: PathBuf,
        /// Checker name.
        checker: String,
        /// Failing stage.
        stage: Stage,
        /// Underlying error.
        source: CheckError,
    },

    /// A rewritten descriptor could not be written back.
    #[error("failed to write {}: {source}", path.display())]
    #[diagnostic(code(pom_lint::write))]
    Write {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A project-scope checker failed.
    #[error("{checker} failed during the project pass: {source}")]
    #[diagnostic(code(pom_lint::project))]
    Project {
        /// Checker name.
        checker: String,
        /// Underlying error.
        source: CheckError,
    },

    /// The parsing pool could not be created.
    #[error("failed to build parser pool: {0}")]
    #[diagnostic(code(pom_lint::pool))]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring a [`Walker`].
#[derive(Default)]
pub struct WalkerBuilder {
    root: Option<PathBuf>,
    checkers: Vec<CheckerBox>,
    config: Option<Config>,
    ignored_modules: Vec<String>,
    recommended_version: Option<String>,
    parallelism: Option<usize>,
}

impl WalkerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the walk root; violation paths are relative to it.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a checker.
    #[must_use]
    pub fn checker<C: Checker + 'static>(mut self, checker: C) -> Self {
        self.checkers.push(Box::new(checker));
        self
    }

    /// Adds a boxed checker.
    #[must_use]
    pub fn checker_box(mut self, checker: CheckerBox) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Adds several boxed checkers.
    #[must_use]
    pub fn checkers(mut self, checkers: impl IntoIterator<Item = CheckerBox>) -> Self {
        self.checkers.extend(checkers);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a module directory name that is never walked.
    #[must_use]
    pub fn ignore_module(mut self, module: impl Into<String>) -> Self {
        self.ignored_modules.push(module.into());
        self
    }

    /// Adds several ignored module names.
    #[must_use]
    pub fn ignore_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_modules
            .extend(modules.into_iter().map(Into::into));
        self
    }

    /// Sets the version that replaces the catalog's recommended version.
    #[must_use]
    pub fn recommended_version(mut self, version: Option<String>) -> Self {
        self.recommended_version = version;
        self
    }

    /// Bounds the number of descriptors parsed in parallel.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the walker.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative root cannot be made absolute.
    pub fn build(self) -> Result<Walker, EngineError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|source| EngineError::Root {
                    path: root.clone(),
                    source,
                })?
                .join(&root)
        };

        let config = self.config.unwrap_or_default();

        let mut ignored_modules: HashSet<String> = self.ignored_modules.into_iter().collect();
        ignored_modules.extend(config.walker.ignored_modules.iter().cloned());

        let parallelism = self.parallelism.or(config.walker.parallelism);

        Ok(Walker {
            root,
            checkers: self.checkers,
            config,
            ignored_modules,
            recommended_version: self.recommended_version,
            parallelism,
        })
    }
}

/// Applies checkers (check mode) or fixers (fix mode) to descriptors.
///
/// Use [`Walker::builder()`] to construct an instance. Every walk builds its
/// own property usage index; nothing is carried over between walks.
pub struct Walker {
    root: PathBuf,
    checkers: Vec<CheckerBox>,
    config: Config,
    ignored_modules: HashSet<String>,
    recommended_version: Option<String>,
    parallelism: Option<usize>,
}

impl Walker {
    /// Creates a new builder for configuring a walker.
    #[must_use]
    pub fn builder() -> WalkerBuilder {
        WalkerBuilder::new()
    }

    /// Returns the walk root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn checker_count(&self) -> usize {
        self.checkers.len()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks descriptors in the given order.
    ///
    /// # Errors
    ///
    /// Returns the first read, parse or checker failure; no violations are
    /// returned in that case.
    pub fn check(&self, paths: &[PathBuf]) -> Result<LintResult, EngineError> {
        info!("Checking {} descriptors under {:?}", paths.len(), self.root);

        let descriptors = self.load(paths)?;
        let usage = index(&descriptors);
        let pass = self.pass(&usage);
        let mut result = LintResult::new();

        for descriptor in &descriptors {
            debug!("Checking: {}", descriptor.relative_path.display());
            let ctx = DocumentContext::new(descriptor, &pass);

            for checker in self.active(CheckScope::Document) {
                if self.is_suppressed(checker.as_ref(), &ctx) {
                    continue;
                }
                let violations = checker.check(&ctx).map_err(|source| EngineError::Check {
                    path: descriptor.document.path().to_path_buf(),
                    checker: checker.name().to_string(),
                    stage: Stage::Check,
                    source,
                })?;
                for violation in self.apply_severity_override(checker.name(), violations) {
                    result.add(violation);
                }
            }
            result.documents_checked += 1;
        }

        let project = ProjectContext::new(&descriptors, &pass);
        for checker in self.active(CheckScope::Project) {
            debug!("Running project checker: {}", checker.name());
            let findings = checker
                .check_project(&project)
                .map_err(|source| EngineError::Project {
                    checker: checker.name().to_string(),
                    source,
                })?;
            for violation in self.apply_severity_override(checker.name(), findings.violations) {
                result.add(violation);
            }
            if let Some(note) = findings.note {
                info!("{}: {}", checker.name(), note);
                result.add_note(checker.name(), note);
            }
        }

        info!(
            "Check complete: {} violations in {} descriptors",
            result.total_count(),
            result.documents_checked
        );

        Ok(result)
    }

    /// Rewrites descriptors in the given order with every active fixer.
    ///
    /// Fixers run in registration order, each on the output of the previous
    /// one. Passes repeat over the rewritten descriptors, with a fresh usage
    /// index, until a pass changes nothing. Writes happen only after every
    /// pass succeeded; each changed descriptor is written once, atomically.
    ///
    /// # Errors
    ///
    /// Returns the first read, parse, rewrite or write failure. A read, parse
    /// or rewrite failure leaves every descriptor on disk untouched.
    pub fn fix(&self, paths: &[PathBuf]) -> Result<FixReport, EngineError> {
        info!("Fixing {} descriptors under {:?}", paths.len(), self.root);

        let original = self.load(paths)?;
        let fixers: Vec<&CheckerBox> = self
            .checkers
            .iter()
            .filter(|c| c.as_fixer().is_some() && self.is_enabled(c.as_ref()))
            .collect();

        let mut working = original.clone();
        for round in 1..=MAX_FIX_PASSES {
            let usage = index(&working);
            let pass = self.pass(&usage);
            let mut changed = false;
            let mut next = Vec::with_capacity(working.len());

            for descriptor in &working {
                debug!("Fixing (pass {}): {}", round, descriptor.relative_path.display());
                match self.rewrite(descriptor, &fixers, &pass)? {
                    Some(fixed) => {
                        changed = true;
                        next.push(fixed);
                    }
                    None => next.push(descriptor.clone()),
                }
            }

            working = next;
            if !changed {
                break;
            }
            if round == MAX_FIX_PASSES {
                warn!("Fixers still changing descriptors after {} passes", round);
            }
        }

        let mut staged = Vec::new();
        let mut report = FixReport::default();
        for (before, after) in original.iter().zip(&working) {
            report.documents_processed += 1;
            if before.document.text() == after.document.text() {
                continue;
            }
            let path = before.document.path();
            let file = stage(path, after.document.text()).map_err(|source| EngineError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            staged.push((before, file));
        }

        for (descriptor, file) in staged {
            let path = descriptor.document.path();
            file.persist(path).map_err(|e| EngineError::Write {
                path: path.to_path_buf(),
                source: e.error,
            })?;
            info!("Rewrote {}", descriptor.relative_path.display());
            report.changed.push(descriptor.relative_path.clone());
        }

        info!(
            "Fix complete: {} of {} descriptors rewritten",
            report.changed.len(),
            report.documents_processed
        );

        Ok(report)
    }

    /// Runs the fixer chain over one descriptor; `None` when nothing changed.
    fn rewrite(
        &self,
        descriptor: &Descriptor,
        fixers: &[&CheckerBox],
        pass: &PassContext<'_>,
    ) -> Result<Option<Descriptor>, EngineError> {
        let mut current: Option<Descriptor> = None;

        for checker in fixers.iter().copied() {
            let Some(fixer) = checker.as_fixer() else {
                continue;
            };
            let target = current.as_ref().unwrap_or(descriptor);
            let ctx = DocumentContext::new(target, pass);
            if self.is_suppressed(checker.as_ref(), &ctx) {
                continue;
            }
            let rewritten = fixer.rewrite(&ctx).map_err(|source| EngineError::Check {
                path: descriptor.document.path().to_path_buf(),
                checker: checker.name().to_string(),
                stage: Stage::Rewrite,
                source,
            })?;
            if let Some(document) = rewritten {
                current = Some(target.with_document(document));
            }
        }

        Ok(current.filter(|fixed| fixed.document.text() != descriptor.document.text()))
    }

    /// Reads and parses descriptors, keeping input order.
    fn load(&self, paths: &[PathBuf]) -> Result<Vec<Descriptor>, EngineError> {
        let walked: Vec<&PathBuf> = paths
            .iter()
            .filter(|path| !self.is_ignored_module(path))
            .collect();

        let parse = || -> Vec<Result<Document, EngineError>> {
            walked.par_iter().map(|path| read(path)).collect()
        };
        let parsed = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(parse),
            None => parse(),
        };

        // The first failure in input order wins, regardless of which thread
        // finished first.
        parsed
            .into_iter()
            .map(|document| document.map(|d| Descriptor::new(d, &self.root)))
            .collect()
    }

    fn is_ignored_module(&self, path: &Path) -> bool {
        match module_name(path) {
            Some(module) if self.ignored_modules.contains(module) => {
                debug!("Skipping ignored module {}: {}", module, path.display());
                true
            }
            _ => false,
        }
    }

    fn pass<'a>(&'a self, usage: &'a PropertyUsageIndex) -> PassContext<'a> {
        PassContext {
            root: &self.root,
            config: &self.config,
            usage,
            recommended_version: self.recommended_version.as_deref(),
        }
    }

    fn active(&self, scope: CheckScope) -> impl Iterator<Item = &CheckerBox> {
        self.checkers
            .iter()
            .filter(move |c| c.scope() == scope && self.is_enabled(c.as_ref()))
    }

    fn is_enabled(&self, checker: &dyn Checker) -> bool {
        let enabled = self.config.is_checker_enabled(checker.name());
        if !enabled {
            debug!("Skipping disabled checker: {}", checker.name());
        }
        enabled
    }

    fn is_suppressed(&self, checker: &dyn Checker, ctx: &DocumentContext<'_>) -> bool {
        let suppressed = ctx.rules.is_checker_ignored(checker.name());
        if suppressed {
            warn!(
                "Skipping {} for {}",
                checker.name(),
                ctx.model().coordinates()
            );
        }
        suppressed
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        checker_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.checker_severity(checker_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }
}

fn read(path: &Path) -> Result<Document, EngineError> {
    Document::from_file(path).map_err(|e| match e {
        DocumentError::Io { path, source } => EngineError::Read { path, source },
        DocumentError::Parse(e) => EngineError::Parse(e),
    })
}

fn index(descriptors: &[Descriptor]) -> PropertyUsageIndex {
    let mut usage = PropertyUsageIndex::new();
    for descriptor in descriptors {
        usage.index(&descriptor.relative_path, &descriptor.document);
    }
    usage
}

/// Writes `text` to a temporary file beside `path`, ready to be renamed over it.
fn stage(path: &Path, text: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let walker = Walker::builder()
            .root(".")
            .ignore_module("legacy")
            .build()
            .expect("Failed to build walker");

        assert!(walker.root().is_absolute());
        assert_eq!(walker.checker_count(), 0);
    }

    #[test]
    fn test_ignored_modules_merge_config() {
        let config = Config::parse(
            r#"
[walker]
ignored_modules = ["from-config"]
"#,
        )
        .expect("config should parse");
        let walker = Walker::builder()
            .root("/r")
            .config(config)
            .ignore_module("from-builder")
            .build()
            .expect("Failed to build walker");

        assert!(walker.is_ignored_module(Path::new("/r/from-config/pom.xml")));
        assert!(walker.is_ignored_module(Path::new("/r/from-builder/pom.xml")));
        assert!(!walker.is_ignored_module(Path::new("/r/kept/pom.xml")));
    }

    #[test]
    fn test_staged_file_replaces_content_on_persist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pom.xml");
        std::fs::write(&path, "<project/>").expect("write");
        let staged = stage(&path, "<project></project>").expect("stage");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "<project/>");
        staged.persist(&path).expect("persist");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "<project></project>"
        );
    }

    #[test]
    fn test_empty_walk() {
        let walker = Walker::builder().root("/r").build().expect("walker");
        let result = walker.check(&[]).expect("empty walk");
        assert_eq!(result.documents_checked, 0);
        assert!(result.is_clean());
    }
}
