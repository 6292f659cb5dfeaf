//! Context types for checker execution.

use crate::checker::Checker;
use crate::config::{CheckerConfig, Config, GroupRules};
use crate::document::Document;
use crate::model::DescriptorModel;
use crate::types::{Location, Violation};
use crate::usage::PropertyUsageIndex;
use std::path::{Path, PathBuf};

/// Path, relative to the walk root, of the aggregating descriptor.
pub const ROOT_DESCRIPTOR: &str = "pom.xml";

/// A parsed descriptor together with its descriptive model.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// The position-tracked document.
    pub document: Document,
    /// Fields extracted from the document.
    pub model: DescriptorModel,
    /// Path relative to the walk root.
    pub relative_path: PathBuf,
}

impl Descriptor {
    /// Wraps a document, computing its model and root-relative path.
    #[must_use]
    pub fn new(document: Document, root: &Path) -> Self {
        let relative_path = document
            .path()
            .strip_prefix(root)
            .map_or_else(|_| document.path().to_path_buf(), Path::to_path_buf);
        let model = DescriptorModel::from_document(&document);
        Self {
            document,
            model,
            relative_path,
        }
    }

    /// Replaces the document, keeping the relative path.
    #[must_use]
    pub fn with_document(&self, document: Document) -> Self {
        Self {
            model: DescriptorModel::from_document(&document),
            document,
            relative_path: self.relative_path.clone(),
        }
    }

    /// The effective groupId.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.model.effective_group_id()
    }

    /// Name of the module directory holding this descriptor.
    #[must_use]
    pub fn module_name(&self) -> Option<&str> {
        module_name(self.document.path())
    }
}

/// Name of the directory containing a descriptor path.
#[must_use]
pub fn module_name(path: &Path) -> Option<&str> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
}

/// State shared by every checker during one walk.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// Walk root.
    pub root: &'a Path,
    /// Active configuration.
    pub config: &'a Config,
    /// Declarations and usages of every walked descriptor.
    pub usage: &'a PropertyUsageIndex,
    /// Version that overrides the catalog's recommended version.
    pub recommended_version: Option<&'a str>,
}

impl PassContext<'_> {
    /// Options of a checker, if configured.
    #[must_use]
    pub fn checker_config(&self, name: &str) -> Option<&CheckerConfig> {
        self.config.checker(name)
    }
}

/// Context provided to per-document checks and rewrites.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    /// The descriptor being processed.
    pub descriptor: &'a Descriptor,
    /// Rules of the descriptor's group.
    pub rules: &'a GroupRules,
    /// Walk-wide state.
    pub pass: &'a PassContext<'a>,
}

impl<'a> DocumentContext<'a> {
    /// Creates a context for a descriptor, resolving its group rules.
    #[must_use]
    pub fn new(descriptor: &'a Descriptor, pass: &'a PassContext<'a>) -> Self {
        Self {
            descriptor,
            rules: pass.config.rules_for(descriptor.group_id()),
            pass,
        }
    }

    /// The document being processed.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        &self.descriptor.document
    }

    /// The document's model.
    #[must_use]
    pub fn model(&self) -> &'a DescriptorModel {
        &self.descriptor.model
    }

    /// Location of a line in this document.
    #[must_use]
    pub fn location(&self, line: usize) -> Location {
        Location::new(self.descriptor.relative_path.clone(), line)
    }

    /// Creates a violation of `checker` at `line` with its default severity.
    #[must_use]
    pub fn violation(
        &self,
        checker: &dyn Checker,
        line: usize,
        message: impl Into<String>,
    ) -> Violation {
        Violation::new(
            checker.code(),
            checker.name(),
            checker.default_severity(),
            self.location(line),
            message,
        )
    }
}

/// Context provided to project-scope checks.
#[derive(Debug, Clone, Copy)]
pub struct ProjectContext<'a> {
    /// Every processed descriptor, in walk order.
    pub descriptors: &'a [Descriptor],
    /// The descriptor at the walk root, or the first one when there is none.
    pub root: Option<&'a Descriptor>,
    /// Rules of the root descriptor's group.
    pub root_rules: &'a GroupRules,
    /// Walk-wide state.
    pub pass: &'a PassContext<'a>,
}

impl<'a> ProjectContext<'a> {
    /// Creates a project context.
    ///
    /// The root descriptor is the one at `pom.xml` relative to the walk root,
    /// whatever its position in the walk order.
    #[must_use]
    pub fn new(descriptors: &'a [Descriptor], pass: &'a PassContext<'a>) -> Self {
        let root = descriptors
            .iter()
            .find(|d| d.relative_path == Path::new(ROOT_DESCRIPTOR))
            .or_else(|| descriptors.first());
        Self {
            descriptors,
            root,
            root_rules: pass.config.rules_for(root.and_then(Descriptor::group_id)),
            pass,
        }
    }

    /// Finds a descriptor by its root-relative path.
    #[must_use]
    pub fn descriptor(&self, relative_path: &Path) -> Option<&'a Descriptor> {
        self.descriptors
            .iter()
            .find(|d| d.relative_path == relative_path)
    }

    /// Rules of a descriptor's group.
    #[must_use]
    pub fn rules_for(&self, descriptor: &Descriptor) -> &'a GroupRules {
        self.pass.config.rules_for(descriptor.group_id())
    }
}
