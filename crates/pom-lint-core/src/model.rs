//! Extracted views over a descriptor: its descriptive model, declared
//! properties and dependency declarations.

use crate::document::{Document, Node};
use crate::interpolate::{InterpolationError, Interpolator};
use std::fmt;

/// Parent coordinates of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parent {
    /// Parent groupId.
    pub group_id: Option<String>,
    /// Parent artifactId.
    pub artifact_id: Option<String>,
    /// Parent version.
    pub version: Option<String>,
}

/// A property declared under `/project/properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name (element name).
    pub name: String,
    /// Raw value.
    pub value: String,
    /// Declaration line.
    pub line: usize,
}

/// Descriptive fields of a descriptor, as declared.
///
/// Only flat containment is read; nothing is inherited beyond the
/// groupId/version fallback to the `<parent>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorModel {
    /// `modelVersion`.
    pub model_version: Option<String>,
    /// Declared groupId.
    pub group_id: Option<String>,
    /// Declared artifactId.
    pub artifact_id: Option<String>,
    /// Declared version.
    pub version: Option<String>,
    /// Packaging type.
    pub packaging: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Project URL.
    pub url: Option<String>,
    /// Parent coordinates, if a `<parent>` element exists.
    pub parent: Option<Parent>,
    /// Declared properties in declaration order.
    pub properties: Vec<Property>,
}

impl DescriptorModel {
    /// Extracts the model from a parsed document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let root = document.root();
        let text = |name: &str| root.child_text(name).map(|t| t.trim().to_string());

        let parent = root.child("parent").map(|p| Parent {
            group_id: p.child_text("groupId").map(|t| t.trim().to_string()),
            artifact_id: p.child_text("artifactId").map(|t| t.trim().to_string()),
            version: p.child_text("version").map(|t| t.trim().to_string()),
        });

        let properties = root
            .child("properties")
            .map(|props| {
                props
                    .children()
                    .map(|p| Property {
                        name: p.name().to_string(),
                        value: p.text_content(),
                        line: p.line(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            model_version: text("modelVersion"),
            group_id: text("groupId"),
            artifact_id: text("artifactId"),
            version: text("version"),
            packaging: text("packaging"),
            name: text("name"),
            description: text("description"),
            url: text("url"),
            parent,
            properties,
        }
    }

    /// Declared groupId, falling back to the parent's.
    #[must_use]
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.as_deref()))
    }

    /// Declared version, falling back to the parent's.
    #[must_use]
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    /// Value of a declared property. The last declaration wins.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// `groupId:artifactId` for log messages.
    #[must_use]
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}",
            self.effective_group_id().unwrap_or("?"),
            self.artifact_id.as_deref().unwrap_or("?")
        )
    }
}

/// One dependency-like entry extracted from a `<dependency>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// groupId.
    pub group_id: Option<String>,
    /// artifactId.
    pub artifact_id: Option<String>,
    /// Version, raw or interpolated (see [`Self::interpolated`]).
    pub version: Option<String>,
    /// Packaging type (`pom` for imported BOMs).
    pub type_: Option<String>,
    /// Scope.
    pub scope: Option<String>,
    /// Classifier.
    pub classifier: Option<String>,
    /// Line of the `<dependency>` element.
    pub line: usize,
}

impl DependencyDeclaration {
    /// Extracts a declaration from a `<dependency>` element.
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        Self {
            group_id: node.child_text("groupId"),
            artifact_id: node.child_text("artifactId"),
            version: node.child_text("version"),
            type_: node.child_text("type"),
            scope: node.child_text("scope"),
            classifier: node.child_text("classifier"),
            line: node.line(),
        }
    }

    /// The (groupId, artifactId) identity of this declaration.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (
            self.group_id.as_deref().unwrap_or(""),
            self.artifact_id.as_deref().unwrap_or(""),
        )
    }

    /// Returns a copy whose version has its placeholders resolved.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError`] if a placeholder cannot be resolved.
    pub fn interpolated(
        &self,
        interpolator: &Interpolator,
        model: &DescriptorModel,
    ) -> Result<Self, InterpolationError> {
        let version = match &self.version {
            Some(raw) => Some(interpolator.resolve(raw, model)?),
            None => None,
        };
        Ok(Self {
            version,
            ..self.clone()
        })
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (group, artifact) = self.key();
        write!(f, "{group}:{artifact}")?;
        if let Some(type_) = &self.type_ {
            write!(f, ":{type_}")?;
        }
        write!(f, ":{}", self.version.as_deref().unwrap_or("(no version)"))?;
        if let Some(scope) = &self.scope {
            write!(f, ":{scope}")?;
        }
        Ok(())
    }
}
