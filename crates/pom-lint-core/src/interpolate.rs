//! `${...}` placeholder resolution against a descriptor's own model.
//!
//! Values are looked up through a fixed chain of [`ValueSource`]s:
//!
//! 1. model fields, addressed as `${project.version}` (the bare
//!    `${version}` form is accepted too)
//! 2. declared properties
//!
//! Resolved values are expanded again, so properties may refer to other
//! properties.

use crate::model::{DescriptorModel, Property};

/// Prefix addressing model fields.
pub const MODEL_PREFIX: &str = "project.";

/// Errors raised while resolving placeholders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpolationError {
    /// No value source knows the expression.
    #[error("unresolved expression `${{{expression}}}`")]
    Unresolved {
        /// The expression between `${` and `}`.
        expression: String,
    },

    /// The expression refers back to itself.
    #[error("cyclic expression `${{{expression}}}` (via {})", chain.join(" -> "))]
    Cycle {
        /// The expression that closed the cycle.
        expression: String,
        /// Expressions being expanded when the cycle was found.
        chain: Vec<String>,
    },
}

/// A source of placeholder values.
pub trait ValueSource {
    /// Returns the value for an expression, if this source knows it.
    fn value(&self, expression: &str) -> Option<String>;
}

/// Resolves model fields such as `project.groupId` or `project.parent.version`.
#[derive(Debug)]
pub struct ModelValueSource<'a> {
    model: &'a DescriptorModel,
}

impl<'a> ModelValueSource<'a> {
    /// Creates a source over a model.
    #[must_use]
    pub fn new(model: &'a DescriptorModel) -> Self {
        Self { model }
    }
}

impl ValueSource for ModelValueSource<'_> {
    fn value(&self, expression: &str) -> Option<String> {
        let field = expression.strip_prefix(MODEL_PREFIX).unwrap_or(expression);
        let model = self.model;
        let parent = model.parent.as_ref();
        let value = match field {
            "modelVersion" => model.model_version.as_deref(),
            "groupId" => model.effective_group_id(),
            "artifactId" => model.artifact_id.as_deref(),
            "version" => model.effective_version(),
            "packaging" => model.packaging.as_deref(),
            "name" => model.name.as_deref(),
            "description" => model.description.as_deref(),
            "url" => model.url.as_deref(),
            "parent.groupId" => parent.and_then(|p| p.group_id.as_deref()),
            "parent.artifactId" => parent.and_then(|p| p.artifact_id.as_deref()),
            "parent.version" => parent.and_then(|p| p.version.as_deref()),
            _ => None,
        };
        value.map(str::to_string)
    }
}

/// Resolves declared properties; later declarations shadow earlier ones.
#[derive(Debug)]
pub struct PropertiesValueSource<'a> {
    properties: &'a [Property],
}

impl<'a> PropertiesValueSource<'a> {
    /// Creates a source over declared properties.
    #[must_use]
    pub fn new(properties: &'a [Property]) -> Self {
        Self { properties }
    }
}

impl ValueSource for PropertiesValueSource<'_> {
    fn value(&self, expression: &str) -> Option<String> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == expression)
            .map(|p| p.value.clone())
    }
}

/// Stateless placeholder interpolator.
///
/// Every [`resolve`](Self::resolve) call builds its own resolution state, so
/// nothing from a previous call can influence the next one.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpolator;

impl Interpolator {
    /// Creates a new interpolator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves every placeholder in `raw` against the model.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder is unknown to every value source or
    /// if expansion loops.
    pub fn resolve(
        &self,
        raw: &str,
        model: &DescriptorModel,
    ) -> Result<String, InterpolationError> {
        let model_source = ModelValueSource::new(model);
        let properties_source = PropertiesValueSource::new(&model.properties);
        let sources: [&dyn ValueSource; 2] = [&model_source, &properties_source];
        self.resolve_with(raw, &sources)
    }

    /// Resolves placeholders against an explicit source chain, first match wins.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn resolve_with(
        &self,
        raw: &str,
        sources: &[&dyn ValueSource],
    ) -> Result<String, InterpolationError> {
        let mut chain = Vec::new();
        expand(raw, sources, &mut chain)
    }
}

fn expand(
    raw: &str,
    sources: &[&dyn ValueSource],
    chain: &mut Vec<String>,
) -> Result<String, InterpolationError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder stays literal.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let expression = &after[..end];

        if chain.iter().any(|e| e == expression) {
            return Err(InterpolationError::Cycle {
                expression: expression.to_string(),
                chain: chain.clone(),
            });
        }

        let value = sources
            .iter()
            .find_map(|s| s.value(expression))
            .ok_or_else(|| InterpolationError::Unresolved {
                expression: expression.to_string(),
            })?;

        chain.push(expression.to_string());
        let expanded = expand(&value, sources, chain)?;
        chain.pop();

        out.push_str(&expanded);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
