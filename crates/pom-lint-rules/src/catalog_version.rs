//! Checker pinning managed dependencies to the sanctioned catalog.
//!
//! Every `/project/dependencyManagement/dependencies/dependency` is looked
//! up in the catalog by exact (groupId, artifactId):
//!
//! - no entry, and the group is not exempt: the dependency is not from the
//!   catalog
//! - an entry: the interpolated version must equal the recommended version
//!   (or the walk's override) exactly
//!
//! A version that cannot be interpolated is reported as a warning and is
//! never compared.
//!
//! # Fix
//!
//! A literal version is replaced. A version that is exactly `${name}`, with
//! `name` declared in the same descriptor, has that property's value
//! replaced instead. Other forms are left alone.

use pom_lint_core::{
    used_property, CatalogSource, CheckError, Checker, DependencyDeclaration, Document,
    DocumentContext, Fixer, InterpolationError, Interpolator, Node, Severity, Suggestion, TextEdit,
    Violation,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Checker code for catalog-version.
pub const CODE: &str = "PL003";

/// Checker name for catalog-version.
pub const NAME: &str = "catalog-version";

/// Group whose managed dependencies never need a catalog entry.
pub const EXEMPT_GROUP: &str = "org.jboss.as.quickstarts";

/// Compares managed dependencies against the catalog.
pub struct CatalogVersion {
    catalog: Arc<dyn CatalogSource>,
    exempt_groups: Vec<String>,
    interpolator: Interpolator,
}

impl CatalogVersion {
    /// Creates a checker reading from `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            exempt_groups: vec![EXEMPT_GROUP.to_string()],
            interpolator: Interpolator::new(),
        }
    }

    /// Adds a group exempt from the catalog requirement.
    #[must_use]
    pub fn exempt_group(mut self, group: impl Into<String>) -> Self {
        self.exempt_groups.push(group.into());
        self
    }

    fn is_exempt(&self, group: &str) -> bool {
        self.exempt_groups.iter().any(|g| g == group)
    }

    fn inspect<'a>(&self, ctx: &DocumentContext<'a>) -> Result<Vec<Finding<'a>>, CheckError> {
        let catalog = self.catalog.catalog()?;
        let mut findings = Vec::new();

        let managed = ctx
            .document()
            .select(&["project", "dependencyManagement", "dependencies", "dependency"]);
        for node in managed {
            let declaration = match DependencyDeclaration::from_node(node)
                .interpolated(&self.interpolator, ctx.model())
            {
                Ok(declaration) => declaration,
                Err(error) => {
                    warn!(
                        "{}:{}: cannot resolve managed dependency version: {}",
                        ctx.descriptor.relative_path.display(),
                        node.line(),
                        error
                    );
                    findings.push(Finding::Unresolved {
                        node,
                        declaration: DependencyDeclaration::from_node(node),
                        error,
                    });
                    continue;
                }
            };

            let (group, artifact) = declaration.key();
            match catalog.find(group, artifact) {
                None if self.is_exempt(group) => {
                    debug!("{group}:{artifact} is exempt from the catalog");
                }
                None => findings.push(Finding::NotInCatalog { node, declaration }),
                Some(entry) => {
                    let recommended = ctx
                        .pass
                        .recommended_version
                        .unwrap_or(&entry.recommended_version);
                    if declaration.version.as_deref() != Some(recommended) {
                        findings.push(Finding::WrongVersion {
                            node,
                            declaration,
                            recommended: recommended.to_string(),
                        });
                    }
                }
            }
        }
        Ok(findings)
    }
}

enum Finding<'a> {
    NotInCatalog {
        node: &'a Node,
        declaration: DependencyDeclaration,
    },
    WrongVersion {
        node: &'a Node,
        declaration: DependencyDeclaration,
        recommended: String,
    },
    Unresolved {
        node: &'a Node,
        declaration: DependencyDeclaration,
        error: InterpolationError,
    },
}

impl Checker for CatalogVersion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires managed dependencies to come from the catalog at the recommended version"
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Result<Vec<Violation>, CheckError> {
        let violations = self
            .inspect(ctx)?
            .into_iter()
            .map(|finding| match finding {
                Finding::NotInCatalog { node, declaration } => ctx.violation(
                    self,
                    node.line(),
                    format!("{declaration} isn't from the sanctioned catalog"),
                ),
                Finding::WrongVersion {
                    node,
                    declaration,
                    recommended,
                } => ctx
                    .violation(
                        self,
                        node.line(),
                        format!(
                            "BOM {declaration} isn't using the recommended version {recommended}"
                        ),
                    )
                    .with_suggestion(Suggestion::new(format!("Use version {recommended}"))),
                Finding::Unresolved {
                    node,
                    declaration,
                    error,
                } => {
                    let (group, artifact) = declaration.key();
                    let mut violation = ctx.violation(
                        self,
                        node.line(),
                        format!("Version of {group}:{artifact} could not be resolved: {error}"),
                    );
                    violation.severity = Severity::Warning;
                    violation
                }
            })
            .collect();
        Ok(violations)
    }

    fn as_fixer(&self) -> Option<&dyn Fixer> {
        Some(self)
    }
}

impl Fixer for CatalogVersion {
    fn rewrite(&self, ctx: &DocumentContext<'_>) -> Result<Option<Document>, CheckError> {
        let document = ctx.document();
        let mut edits = Vec::new();
        let mut touched: HashSet<usize> = HashSet::new();

        for finding in self.inspect(ctx)? {
            let Finding::WrongVersion {
                node,
                declaration,
                recommended,
            } = finding
            else {
                continue;
            };
            let Some(version) = node.child("version") else {
                debug!("{declaration} has no version element to fix");
                continue;
            };
            let Some(target) = version_target(document, version) else {
                warn!(
                    "{}:{}: leaving version expression of {} unchanged",
                    ctx.descriptor.relative_path.display(),
                    version.line(),
                    declaration
                );
                continue;
            };
            if touched.insert(target.range().start) {
                edits.push(TextEdit::set_text(target, &recommended));
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }
        Ok(Some(document.apply_edits(edits)?))
    }
}

/// The element whose text holds the effective literal version.
fn version_target<'a>(document: &'a Document, version: &'a Node) -> Option<&'a Node> {
    let raw = version.text_content();
    let raw = raw.trim();
    if !raw.contains("${") {
        return Some(version);
    }
    let name = used_property(raw)?;
    // Last declaration wins, as in interpolation.
    document
        .select(&["project", "properties", name.as_str()])
        .into_iter()
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use pom_lint_core::{Catalog, StaticCatalog};

    const CATALOG: &str = r"
availableBoms:
  - id: jboss-javaee6-with-tools
    groupId: org.jboss.bom
    artifactId: jboss-javaee-6.0-with-tools
    recommendedVersion: 1.0.0
    availableVersions: [0.9.0, 1.0.0]
";

    fn checker() -> CatalogVersion {
        let catalog = Catalog::from_yaml(CATALOG).expect("catalog fixture should parse");
        CatalogVersion::new(Arc::new(StaticCatalog::new(catalog)))
    }

    fn pom(group: &str, artifact: &str, version: &str, properties: &str) -> String {
        format!(
            r"<project>
  <groupId>org.example</groupId>
  <version>2.0</version>
  <properties>{properties}</properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>{group}</groupId>
        <artifactId>{artifact}</artifactId>
        <version>{version}</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>
"
        )
    }

    fn bom(version: &str) -> String {
        pom("org.jboss.bom", "jboss-javaee-6.0-with-tools", version, "")
    }

    #[test]
    fn test_recommended_version_passes() {
        assert!(Fixture::single(&bom("1.0.0")).check(&checker()).is_empty());
    }

    #[test]
    fn test_wrong_version_names_both() {
        let violations = Fixture::single(&bom("0.9.0")).check(&checker());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 7);
        assert!(violations[0].message.contains("0.9.0"), "{}", violations[0].message);
        assert!(violations[0].message.contains("1.0.0"), "{}", violations[0].message);
        assert!(violations[0].message.contains("isn't using the recommended version"));
    }

    #[test]
    fn test_version_is_interpolated() {
        let text = pom(
            "org.jboss.bom",
            "jboss-javaee-6.0-with-tools",
            "${version.bom}",
            "<version.bom>1.0.0</version.bom>",
        );
        assert!(Fixture::single(&text).check(&checker()).is_empty());
    }

    #[test]
    fn test_override_replaces_recommendation() {
        let violations = Fixture::single(&bom("1.0.0"))
            .recommended_version("1.0.1")
            .check(&checker());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("1.0.1"));
    }

    #[test]
    fn test_not_from_catalog() {
        let text = pom("org.other", "bom", "1.0", "");
        let violations = Fixture::single(&text).check(&checker());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("isn't from the sanctioned catalog"));
    }

    #[test]
    fn test_exempt_group() {
        let text = pom(EXEMPT_GROUP, "helloworld", "1.0", "");
        assert!(Fixture::single(&text).check(&checker()).is_empty());

        let custom = pom("org.custom", "x", "1.0", "");
        let exempting = checker().exempt_group("org.custom");
        assert!(Fixture::single(&custom).check(&exempting).is_empty());
    }

    #[test]
    fn test_unresolved_version_is_warning() {
        let text = pom("org.jboss.bom", "jboss-javaee-6.0-with-tools", "${missing}", "");
        let violations = Fixture::single(&text).check(&checker());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.contains("could not be resolved"));
    }

    #[test]
    fn test_fix_literal_version() {
        let fixed = Fixture::single(&bom("0.9.0"))
            .rewrite(&checker(), 0)
            .expect("version should be fixed");
        assert!(fixed.contains("<version>1.0.0</version>"));
        assert!(Fixture::single(&fixed).check(&checker()).is_empty());
    }

    #[test]
    fn test_fix_property_version() {
        let text = pom(
            "org.jboss.bom",
            "jboss-javaee-6.0-with-tools",
            "${version.bom}",
            "<version.bom>0.9.0</version.bom>",
        );
        let fixed = Fixture::single(&text)
            .rewrite(&checker(), 0)
            .expect("property should be fixed");
        assert!(fixed.contains("<version.bom>1.0.0</version.bom>"));
        assert!(fixed.contains("<version>${version.bom}</version>"));
        assert!(Fixture::single(&fixed).rewrite(&checker(), 0).is_none());
    }

    #[test]
    fn test_fix_leaves_compound_expression() {
        let text = pom(
            "org.jboss.bom",
            "jboss-javaee-6.0-with-tools",
            "${base}.Final",
            "<base>0.9.0</base>",
        );
        assert!(Fixture::single(&text).rewrite(&checker(), 0).is_none());
    }
}
