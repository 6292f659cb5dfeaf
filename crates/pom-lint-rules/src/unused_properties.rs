//! Checker for properties that are declared but never referenced.
//!
//! Runs once per walk against the property usage index, so a property
//! declared in one descriptor and referenced from another counts as used.
//! A reference is an element whose entire text is a single `${name}`;
//! `${name}-suffix` does not count.
//!
//! Properties whose name starts with `project` and those in the group's
//! `ignored_unused_properties` list are never reported.

use pom_lint_core::{
    CheckError, CheckScope, Checker, Document, DocumentContext, Fixer, GroupRules, Location,
    ProjectContext, ProjectFindings, PropertyUsageIndex, Severity, Suggestion, TextEdit, Violation,
};
use tracing::debug;

/// Checker code for unused-property.
pub const CODE: &str = "PL004";

/// Checker name for unused-property.
pub const NAME: &str = "unused-property";

const RESERVED_PREFIX: &str = "project";

/// Reports and removes unused property declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedProperties;

impl UnusedProperties {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_unused(name: &str, rules: &GroupRules, usage: &PropertyUsageIndex) -> bool {
    !name.starts_with(RESERVED_PREFIX) && !rules.is_property_ignored(name) && !usage.is_used(name)
}

impl Checker for UnusedProperties {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids properties that nothing references"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn scope(&self) -> CheckScope {
        CheckScope::Project
    }

    fn check_project(&self, ctx: &ProjectContext<'_>) -> Result<ProjectFindings, CheckError> {
        let usage = ctx.pass.usage;
        let mut violations = Vec::new();

        for (name, sites) in usage.unused() {
            for site in sites {
                let Some(descriptor) = ctx.descriptor(&site.document) else {
                    continue;
                };
                let rules = ctx.rules_for(descriptor);
                if rules.is_checker_ignored(NAME) {
                    debug!(
                        "Skipping {} for {}",
                        NAME,
                        descriptor.model.coordinates()
                    );
                    continue;
                }
                if !is_unused(name, rules, usage) {
                    continue;
                }
                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        Location::new(site.document.clone(), site.line),
                        format!("Property [{name}] was declared but was never used"),
                    )
                    .with_suggestion(Suggestion::new("Remove the declaration")),
                );
            }
        }

        violations.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(ProjectFindings::violations(violations))
    }

    fn as_fixer(&self) -> Option<&dyn Fixer> {
        Some(self)
    }
}

impl Fixer for UnusedProperties {
    fn rewrite(&self, ctx: &DocumentContext<'_>) -> Result<Option<Document>, CheckError> {
        let document = ctx.document();
        let edits: Vec<TextEdit> = document
            .select(&["project", "properties", "*"])
            .into_iter()
            .filter(|node| is_unused(node.name(), ctx.rules, ctx.pass.usage))
            .map(|node| TextEdit::remove_element(document.text(), node))
            .collect();
        if edits.is_empty() {
            return Ok(None);
        }
        Ok(Some(document.apply_edits(edits)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    const DECLARING: &str = r"<project>
  <groupId>org.example</groupId>
  <properties>
    <foo>1</foo>
    <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
  </properties>
</project>
";

    fn using(text: &str) -> String {
        format!(
            "<project>\n  <groupId>org.example</groupId>\n  <version>{text}</version>\n</project>\n"
        )
    }

    #[test]
    fn test_used_in_other_document() {
        let fixture = Fixture::new(&[
            ("a/pom.xml", DECLARING),
            ("b/pom.xml", using("${foo}").as_str()),
        ]);
        let findings = fixture.check_project(&UnusedProperties::new());
        assert!(findings.violations.is_empty(), "{:?}", findings.violations);
    }

    #[test]
    fn test_partial_match_is_not_a_use() {
        let fixture = Fixture::new(&[
            ("a/pom.xml", DECLARING),
            ("b/pom.xml", using("${foo}-suffix").as_str()),
        ]);
        let findings = fixture.check_project(&UnusedProperties::new());
        assert_eq!(findings.violations.len(), 1);
        let v = &findings.violations[0];
        assert_eq!(v.message, "Property [foo] was declared but was never used");
        assert_eq!(v.location, Location::new("a/pom.xml", 4));
    }

    #[test]
    fn test_one_violation_per_declaration_site() {
        let fixture = Fixture::new(&[("b/pom.xml", DECLARING), ("a/pom.xml", DECLARING)]);
        let findings = fixture.check_project(&UnusedProperties::new());
        let locations: Vec<&Location> = findings.violations.iter().map(|v| &v.location).collect();
        assert_eq!(
            locations,
            vec![&Location::new("a/pom.xml", 4), &Location::new("b/pom.xml", 4)]
        );
    }

    #[test]
    fn test_ignored_property_and_suppressed_group() {
        let ignored = Fixture::single(DECLARING).config(
            r#"
[groups."org.example"]
ignored_unused_properties = ["foo"]
"#,
        );
        assert!(ignored.check_project(&UnusedProperties::new()).violations.is_empty());

        let suppressed = Fixture::single(DECLARING).config(
            r#"
[groups."org.example"]
ignored_checkers = ["unused-property"]
"#,
        );
        assert!(suppressed.check_project(&UnusedProperties::new()).violations.is_empty());
    }

    #[test]
    fn test_fix_removes_unused_only() {
        let text = r"<project>
  <properties>
    <foo>1</foo>
    <bar>2</bar>
  </properties>
  <version>${bar}</version>
</project>
";
        let fixed = Fixture::single(text)
            .rewrite(&UnusedProperties::new(), 0)
            .expect("foo should be removed");
        assert!(!fixed.contains("<foo>"));
        assert!(fixed.contains("<bar>2</bar>"));
        assert!(Fixture::single(&fixed)
            .rewrite(&UnusedProperties::new(), 0)
            .is_none());
    }
}
