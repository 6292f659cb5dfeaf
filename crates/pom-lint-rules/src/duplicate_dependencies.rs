//! Checker for dependencies declared more than once.
//!
//! # Detected Patterns
//!
//! - A `<dependency>` whose (groupId, artifactId) already appeared anywhere
//!   earlier in the descriptor, managed or not
//!
//! # Fix
//!
//! Repeated declarations are removed; the first one is kept.

use pom_lint_core::{
    CheckError, Checker, DependencyDeclaration, Document, DocumentContext, Fixer, Node, Severity,
    Suggestion, TextEdit, Violation,
};
use std::collections::HashSet;

/// Checker code for duplicate-dependency.
pub const CODE: &str = "PL001";

/// Checker name for duplicate-dependency.
pub const NAME: &str = "duplicate-dependency";

/// Reports and removes repeated dependency declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDependencies;

impl DuplicateDependencies {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Repeated `<dependency>` elements with their declarations, in document order.
fn repeats(document: &Document) -> Vec<(&Node, DependencyDeclaration)> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    document
        .descendants()
        .filter(|n| n.name() == "dependency")
        .filter_map(|node| {
            let declaration = DependencyDeclaration::from_node(node);
            let (group, artifact) = declaration.key();
            let key = (group.to_string(), artifact.to_string());
            (!seen.insert(key)).then_some((node, declaration))
        })
        .collect()
}

impl Checker for DuplicateDependencies {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids declaring the same dependency twice in one descriptor"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Result<Vec<Violation>, CheckError> {
        Ok(repeats(ctx.document())
            .into_iter()
            .map(|(node, declaration)| {
                let (group, artifact) = declaration.key();
                ctx.violation(
                    self,
                    node.line(),
                    format!("Dependency [{group}:{artifact}] is declared more than once"),
                )
                .with_suggestion(Suggestion::new("Remove the repeated declaration"))
            })
            .collect())
    }

    fn as_fixer(&self) -> Option<&dyn Fixer> {
        Some(self)
    }
}

impl Fixer for DuplicateDependencies {
    fn rewrite(&self, ctx: &DocumentContext<'_>) -> Result<Option<Document>, CheckError> {
        let document = ctx.document();
        let edits: Vec<TextEdit> = repeats(document)
            .into_iter()
            .map(|(node, _)| TextEdit::remove_element(document.text(), node))
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

    const POM: &str = r"<project>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>a</artifactId>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>b</artifactId>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>a</artifactId>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
";

    #[test]
    fn test_reports_second_occurrence() {
        let violations = Fixture::single(POM).check(&DuplicateDependencies::new());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].location.line, 11);
        assert!(violations[0].message.contains("org.example:a"));
    }

    #[test]
    fn test_same_artifact_in_other_group_is_distinct() {
        let pom = r"<project>
  <dependencies>
    <dependency><groupId>org.one</groupId><artifactId>a</artifactId></dependency>
    <dependency><groupId>org.two</groupId><artifactId>a</artifactId></dependency>
  </dependencies>
</project>";
        assert!(Fixture::single(pom).check(&DuplicateDependencies::new()).is_empty());
    }

    #[test]
    fn test_managed_and_direct_declarations_collide() {
        let pom = r"<project>
  <dependencyManagement>
    <dependencies>
      <dependency><groupId>org.example</groupId><artifactId>a</artifactId></dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency><groupId>org.example</groupId><artifactId>a</artifactId></dependency>
  </dependencies>
</project>";
        let violations = Fixture::single(pom).check(&DuplicateDependencies::new());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 8);

        let fixed = Fixture::single(pom)
            .rewrite(&DuplicateDependencies::new(), 0)
            .expect("direct repeat should be removed");
        assert_eq!(fixed.matches("<artifactId>a</artifactId>").count(), 1);
        assert!(fixed.contains("<dependencyManagement>"));
    }

    #[test]
    fn test_fix_keeps_first_and_is_stable() {
        let fixed = Fixture::single(POM)
            .rewrite(&DuplicateDependencies::new(), 0)
            .expect("duplicate should be removed");
        assert_eq!(fixed.matches("<artifactId>a</artifactId>").count(), 1);
        assert!(!fixed.contains("<scope>test</scope>"));
        assert!(fixed.contains("<artifactId>b</artifactId>"));

        let again = Fixture::single(&fixed);
        assert!(again.check(&DuplicateDependencies::new()).is_empty());
        assert!(again.rewrite(&DuplicateDependencies::new(), 0).is_none());
    }
}
