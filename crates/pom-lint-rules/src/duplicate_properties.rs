//! Checker for properties declared more than once.
//!
//! Only direct children of `/project/properties` are considered. Every
//! declaration after the first is reported.
//!
//! The fix keeps the last declaration, the one interpolation resolves to,
//! and removes the others. A warning is logged when a removed declaration
//! carried a different value.

use pom_lint_core::{
    CheckError, Checker, Document, DocumentContext, Fixer, Node, Suggestion, TextEdit, Violation,
};
use std::collections::HashMap;
use tracing::warn;

/// Checker code for duplicate-property.
pub const CODE: &str = "PL002";

/// Checker name for duplicate-property.
pub const NAME: &str = "duplicate-property";

/// Reports and removes repeated property declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateProperties;

impl DuplicateProperties {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// A repeated declaration and the first declaration it repeats.
struct Repeat<'a> {
    node: &'a Node,
    first: &'a Node,
}

fn repeats(document: &Document) -> Vec<Repeat<'_>> {
    let mut first_seen: HashMap<&str, &Node> = HashMap::new();
    let mut found = Vec::new();
    for node in document.select(&["project", "properties", "*"]) {
        match first_seen.get(node.name()) {
            Some(&first) => found.push(Repeat { node, first }),
            None => {
                first_seen.insert(node.name(), node);
            }
        }
    }
    found
}

impl Checker for DuplicateProperties {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids declaring the same property twice"
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Result<Vec<Violation>, CheckError> {
        Ok(repeats(ctx.document())
            .into_iter()
            .map(|repeat| {
                ctx.violation(
                    self,
                    repeat.node.line(),
                    format!("Property [{}] is declared more than once", repeat.node.name()),
                )
                .with_suggestion(Suggestion::new(format!(
                    "First declared at line {}",
                    repeat.first.line()
                )))
            })
            .collect())
    }

    fn as_fixer(&self) -> Option<&dyn Fixer> {
        Some(self)
    }
}

/// Declarations shadowed by a later declaration of the same name, each with
/// the declaration that is kept.
fn shadowed(document: &Document) -> Vec<(&Node, &Node)> {
    let declared = document.select(&["project", "properties", "*"]);
    let mut last: HashMap<&str, &Node> = HashMap::new();
    for &node in &declared {
        last.insert(node.name(), node);
    }
    declared
        .into_iter()
        .filter_map(|node| {
            let kept = last.get(node.name()).copied()?;
            (!std::ptr::eq(kept, node)).then_some((node, kept))
        })
        .collect()
}

impl Fixer for DuplicateProperties {
    fn rewrite(&self, ctx: &DocumentContext<'_>) -> Result<Option<Document>, CheckError> {
        let document = ctx.document();
        let found = shadowed(document);
        if found.is_empty() {
            return Ok(None);
        }

        let mut edits = Vec::with_capacity(found.len());
        for (removed, kept) in found {
            let removed_value = removed.text_content();
            let kept_value = kept.text_content();
            if kept_value.trim() != removed_value.trim() {
                warn!(
                    "{}: removing property {} = {:?} (line {}), keeping {:?} (line {})",
                    ctx.descriptor.relative_path.display(),
                    removed.name(),
                    removed_value.trim(),
                    removed.line(),
                    kept_value.trim(),
                    kept.line()
                );
            }
            edits.push(TextEdit::remove_element(document.text(), removed));
        }
        Ok(Some(document.apply_edits(edits)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use pom_lint_core::DescriptorModel;

    const POM: &str = r"<project>
  <properties>
    <x>1</x>
    <y>2</y>
    <x>3</x>
  </properties>
  <build>
    <x>not a property</x>
  </build>
</project>
";

    #[test]
    fn test_reports_repeat_only() {
        let violations = Fixture::single(POM).check(&DuplicateProperties::new());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].location.line, 5);
        assert_eq!(violations[0].message, "Property [x] is declared more than once");
        assert_eq!(
            violations[0].suggestion.as_ref().map(|s| s.message.as_str()),
            Some("First declared at line 3")
        );
    }

    #[test]
    fn test_no_properties() {
        let violations = Fixture::single("<project/>").check(&DuplicateProperties::new());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_fix_keeps_effective_declaration() {
        let before = DescriptorModel::from_document(
            &Document::parse("pom.xml", POM).expect("fixture should parse"),
        );
        let fixed = Fixture::single(POM)
            .rewrite(&DuplicateProperties::new(), 0)
            .expect("repeat should be removed");
        let after = DescriptorModel::from_document(
            &Document::parse("pom.xml", fixed.as_str()).expect("fixed text should parse"),
        );

        assert_eq!(before.property("x"), Some("3"));
        assert_eq!(after.property("x"), Some("3"));
        assert!(!fixed.contains("<x>1</x>"));
        assert!(fixed.contains("<y>2</y>"));
        assert!(fixed.contains("<x>not a property</x>"));
        assert!(Fixture::single(&fixed)
            .rewrite(&DuplicateProperties::new(), 0)
            .is_none());
    }
}
