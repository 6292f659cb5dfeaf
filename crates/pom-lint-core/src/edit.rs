//! Text edits used by fixers to derive corrected documents.
//!
//! Fixers never mutate a tracked [`Document`]. They describe byte-range
//! edits against its source text and [`Document::apply_edits`] re-parses the
//! result, so line numbers of the new document are computed from scratch.

use crate::document::{Document, Node, ParseError};
use std::ops::Range;

/// Errors produced while applying edits.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Two edits touch the same bytes.
    #[error("overlapping edits at bytes {first:?} and {second:?}")]
    Overlap {
        /// Earlier edit range.
        first: Range<usize>,
        /// Later edit range.
        second: Range<usize>,
    },

    /// An edit lies outside the text or splits a character.
    #[error("edit range {0:?} is out of bounds")]
    OutOfBounds(Range<usize>),

    /// The edited text no longer parses.
    #[error("edited descriptor does not parse: {0}")]
    Parse(#[from] ParseError),
}

/// A single replacement of a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Bytes to replace.
    pub range: Range<usize>,
    /// Replacement text.
    pub replacement: String,
}

impl TextEdit {
    /// Creates a replacement edit.
    #[must_use]
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Removes an element.
    ///
    /// When the element is alone on its lines, the surrounding indentation
    /// and the trailing line break are removed as well.
    #[must_use]
    pub fn remove_element(text: &str, node: &Node) -> Self {
        let range = node.range();
        let line_start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[range.end..]
            .find('\n')
            .map_or(text.len(), |i| range.end + i + 1);

        let leading_blank = text[line_start..range.start].trim().is_empty();
        let trailing_blank = text[range.end..line_end].trim().is_empty();

        if leading_blank && trailing_blank {
            Self::replace(line_start..line_end, "")
        } else {
            Self::replace(range, "")
        }
    }

    /// Sets the text body of a leaf element, escaping markup characters.
    #[must_use]
    pub fn set_text(node: &Node, value: &str) -> Self {
        let escaped = escape_text(value);
        match node.inner_range() {
            Some(inner) => Self::replace(inner, escaped),
            None => Self::replace(
                node.range(),
                format!("<{name}>{escaped}</{name}>", name = node.name()),
            ),
        }
    }
}

impl Document {
    /// Applies edits to the source text and parses the result as a new document.
    ///
    /// Edits may be given in any order but must not overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if edits overlap, fall outside the text, or the
    /// edited text is not well-formed.
    pub fn apply_edits(&self, mut edits: Vec<TextEdit>) -> Result<Document, EditError> {
        if edits.is_empty() {
            return Ok(self.clone());
        }
        edits.sort_by_key(|e| (e.range.start, e.range.end));

        for pair in edits.windows(2) {
            if pair[1].range.start < pair[0].range.end {
                return Err(EditError::Overlap {
                    first: pair[0].range.clone(),
                    second: pair[1].range.clone(),
                });
            }
        }

        let source = self.text();
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in &edits {
            let kept = source
                .get(cursor..edit.range.start)
                .ok_or_else(|| EditError::OutOfBounds(edit.range.clone()))?;
            if source.get(edit.range.clone()).is_none() {
                return Err(EditError::OutOfBounds(edit.range.clone()));
            }
            out.push_str(kept);
            out.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        out.push_str(&source[cursor..]);

        Ok(Document::parse(self.path(), out)?)
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
