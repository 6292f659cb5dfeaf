//! Position-tracked build descriptor documents.
//!
//! A [`Document`] owns the raw descriptor text and an element tree in which
//! every [`Node`] records the 1-based line its start tag begins on. Text
//! content has no line of its own and reports the line of its enclosing
//! element.

use std::ops::Range;
use std::path::{Path, PathBuf};

/// A descriptor that is not well-formed markup.
#[derive(Debug, thiserror::Error)]
#[error("{}:{line}:{column}: malformed descriptor: {source}", path.display())]
pub struct ParseError {
    /// Path of the descriptor that failed to parse.
    pub path: PathBuf,
    /// Line of the syntax error (1-indexed).
    pub line: usize,
    /// Column of the syntax error (1-indexed).
    pub column: usize,
    /// Underlying syntax error.
    #[source]
    pub source: roxmltree::Error,
}

/// Errors from [`Document::from_file`].
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The descriptor could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The descriptor could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Content of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A child element.
    Element(Node),
    /// A text or CDATA segment, entities already decoded.
    Text(String),
}

/// An element of a parsed descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    line: usize,
    end_line: usize,
    range: Range<usize>,
    inner: Option<Range<usize>>,
    content: Vec<Content>,
}

impl Node {
    /// Local element name (namespace prefix stripped).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line on which the start tag begins (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Line on which the element ends (1-indexed).
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Byte range of the whole element in the source text.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Byte range between the start and end tags, `None` for `<empty/>`.
    #[must_use]
    pub fn inner_range(&self) -> Option<Range<usize>> {
        self.inner.clone()
    }

    /// Element and text content in document order.
    #[must_use]
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Iterates over child elements.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.content.iter().filter_map(|c| match c {
            Content::Element(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// Returns the first child element with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().find(|c| c.name == name)
    }

    /// Iterates over child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children().filter(move |c| c.name == name)
    }

    /// Text content of the first child with the given name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Node::text_content)
    }

    /// Concatenation of this element's own text segments.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::Text(text) => Some(text.as_str()),
                Content::Element(_) => None,
            })
            .collect()
    }

    /// All descendant text in document order, like DOM `textContent`.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(node) => node.collect_text(out),
            }
        }
    }

    /// Pre-order iterator over this element and every element below it.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Selects elements by a path of child names relative to this element.
    ///
    /// `"*"` matches any child name. An empty path selects `self`.
    #[must_use]
    pub fn select(&self, path: &[&str]) -> Vec<&Node> {
        let Some((first, rest)) = path.split_first() else {
            return vec![self];
        };
        self.children()
            .filter(|c| *first == "*" || c.name == *first)
            .flat_map(|c| c.select(rest))
            .collect()
    }
}

/// Pre-order element iterator returned by [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<&Node> = node.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

/// A parsed descriptor with its source text.
///
/// Documents are immutable; fixers derive a new document from edited text
/// (see [`Document::apply_edits`](crate::edit)).
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    root: Node,
}

impl Document {
    /// Parses descriptor text, recording the source line of every element.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not well-formed.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let text = text.into();
        let root = {
            let xml = roxmltree::Document::parse(&text).map_err(|source| {
                let pos = source.pos();
                ParseError {
                    path: path.clone(),
                    line: pos.row as usize,
                    column: pos.col as usize,
                    source,
                }
            })?;
            build_node(&xml, xml.root_element(), &text)
        };
        Ok(Self { path, text, root })
    }

    /// Reads and parses a descriptor from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, text)?)
    }

    /// Path the document was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root element.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Pre-order iterator over every element, root first.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }

    /// Selects elements by an absolute path whose first segment names the root.
    ///
    /// ```ignore
    /// let properties = doc.select(&["project", "properties", "*"]);
    /// ```
    #[must_use]
    pub fn select(&self, path: &[&str]) -> Vec<&Node> {
        match path.split_first() {
            Some((first, rest)) if *first == "*" || *first == self.root.name => {
                self.root.select(rest)
            }
            _ => Vec::new(),
        }
    }
}

fn build_node(xml: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>, text: &str) -> Node {
    let range = node.range();
    let line = xml.text_pos_at(range.start).row as usize;
    let last_byte = range.end.saturating_sub(1).max(range.start);
    let end_line = xml.text_pos_at(last_byte).row as usize;

    let content = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(Content::Element(build_node(xml, child, text)))
            } else if child.is_text() {
                child.text().map(|t| Content::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect();

    Node {
        name: node.tag_name().name().to_string(),
        line,
        end_line,
        inner: inner_range(text, &range),
        range,
        content,
    }
}

/// Locates the bytes between an element's start and end tags.
fn inner_range(text: &str, range: &Range<usize>) -> Option<Range<usize>> {
    let element = text.get(range.clone())?;
    let mut quote: Option<char> = None;
    let mut tag_end = None;
    for (i, ch) in element.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => {
                tag_end = Some(i);
                break;
            }
            (None, _) => {}
        }
    }
    let tag_end = tag_end?;
    if element[..tag_end].ends_with('/') {
        return None;
    }
    let close = element.rfind("</")?;
    (close > tag_end).then(|| range.start + tag_end + 1..range.start + close)
}
