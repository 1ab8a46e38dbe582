//! Core data structures for the markup Document Tree.

use serde_json::Value;
use std::collections::BTreeMap;

/// Front matter record: case-preserved keys mapped to scalar or list values.
pub type Frontmatter = BTreeMap<String, Value>;

/// A parsed note: body tree plus the metadata the parser extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Display title, usually the file stem.
    pub title: String,
    pub frontmatter: Frontmatter,
    /// Tags in first-seen order, without the leading `#`.
    pub tags: Vec<String>,
    pub document: Document,
}

/// Root of a note body, front matter already stripped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<BlockNode>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockNode {
    Heading(Heading),
    Paragraph(Paragraph),
    List(List),
    BlockQuote(BlockQuote),
    CodeBlock(CodeBlock),
    ThematicBreak,
    Table(Table),
    /// Raw HTML block, kept so the mapper can decide to drop it.
    Html(String),
}

impl BlockNode {
    /// Name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockNode::Heading(_) => "heading",
            BlockNode::Paragraph(_) => "paragraph",
            BlockNode::List(_) => "list",
            BlockNode::BlockQuote(_) => "blockquote",
            BlockNode::CodeBlock(_) => "fenced_code",
            BlockNode::ThematicBreak => "thematic_break",
            BlockNode::Table(_) => "table",
            BlockNode::Html(_) => "html_block",
        }
    }
}

/// ATX or setext heading; `level` is 1 to 6.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub content: Vec<InlineNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub content: Vec<InlineNode>,
}

/// Ordered or bulleted list. `start` is only meaningful when ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub start: usize,
    pub items: Vec<ListItem>,
}

/// One list entry.
///
/// A task item carries an [`InlineNode::TaskCheckbox`] as the first inline of
/// its first paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub children: Vec<BlockNode>,
}

/// Block quote, which is also how callouts arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockQuote {
    pub children: Vec<BlockNode>,
}

/// Fenced or indented code. `language` is the first word of the info string.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub literal: String,
}

/// Pipe table. The delimiter row is not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Option<TableRow>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub content: Vec<InlineNode>,
}

/// Inline content.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(String),
    /// `*x*` (`strong == false`) or `**x**` (`strong == true`).
    Emphasis {
        strong: bool,
        children: Vec<InlineNode>,
    },
    Strikethrough(Vec<InlineNode>),
    CodeSpan(String),
    Link {
        url: String,
        title: Option<String>,
        children: Vec<InlineNode>,
    },
    Autolink(String),
    Image(Image),
    RawInline(String),
    CrossRef(CrossRef),
    Math {
        display: bool,
        literal: String,
    },
    TaskCheckbox {
        checked: bool,
    },
    SoftBreak,
    LineBreak,
}

/// Inline image `![alt](url "title")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
}

/// A wiki-style link between notes: `[[target#heading|alias]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossRef {
    /// The note path or name, without fragment.
    pub target: String,
    pub heading: Option<String>,
    pub alias: Option<String>,
    /// Whether this was written as an embed (`![[...]]`).
    pub embed: bool,
}

impl CrossRef {
    /// Returns alias if present, otherwise the target name.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.target)
    }
}
