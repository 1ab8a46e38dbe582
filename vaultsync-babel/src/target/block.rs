//! Blocks: the content units of a target page.

use super::rich_text::{Color, RichText};
use crate::error::{Result, TransformError};

/// Code language sentinel for fences without a language tag.
pub const PLAIN_TEXT_LANGUAGE: &str = "plain text";

/// A block with its kind-specific content and nested children.
///
/// Only kinds for which [`BlockKind::supports_children`] holds may carry
/// children; [`validate_blocks`] enforces this.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Service-assigned id, present on blocks read back from the service.
    pub id: Option<String>,
    pub kind: BlockKind,
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: BlockKind, children: Vec<Block>) -> Self {
        Self {
            id: None,
            kind,
            children,
        }
    }

    pub fn paragraph(rich_text: Vec<RichText>) -> Self {
        Self::new(BlockKind::Paragraph(TextBlock::new(rich_text)))
    }
}

/// Closed set of block kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDo),
    Toggle(TextBlock),
    Quote(TextBlock),
    Callout(Callout),
    Code(Code),
    Divider,
    Equation(Equation),
    Image(Media),
    Table(Table),
    TableRow(TableRow),
    Bookmark(Media),
    Embed(Media),
    Video(Media),
    File(Media),
    Pdf(Media),
    ColumnList,
    Column,
    SyncedBlock,
    ChildPage(ChildPage),
    /// A kind this model does not know, identified by its wire type name.
    Unsupported(String),
}

impl BlockKind {
    /// Wire type name of the kind.
    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::Heading3(_) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
            BlockKind::Toggle(_) => "toggle",
            BlockKind::Quote(_) => "quote",
            BlockKind::Callout(_) => "callout",
            BlockKind::Code(_) => "code",
            BlockKind::Divider => "divider",
            BlockKind::Equation(_) => "equation",
            BlockKind::Image(_) => "image",
            BlockKind::Table(_) => "table",
            BlockKind::TableRow(_) => "table_row",
            BlockKind::Bookmark(_) => "bookmark",
            BlockKind::Embed(_) => "embed",
            BlockKind::Video(_) => "video",
            BlockKind::File(_) => "file",
            BlockKind::Pdf(_) => "pdf",
            BlockKind::ColumnList => "column_list",
            BlockKind::Column => "column",
            BlockKind::SyncedBlock => "synced_block",
            BlockKind::ChildPage(_) => "child_page",
            BlockKind::Unsupported(name) => name,
        }
    }

    /// Whether blocks of this kind may carry children.
    pub fn supports_children(&self) -> bool {
        match self {
            BlockKind::Paragraph(_)
            | BlockKind::BulletedListItem(_)
            | BlockKind::NumberedListItem(_)
            | BlockKind::ToDo(_)
            | BlockKind::Toggle(_)
            | BlockKind::Quote(_)
            | BlockKind::Callout(_)
            | BlockKind::Table(_)
            | BlockKind::ColumnList
            | BlockKind::Column
            | BlockKind::SyncedBlock => true,
            BlockKind::Heading1(_)
            | BlockKind::Heading2(_)
            | BlockKind::Heading3(_)
            | BlockKind::Code(_)
            | BlockKind::Divider
            | BlockKind::Equation(_)
            | BlockKind::Image(_)
            | BlockKind::TableRow(_)
            | BlockKind::Bookmark(_)
            | BlockKind::Embed(_)
            | BlockKind::Video(_)
            | BlockKind::File(_)
            | BlockKind::Pdf(_)
            | BlockKind::ChildPage(_)
            | BlockKind::Unsupported(_) => false,
        }
    }
}

/// Rich text plus a block color; shared by most text-bearing kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub rich_text: Vec<RichText>,
    pub color: Color,
}

impl TextBlock {
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            rich_text,
            color: Color::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToDo {
    pub rich_text: Vec<RichText>,
    pub checked: bool,
}

/// Icon-tagged highlighted block.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub rich_text: Vec<RichText>,
    /// Emoji icon.
    pub icon: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub rich_text: Vec<RichText>,
    pub language: String,
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub expression: String,
}

/// An external resource reference (image, bookmark, file, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub url: String,
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildPage {
    pub title: String,
}

/// Check the child invariants over a block forest.
///
/// - only child-bearing kinds carry children
/// - table rows only appear directly under a table
/// - a table's children are all table rows
pub fn validate_blocks(blocks: &[Block]) -> Result<()> {
    validate_level(blocks, false)
}

fn validate_level(blocks: &[Block], inside_table: bool) -> Result<()> {
    for block in blocks {
        let is_row = matches!(block.kind, BlockKind::TableRow(_));
        if is_row && !inside_table {
            return Err(TransformError::MisplacedTableRow);
        }
        if inside_table && !is_row {
            return Err(TransformError::TableChildNotRow {
                kind: block.kind.type_name().to_string(),
            });
        }
        if !block.children.is_empty() && !block.kind.supports_children() {
            return Err(TransformError::ChildrenNotAllowed {
                kind: block.kind.type_name().to_string(),
            });
        }
        let is_table = matches!(block.kind, BlockKind::Table(_));
        validate_level(&block.children, is_table)?;
    }
    Ok(())
}
