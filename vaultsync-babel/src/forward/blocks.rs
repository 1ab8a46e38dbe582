//! Document Tree → target blocks.

use super::composer::{is_remote_url, Composer};
use crate::error::{Result, TransformError};
use crate::markup::nodes::{
    BlockNode, BlockQuote, CodeBlock, Document, Heading, InlineNode, List, ListItem, Paragraph,
    Table, TableRow,
};
use crate::markup::wikilink::is_image_target;
use crate::options::TransformOptions;
use crate::resolver::CrossRefResolver;
use crate::target::block::{
    self, Callout, Code, Equation, Media, TextBlock, ToDo, PLAIN_TEXT_LANGUAGE,
};
use crate::target::rich_text::split_code_content;
use crate::target::{Annotations, Block, BlockKind, Color, RichText};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static CALLOUT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[!(\w[\w-]*)\]([+-])?\s*(.*)$").expect("callout pattern is valid"));

/// Icon of the callout that stands in for a local image.
pub const LOCAL_IMAGE_ICON: &str = "🖼️";

/// Title suffix of the callout that stands in for a query block.
pub const QUERY_TITLE_SUFFIX: &str = " query";

const QUERY_NOTICE: &str = "This block is a live query and is only rendered in the vault.";

/// Maps block nodes to target blocks.
pub struct BlockMapper<'a> {
    composer: Composer<'a>,
    options: &'a TransformOptions,
}

impl<'a> BlockMapper<'a> {
    pub fn new(resolver: &'a dyn CrossRefResolver, options: &'a TransformOptions) -> Self {
        Self {
            composer: Composer::new(resolver, options),
            options,
        }
    }

    /// Map a whole document and validate the result.
    pub fn map_document(&self, document: &Document) -> Result<Vec<Block>> {
        let blocks = self.map_blocks(&document.children, 0)?;
        block::validate_blocks(&blocks)?;
        Ok(blocks)
    }

    fn map_blocks(&self, nodes: &[BlockNode], depth: usize) -> Result<Vec<Block>> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        if depth > self.options.max_depth {
            return Err(TransformError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        let mut blocks = Vec::new();
        for node in nodes {
            self.map_block(node, depth, &mut blocks)?;
        }
        Ok(blocks)
    }

    fn map_block(&self, node: &BlockNode, depth: usize, out: &mut Vec<Block>) -> Result<()> {
        trace!(kind = node.kind_name(), depth, "mapping block");
        match node {
            BlockNode::Heading(heading) => out.push(self.heading(heading)),
            BlockNode::Paragraph(paragraph) => out.push(self.paragraph(paragraph)),
            BlockNode::List(list) => {
                for item in &list.items {
                    out.push(self.list_item(list, item, depth)?);
                }
            }
            BlockNode::BlockQuote(quote) => out.push(self.block_quote(quote, depth)?),
            BlockNode::CodeBlock(code) => out.push(self.code_block(code)),
            BlockNode::ThematicBreak => out.push(Block::new(BlockKind::Divider)),
            BlockNode::Table(table) => out.push(self.table(table)),
            BlockNode::Html(_) => debug!("skipping raw html block"),
        }
        Ok(())
    }

    fn rich_text(&self, inlines: &[InlineNode]) -> Vec<RichText> {
        self.composer.compose(inlines, Annotations::default())
    }

    fn text_block(&self, inlines: &[InlineNode]) -> TextBlock {
        TextBlock::new(self.rich_text(inlines))
    }

    fn heading(&self, heading: &Heading) -> Block {
        let text = self.text_block(&heading.content);
        Block::new(match heading.level {
            1 => BlockKind::Heading1(text),
            2 => BlockKind::Heading2(text),
            _ => BlockKind::Heading3(text),
        })
    }

    fn paragraph(&self, paragraph: &Paragraph) -> Block {
        if let Some(expression) = display_math(&paragraph.content) {
            return Block::new(BlockKind::Equation(Equation { expression }));
        }
        if let Some(image) = lone_image(&paragraph.content) {
            return self.image(image);
        }
        Block::paragraph(self.rich_text(&paragraph.content))
    }

    fn image(&self, image: LoneImage<'_>) -> Block {
        if is_remote_url(image.url) {
            let caption = if image.alt.is_empty() {
                Vec::new()
            } else {
                vec![RichText::text(image.alt)]
            };
            return Block::new(BlockKind::Image(Media {
                url: image.url.to_string(),
                caption,
            }));
        }

        debug!(path = image.url, "local image cannot be embedded");
        Block::new(BlockKind::Callout(Callout {
            rich_text: vec![
                RichText::text("Local image not embedded: "),
                RichText::text(image.url).with_annotations(Annotations::default().with_code()),
            ],
            icon: LOCAL_IMAGE_ICON.to_string(),
            color: Color::GrayBackground,
        }))
    }

    fn list_item(&self, list: &List, item: &ListItem, depth: usize) -> Result<Block> {
        let (lead, rest) = split_lead_paragraph(&item.children);
        let children = self.map_blocks(rest, depth + 1)?;

        let (checkbox, inlines) = match lead {
            Some([InlineNode::TaskCheckbox { checked }, tail @ ..]) => (Some(*checked), tail),
            Some(inlines) => (None, inlines),
            None => (None, &[][..]),
        };
        let rich_text = self.rich_text(trim_leading_space(inlines));

        let kind = match checkbox {
            Some(checked) => BlockKind::ToDo(ToDo { rich_text, checked }),
            None if list.ordered => BlockKind::NumberedListItem(TextBlock::new(rich_text)),
            None => BlockKind::BulletedListItem(TextBlock::new(rich_text)),
        };
        Ok(Block::with_children(kind, children))
    }

    fn block_quote(&self, quote: &BlockQuote, depth: usize) -> Result<Block> {
        let (lead, rest) = split_lead_paragraph(&quote.children);

        if let Some(callout) = lead.and_then(parse_callout_marker) {
            let icon = self.options.callouts.icon_for(&callout.kind).to_string();
            let mut rich_text = Vec::new();
            if !callout.title.is_empty() {
                rich_text.push(
                    RichText::text(callout.title.as_str())
                        .with_annotations(Annotations::default().with_bold()),
                );
                if !callout.body.is_empty() {
                    rich_text.push(RichText::text("\n"));
                }
            }
            rich_text.extend(self.rich_text(callout.body));
            return Ok(Block::with_children(
                BlockKind::Callout(Callout {
                    rich_text,
                    icon,
                    color: Color::Default,
                }),
                self.map_blocks(rest, depth + 1)?,
            ));
        }

        let text = self.text_block(lead.unwrap_or_default());
        Ok(Block::with_children(
            BlockKind::Quote(text),
            self.map_blocks(rest, depth + 1)?,
        ))
    }

    fn code_block(&self, code: &CodeBlock) -> Block {
        let language = code
            .language
            .as_deref()
            .and_then(|info| info.split_whitespace().next())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match language.as_str() {
            "math" | "latex" => Block::new(BlockKind::Equation(Equation {
                expression: code.literal.trim().to_string(),
            })),
            "dataview" | "dataviewjs" => self.query_placeholder(&language, &code.literal),
            _ => {
                let rich_text = split_code_content(code.literal.trim_end_matches('\n'))
                    .into_iter()
                    .map(RichText::text)
                    .collect();
                Block::new(BlockKind::Code(Code {
                    rich_text,
                    language: normalize_language(&language).to_string(),
                    caption: Vec::new(),
                }))
            }
        }
    }

    fn query_placeholder(&self, language: &str, query: &str) -> Block {
        let bold = Annotations::default().with_bold();
        let code = Annotations::default().with_code();
        let mut rich_text = vec![
            RichText::text(format!("{language}{QUERY_TITLE_SUFFIX}")).with_annotations(bold),
            RichText::text(format!("\n{QUERY_NOTICE}\n")),
        ];
        rich_text.extend(
            split_code_content(query.trim_end_matches('\n'))
                .into_iter()
                .map(|segment| RichText::text(segment).with_annotations(code)),
        );
        Block::new(BlockKind::Callout(Callout {
            rich_text,
            icon: self.options.callouts.dataview_icon.clone(),
            color: Color::BlueBackground,
        }))
    }

    fn table(&self, table: &Table) -> Block {
        let width = table
            .header
            .as_ref()
            .or_else(|| table.rows.first())
            .map(|row| row.cells.len())
            .unwrap_or(0)
            .max(1);

        let rows = table
            .header
            .iter()
            .chain(table.rows.iter())
            .map(|row| self.table_row(row, width))
            .collect();

        Block::with_children(
            BlockKind::Table(block::Table {
                width,
                has_column_header: table.header.is_some(),
                has_row_header: false,
            }),
            rows,
        )
    }

    fn table_row(&self, row: &TableRow, width: usize) -> Block {
        let mut cells: Vec<Vec<RichText>> = row
            .cells
            .iter()
            .take(width)
            .map(|cell| self.rich_text(&cell.content))
            .collect();
        cells.resize_with(width, Vec::new);
        Block::new(BlockKind::TableRow(block::TableRow { cells }))
    }
}

fn normalize_language(language: &str) -> &str {
    match language {
        "" | "text" | "txt" | "plaintext" | "plain" => PLAIN_TEXT_LANGUAGE,
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" | "python3" => "python",
        "rs" => "rust",
        "sh" | "zsh" | "console" => "shell",
        "yml" => "yaml",
        "md" => "markdown",
        "cpp" | "cc" | "cxx" | "hpp" => "c++",
        "cs" | "csharp" => "c#",
        "fs" | "fsharp" => "f#",
        "golang" => "go",
        "rb" => "ruby",
        "kt" => "kotlin",
        "ps1" | "pwsh" => "powershell",
        "dockerfile" => "docker",
        "tex" => "latex",
        other => other,
    }
}

/// The first paragraph's inlines (if the children start with one) and the
/// remaining children.
fn split_lead_paragraph(children: &[BlockNode]) -> (Option<&[InlineNode]>, &[BlockNode]) {
    match children.split_first() {
        Some((BlockNode::Paragraph(paragraph), rest)) => (Some(paragraph.content.as_slice()), rest),
        _ => (None, children),
    }
}

fn trim_leading_space(inlines: &[InlineNode]) -> &[InlineNode] {
    match inlines.split_first() {
        Some((InlineNode::Text(text), rest)) if text.trim().is_empty() => rest,
        _ => inlines,
    }
}

struct CalloutMarker<'n> {
    kind: String,
    title: String,
    body: &'n [InlineNode],
}

/// Match `[!type]` (+ fold indicator, + title) on the first line of a quote.
fn parse_callout_marker(inlines: &[InlineNode]) -> Option<CalloutMarker<'_>> {
    let break_at = inlines
        .iter()
        .position(|node| matches!(node, InlineNode::SoftBreak | InlineNode::LineBreak));
    let (first_line, body) = match break_at {
        Some(index) => (&inlines[..index], &inlines[index + 1..]),
        None => (inlines, &[][..]),
    };

    let line: String = first_line.iter().map(inline_plain_text).collect();
    let captures = CALLOUT_MARKER.captures(line.trim())?;
    Some(CalloutMarker {
        kind: captures[1].to_string(),
        title: captures[3].trim().to_string(),
        body,
    })
}

fn inline_plain_text(node: &InlineNode) -> String {
    match node {
        InlineNode::Text(text) | InlineNode::RawInline(text) | InlineNode::Autolink(text) => {
            text.clone()
        }
        InlineNode::CodeSpan(code) => code.clone(),
        InlineNode::Emphasis { children, .. }
        | InlineNode::Strikethrough(children)
        | InlineNode::Link { children, .. } => children.iter().map(inline_plain_text).collect(),
        InlineNode::Image(image) => image.alt.clone(),
        InlineNode::CrossRef(cross_ref) => cross_ref.display_name().to_string(),
        InlineNode::Math { literal, .. } => literal.clone(),
        InlineNode::SoftBreak | InlineNode::LineBreak => "\n".to_string(),
        InlineNode::TaskCheckbox { .. } => String::new(),
    }
}

/// Expression of a paragraph that holds nothing but display math.
fn display_math(inlines: &[InlineNode]) -> Option<String> {
    let meaningful: Vec<&InlineNode> = inlines.iter().filter(|node| !is_blank(node)).collect();
    if let [InlineNode::Math {
        display: true,
        literal,
    }] = meaningful.as_slice()
    {
        return Some(literal.trim().to_string());
    }

    if !inlines
        .iter()
        .all(|node| matches!(node, InlineNode::Text(_) | InlineNode::SoftBreak | InlineNode::LineBreak))
    {
        return None;
    }
    let text: String = inlines.iter().map(inline_plain_text).collect();
    let inner = text.trim().strip_prefix("$$")?.strip_suffix("$$")?;
    let inner = inner.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

struct LoneImage<'n> {
    url: &'n str,
    alt: &'n str,
}

/// The image of a paragraph whose only non-blank inline is an image.
fn lone_image(inlines: &[InlineNode]) -> Option<LoneImage<'_>> {
    let mut meaningful = inlines.iter().filter(|node| !is_blank(node));
    let only = meaningful.next()?;
    if meaningful.next().is_some() {
        return None;
    }
    match only {
        InlineNode::Image(image) => Some(LoneImage {
            url: &image.url,
            alt: &image.alt,
        }),
        InlineNode::CrossRef(cross_ref) if cross_ref.embed && is_image_target(&cross_ref.target) => {
            Some(LoneImage {
                url: &cross_ref.target,
                alt: cross_ref.alias.as_deref().unwrap_or_default(),
            })
        }
        _ => None,
    }
}

fn is_blank(node: &InlineNode) -> bool {
    match node {
        InlineNode::Text(text) => text.trim().is_empty(),
        InlineNode::SoftBreak | InlineNode::LineBreak => true,
        _ => false,
    }
}
