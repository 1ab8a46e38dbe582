//! Markup parsing (note source → Document Tree)
//!
//! Pipeline: note source → front matter split → Comrak AST → Document Tree.
//! The Comrak AST borrows from an arena that lives only for the duration of
//! the parse; everything handed back is owned.

use super::frontmatter::{frontmatter_tags, parse_frontmatter, split_frontmatter};
use super::nodes::{
    BlockNode, BlockQuote, CodeBlock, Document, Heading, Image, InlineNode, List, ListItem, Note,
    Paragraph, Table, TableCell, TableRow,
};
use super::wikilink::{parse_cross_ref, split_wiki_links};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s(])#([\p{L}\p{N}_][\p{L}\p{N}_/-]*)").expect("tag pattern is valid")
});

/// Parse a full note: front matter, tags and body tree.
pub fn parse_note(source: &str, title: &str) -> Note {
    let (yaml, body) = split_frontmatter(source);
    let frontmatter = yaml.map(parse_frontmatter).unwrap_or_default();

    let mut builder = TreeBuilder::default();
    let document = builder.parse(body);

    let mut tags = Vec::new();
    for tag in frontmatter_tags(&frontmatter)
        .into_iter()
        .chain(builder.tags)
    {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    Note {
        title: title.to_string(),
        frontmatter,
        tags,
        document,
    }
}

/// Parse a markup body (no front matter) into a Document Tree.
pub fn parse_markup(body: &str) -> Document {
    TreeBuilder::default().parse(body)
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.wikilinks_title_after_pipe = true;
    options.extension.math_dollars = true;
    options
}

/// Walks the Comrak AST, collecting inline tags on the way.
#[derive(Default)]
struct TreeBuilder {
    tags: Vec<String>,
}

impl TreeBuilder {
    fn parse(&mut self, body: &str) -> Document {
        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, body, &options);
        Document {
            children: self.blocks(root),
        }
    }

    fn blocks<'a>(&mut self, parent: &'a AstNode<'a>) -> Vec<BlockNode> {
        let mut blocks = Vec::new();
        for child in parent.children() {
            if let Some(block) = self.block(child) {
                blocks.push(block);
            }
        }
        blocks
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>) -> Option<BlockNode> {
        let data = node.data.borrow();

        let block = match &data.value {
            NodeValue::Heading(heading) => BlockNode::Heading(Heading {
                level: heading.level,
                content: self.inlines(node),
            }),

            NodeValue::Paragraph => BlockNode::Paragraph(Paragraph {
                content: self.inlines(node),
            }),

            NodeValue::List(list) => {
                let mut items = Vec::new();
                for child in node.children() {
                    if let Some(item) = self.list_item(child) {
                        items.push(item);
                    }
                }
                BlockNode::List(List {
                    ordered: list.list_type == ListType::Ordered,
                    start: list.start,
                    items,
                })
            }

            NodeValue::BlockQuote => BlockNode::BlockQuote(BlockQuote {
                children: self.blocks(node),
            }),

            NodeValue::CodeBlock(code) => {
                let language = code
                    .info
                    .split_whitespace()
                    .next()
                    .map(str::to_string);
                BlockNode::CodeBlock(CodeBlock {
                    language,
                    literal: code.literal.clone(),
                })
            }

            NodeValue::ThematicBreak => BlockNode::ThematicBreak,

            NodeValue::Table(_) => {
                let mut header = None;
                let mut rows = Vec::new();
                for child in node.children() {
                    let is_header = matches!(child.data.borrow().value, NodeValue::TableRow(true));
                    let row = self.table_row(child);
                    if is_header && header.is_none() {
                        header = Some(row);
                    } else {
                        rows.push(row);
                    }
                }
                BlockNode::Table(Table { header, rows })
            }

            NodeValue::HtmlBlock(html) => BlockNode::Html(html.literal.clone()),

            other => {
                tracing::debug!(node = ?other, "skipping unsupported markup block");
                return None;
            }
        };

        Some(block)
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>) -> Option<ListItem> {
        let checked = match &node.data.borrow().value {
            NodeValue::Item(_) => None,
            NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
            _ => return None,
        };

        let mut children = self.blocks(node);
        if let Some(checked) = checked {
            let checkbox = InlineNode::TaskCheckbox { checked };
            match children.first_mut() {
                Some(BlockNode::Paragraph(paragraph)) => paragraph.content.insert(0, checkbox),
                _ => children.insert(
                    0,
                    BlockNode::Paragraph(Paragraph {
                        content: vec![checkbox],
                    }),
                ),
            }
        }

        Some(ListItem { children })
    }

    fn table_row<'a>(&mut self, node: &'a AstNode<'a>) -> TableRow {
        TableRow {
            cells: node
                .children()
                .map(|cell| TableCell {
                    content: self.inlines(cell),
                })
                .collect(),
        }
    }

    fn inlines<'a>(&mut self, parent: &'a AstNode<'a>) -> Vec<InlineNode> {
        let mut raw = Vec::new();
        for child in parent.children() {
            self.inline(child, &mut raw);
        }

        let mut nodes = Vec::with_capacity(raw.len());
        for node in raw {
            match node {
                InlineNode::Text(text) => {
                    self.collect_tags(&text);
                    if text.contains("[[") {
                        nodes.extend(split_wiki_links(&text));
                    } else {
                        nodes.push(InlineNode::Text(text));
                    }
                }
                other => nodes.push(other),
            }
        }
        nodes
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>, out: &mut Vec<InlineNode>) {
        let data = node.data.borrow();

        match &data.value {
            NodeValue::Text(text) => push_text(out, text),

            NodeValue::Emph => out.push(InlineNode::Emphasis {
                strong: false,
                children: self.inlines(node),
            }),

            NodeValue::Strong => out.push(InlineNode::Emphasis {
                strong: true,
                children: self.inlines(node),
            }),

            NodeValue::Strikethrough => out.push(InlineNode::Strikethrough(self.inlines(node))),

            NodeValue::Code(code) => out.push(InlineNode::CodeSpan(code.literal.clone())),

            NodeValue::Link(link) => {
                let children = self.inlines(node);
                let is_autolink = match children.as_slice() {
                    [InlineNode::Text(text)] => {
                        *text == link.url || format!("mailto:{text}") == link.url
                    }
                    _ => false,
                };
                if is_autolink {
                    out.push(InlineNode::Autolink(link.url.clone()));
                } else {
                    out.push(InlineNode::Link {
                        url: link.url.clone(),
                        title: non_empty(&link.title),
                        children,
                    });
                }
            }

            NodeValue::Image(link) => out.push(InlineNode::Image(Image {
                url: link.url.clone(),
                alt: collect_text(node),
                title: non_empty(&link.title),
            })),

            NodeValue::WikiLink(link) => {
                let embed = strip_embed_marker(out);
                let mut cross_ref = parse_cross_ref(&link.url, embed);
                let label = collect_text(node);
                if cross_ref.alias.is_none() && !label.is_empty() && label != link.url {
                    cross_ref.alias = Some(label);
                }
                out.push(InlineNode::CrossRef(cross_ref));
            }

            NodeValue::Math(math) => out.push(InlineNode::Math {
                display: math.display_math,
                literal: math.literal.clone(),
            }),

            NodeValue::HtmlInline(html) => out.push(InlineNode::RawInline(html.clone())),

            NodeValue::SoftBreak => out.push(InlineNode::SoftBreak),

            NodeValue::LineBreak => out.push(InlineNode::LineBreak),

            other => {
                tracing::trace!(node = ?other, "flattening unsupported inline");
                for child in node.children() {
                    self.inline(child, out);
                }
            }
        }
    }

    fn collect_tags(&mut self, text: &str) {
        for capture in INLINE_TAG.captures_iter(text) {
            let tag = &capture[1];
            if tag.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
            }
        }
    }
}

/// Append text, merging with a preceding text node.
fn push_text(out: &mut Vec<InlineNode>, text: &str) {
    if let Some(InlineNode::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(InlineNode::Text(text.to_string()));
    }
}

/// Remove a trailing `!` left by `![[...]]`, reporting whether one was found.
fn strip_embed_marker(out: &mut Vec<InlineNode>) -> bool {
    let Some(InlineNode::Text(last)) = out.last_mut() else {
        return false;
    };
    if !last.ends_with('!') {
        return false;
    }
    last.pop();
    if last.is_empty() {
        out.pop();
    }
    true
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Collect plain text from a node's descendants.
fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        collect_text_content(child, &mut text);
    }
    text
}

fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_content(child, output);
            }
        }
    }
}
