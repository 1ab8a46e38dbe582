//! Target blocks → markup text.

use super::escape::{self, escape_text};
use super::rich_text::RunRenderer;
use crate::error::{Result, TransformError};
use crate::forward::blocks::{LOCAL_IMAGE_ICON, QUERY_TITLE_SUFFIX};
use crate::options::TransformOptions;
use crate::resolver::CrossRefResolver;
use crate::target::block::{self, Callout, Code, Media, PLAIN_TEXT_LANGUAGE};
use crate::target::rich_text::plain_text;
use crate::target::{Block, BlockKind, Color, RichText, RunKind};
use tracing::trace;

const INDENT: &str = "  ";

/// Renders a block forest as markup.
pub struct ReverseMapper<'a> {
    runs: RunRenderer<'a>,
    options: &'a TransformOptions,
}

impl<'a> ReverseMapper<'a> {
    pub fn new(resolver: &'a dyn CrossRefResolver, options: &'a TransformOptions) -> Self {
        Self {
            runs: RunRenderer::new(resolver, options.highlight_color),
            options,
        }
    }

    /// Validate `blocks` and render them, newline-terminated.
    pub fn render(&self, blocks: &[Block]) -> Result<String> {
        block::validate_blocks(blocks)?;
        let mut markup = self.render_level(blocks, 0)?;
        if !markup.is_empty() {
            markup.push('\n');
        }
        Ok(markup)
    }

    fn render_level(&self, blocks: &[Block], depth: usize) -> Result<String> {
        if blocks.is_empty() {
            return Ok(String::new());
        }
        if depth > self.options.max_depth {
            return Err(TransformError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }

        let mut flat = Vec::new();
        flatten_transparent(blocks, &mut flat);

        let mut out = String::new();
        let mut previous_list = false;
        let mut number = 0;
        for block in flat {
            number = match block.kind {
                BlockKind::NumberedListItem(_) => number + 1,
                _ => 0,
            };
            let rendered = self.render_block(block, number, depth)?;
            if rendered.is_empty() {
                continue;
            }

            let is_list = is_list_item(&block.kind);
            if !out.is_empty() {
                out.push_str(if previous_list && is_list { "\n" } else { "\n\n" });
            }
            out.push_str(&rendered);
            previous_list = is_list;
        }
        Ok(out)
    }

    fn render_block(&self, block: &Block, number: usize, depth: usize) -> Result<String> {
        trace!(kind = block.kind.type_name(), depth, "rendering block");
        let children = &block.children;
        let rendered = match &block.kind {
            BlockKind::Paragraph(text) => {
                let paragraph = self.runs.render(&text.rich_text);
                self.with_children(paragraph, children, depth)?
            }
            BlockKind::Heading1(text) => self.heading(1, &text.rich_text),
            BlockKind::Heading2(text) => self.heading(2, &text.rich_text),
            BlockKind::Heading3(text) => self.heading(3, &text.rich_text),
            BlockKind::BulletedListItem(text) | BlockKind::Toggle(text) => {
                self.list_item("- ", &text.rich_text, children, depth)?
            }
            BlockKind::NumberedListItem(text) => {
                self.list_item(&format!("{number}. "), &text.rich_text, children, depth)?
            }
            BlockKind::ToDo(todo) => {
                let marker = if todo.checked { "- [x] " } else { "- [ ] " };
                self.list_item(marker, &todo.rich_text, children, depth)?
            }
            BlockKind::Quote(text) => {
                let body = self.runs.render(&text.rich_text);
                quote_lines(&self.with_children(body, children, depth)?)
            }
            BlockKind::Callout(callout) => self.callout(callout, children, depth)?,
            BlockKind::Code(code) => code_fence(code),
            BlockKind::Divider => "---".to_string(),
            BlockKind::Equation(equation) => format!("$$\n{}\n$$", equation.expression.trim()),
            BlockKind::Image(media) => format!("![{}]({})", plain_text(&media.caption), media.url),
            BlockKind::Bookmark(media)
            | BlockKind::Embed(media)
            | BlockKind::Video(media)
            | BlockKind::File(media)
            | BlockKind::Pdf(media) => media_link(media),
            BlockKind::Table(table) => self.table(table, children),
            BlockKind::TableRow(_) => return Err(TransformError::MisplacedTableRow),
            BlockKind::ColumnList | BlockKind::Column | BlockKind::SyncedBlock => {
                self.render_level(children, depth)?
            }
            BlockKind::ChildPage(page) => format!("[[{}]]", page.title),
            BlockKind::Unsupported(kind) => format!("<!-- unsupported block: {kind} -->"),
        };
        Ok(rendered)
    }

    fn heading(&self, level: usize, runs: &[RichText]) -> String {
        let text = self.runs.render(runs).replace('\n', " ");
        format!("{} {}", "#".repeat(level), text.trim())
    }

    fn with_children(&self, text: String, children: &[Block], depth: usize) -> Result<String> {
        let nested = self.render_level(children, depth + 1)?;
        Ok(match (text.is_empty(), nested.is_empty()) {
            (_, true) => text,
            (true, false) => nested,
            (false, false) => format!("{text}\n\n{nested}"),
        })
    }

    fn list_item(
        &self,
        marker: &str,
        runs: &[RichText],
        children: &[Block],
        depth: usize,
    ) -> Result<String> {
        let text = self.runs.render(runs);
        let mut item = format!("{marker}{}", text.replace('\n', &format!("\n{INDENT}")));
        let nested = self.render_level(children, depth + 1)?;
        if !nested.is_empty() {
            item.push('\n');
            item.push_str(&indent_lines(&nested));
        }
        Ok(item)
    }

    fn callout(&self, callout: &Callout, children: &[Block], depth: usize) -> Result<String> {
        if let Some(fence) = self.query_fence(callout) {
            return Ok(fence);
        }
        if let Some(path) = local_image_path(callout) {
            return Ok(format!("![[{path}]]"));
        }

        let callout_type = self.options.callouts.type_for(&callout.icon);
        let (title, body) = split_callout_title(&callout.rich_text);
        let mut text = format!("[!{callout_type}]");
        if let Some(title) = title {
            text.push(' ');
            text.push_str(&escape_text(title, false));
        }
        let body = self.runs.render(&body);
        if !body.is_empty() {
            text.push('\n');
            text.push_str(&body);
        }
        Ok(quote_lines(&self.with_children(text, children, depth)?))
    }

    /// Restore the fenced query a placeholder callout stands in for.
    fn query_fence(&self, callout: &Callout) -> Option<String> {
        if callout.icon != self.options.callouts.dataview_icon
            || callout.color != Color::BlueBackground
        {
            return None;
        }
        let (first, rest) = callout.rich_text.split_first()?;
        let language = first.content.strip_suffix(QUERY_TITLE_SUFFIX)?;
        if !first.annotations.bold {
            return None;
        }
        let query: String = rest
            .iter()
            .filter(|run| run.annotations.code)
            .map(|run| run.content.as_str())
            .collect();
        let fence = escape::code_fence(&query);
        Some(format!("{fence}{language}\n{query}\n{fence}"))
    }

    fn table(&self, table: &block::Table, children: &[Block]) -> String {
        let width = table.width.max(1);
        let rows: Vec<Vec<String>> = children
            .iter()
            .filter_map(|child| match &child.kind {
                BlockKind::TableRow(row) => Some(row),
                _ => None,
            })
            .map(|row| {
                let mut cells: Vec<String> = row
                    .cells
                    .iter()
                    .take(width)
                    .map(|cell| escape_cell(&self.runs.render(cell)))
                    .collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();

        let Some((header, body)) = rows.split_first() else {
            return String::new();
        };
        let mut lines = vec![
            table_line(header),
            table_line(&vec!["---".to_string(); width]),
        ];
        lines.extend(body.iter().map(|row| table_line(row)));
        lines.join("\n")
    }
}

fn is_list_item(kind: &BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::BulletedListItem(_)
            | BlockKind::NumberedListItem(_)
            | BlockKind::ToDo(_)
            | BlockKind::Toggle(_)
    )
}

/// Replace column lists, columns and synced blocks by their children.
fn flatten_transparent<'b>(blocks: &'b [Block], out: &mut Vec<&'b Block>) {
    for block in blocks {
        match block.kind {
            BlockKind::ColumnList | BlockKind::Column | BlockKind::SyncedBlock => {
                flatten_transparent(&block.children, out)
            }
            _ => out.push(block),
        }
    }
}

fn indent_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_fence(code: &Code) -> String {
    let content = plain_text(&code.rich_text);
    let content = content.trim_end_matches('\n');
    let language = if code.language == PLAIN_TEXT_LANGUAGE {
        ""
    } else {
        code.language.as_str()
    };
    let fence = escape::code_fence(content);
    format!("{fence}{language}\n{content}\n{fence}")
}

fn media_link(media: &Media) -> String {
    let label = plain_text(&media.caption);
    let label = if label.trim().is_empty() {
        media.url.as_str()
    } else {
        label.trim()
    };
    format!("[{label}]({})", media.url)
}

fn local_image_path(callout: &Callout) -> Option<&str> {
    if callout.icon != LOCAL_IMAGE_ICON {
        return None;
    }
    callout
        .rich_text
        .iter()
        .find(|run| run.annotations.code)
        .map(|run| run.content.as_str())
}

/// A leading bold run followed by a line break is the callout title.
fn split_callout_title(runs: &[RichText]) -> (Option<&str>, Vec<RichText>) {
    let Some((first, rest)) = runs.split_first() else {
        return (None, Vec::new());
    };
    let is_title = first.annotations.bold
        && matches!(first.kind, RunKind::Text { link: None })
        && !first.content.contains('\n')
        && rest.first().map_or(true, |next| next.content.starts_with('\n'));
    if !is_title {
        return (None, runs.to_vec());
    }

    let mut body = rest.to_vec();
    if let Some(next) = body.first_mut() {
        next.content.remove(0);
        if next.content.is_empty() {
            body.remove(0);
        }
    }
    (Some(first.content.trim()), body)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

fn table_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}
