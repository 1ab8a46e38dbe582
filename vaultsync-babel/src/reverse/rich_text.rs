//! Rich-text runs → inline markup.
//!
//! Markers nest in a fixed order, inner to outer: code, underline,
//! strikethrough, italic, bold, highlight, link. Whitespace at either end of
//! a run is kept outside the markers so `** bold**` never appears.

use super::escape::{escape_text, longest_run};
use crate::resolver::CrossRefResolver;
use crate::target::{Color, RichText, RunKind};

/// Renders runs as inline markup.
pub struct RunRenderer<'a> {
    resolver: &'a dyn CrossRefResolver,
    highlight_color: Color,
}

impl<'a> RunRenderer<'a> {
    pub fn new(resolver: &'a dyn CrossRefResolver, highlight_color: Color) -> Self {
        Self {
            resolver,
            highlight_color,
        }
    }

    pub fn render(&self, runs: &[RichText]) -> String {
        let mut out = String::new();
        for run in runs {
            let line_start = out.is_empty() || out.ends_with('\n');
            out.push_str(&self.render_run(run, line_start));
        }
        out
    }

    fn render_run(&self, run: &RichText, line_start: bool) -> String {
        match &run.kind {
            RunKind::Equation => format!("${}$", run.content.trim()),
            RunKind::Mention { page_id } => {
                let shown = run.content.trim();
                let target = match self.resolver.name_for(page_id) {
                    Some(name) if !shown.is_empty() && name != shown => {
                        format!("[[{name}|{shown}]]")
                    }
                    Some(name) => format!("[[{name}]]"),
                    None => format!("[[{shown}]]"),
                };
                self.wrap(run, &target, None, Escape::Never)
            }
            RunKind::Text { link: None } if is_unresolved_placeholder(run) => {
                self.wrap(run, &run.content, None, Escape::Never)
            }
            RunKind::Text { link } => {
                self.wrap(run, &run.content, link.as_deref(), Escape::Text { line_start })
            }
        }
    }

    fn wrap(&self, run: &RichText, content: &str, link: Option<&str>, escape: Escape) -> String {
        let core = content.trim();
        if core.is_empty() {
            return content.to_string();
        }
        let start = content.len() - content.trim_start().len();
        let end = start + core.len();
        let (leading, trailing) = (&content[..start], &content[end..]);

        let annotations = run.annotations;
        let mut text = match escape {
            _ if annotations.code => code_span(core),
            Escape::Text { line_start } => escape_text(core, line_start || leading.contains('\n')),
            Escape::Never => core.to_string(),
        };
        if annotations.underline {
            text = format!("<u>{text}</u>");
        }
        if annotations.strikethrough {
            text = format!("~~{text}~~");
        }
        if annotations.italic {
            text = format!("*{text}*");
        }
        if annotations.bold {
            text = format!("**{text}**");
        }
        if annotations.color == self.highlight_color && annotations.color != Color::Default {
            text = format!("=={text}==");
        }
        if let Some(url) = link {
            text = format!("[{text}]({url})");
        }

        format!("{leading}{text}{trailing}")
    }
}

#[derive(Debug, Clone, Copy)]
enum Escape {
    /// Plain text; `line_start` is true when the run begins a line.
    Text { line_start: bool },
    /// Markup produced here, emitted as is.
    Never,
}

/// Red `[[display]]` text stands in for a link that did not resolve.
fn is_unresolved_placeholder(run: &RichText) -> bool {
    let core = run.content.trim();
    run.annotations.color == Color::Red
        && !run.annotations.code
        && core.len() > 4
        && core.starts_with("[[")
        && core.ends_with("]]")
}

/// Backtick fence long enough for the content.
fn code_span(content: &str) -> String {
    match longest_run(content, '`') {
        0 => format!("`{content}`"),
        longest => {
            let fence = "`".repeat(longest + 1);
            format!("{fence} {content} {fence}")
        }
    }
}
