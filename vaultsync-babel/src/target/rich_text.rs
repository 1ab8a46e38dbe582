//! Rich-text runs: the minimal styled text unit of the target model.

use serde::{Deserialize, Serialize};

/// Maximum content length of a single run, in Unicode scalar values.
///
/// This is a wire contract of the document service.
pub const MAX_RUN_LEN: usize = 2000;

/// Foreground or background color tag carried by a run or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    GrayBackground,
    BrownBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    RedBackground,
}

/// Composable style flags plus one color.
///
/// `Copy` on purpose: every `with_*` call returns a new set and leaves the
/// receiver's owner untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    pub fn with_code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// What a run refers to besides its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunKind {
    Text { link: Option<String> },
    /// A resolved reference to another page.
    Mention { page_id: String },
    /// Inline math; the run content is the expression.
    Equation,
}

/// One styled text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    pub content: String,
    pub annotations: Annotations,
    pub kind: RunKind,
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            kind: RunKind::Text { link: None },
        }
    }

    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            kind: RunKind::Text {
                link: Some(url.into()),
            },
        }
    }

    pub fn mention(display: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            content: display.into(),
            annotations: Annotations::default(),
            kind: RunKind::Mention {
                page_id: page_id.into(),
            },
        }
    }

    pub fn equation(expression: impl Into<String>) -> Self {
        Self {
            content: expression.into(),
            annotations: Annotations::default(),
            kind: RunKind::Equation,
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn link_url(&self) -> Option<&str> {
        match &self.kind {
            RunKind::Text { link } => link.as_deref(),
            RunKind::Mention { .. } | RunKind::Equation => None,
        }
    }
}

/// Concatenated visible text of a run sequence.
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(|run| run.content.as_str()).collect()
}

/// Split `content` into segments of at most `limit` characters.
///
/// A segment ends right after the last newline inside the window when there
/// is one, otherwise exactly at the limit. Segments concatenate back to
/// `content`. Empty content yields no segments.
pub fn split_content(content: &str, limit: usize) -> Vec<&str> {
    let limit = limit.max(1);
    let mut segments = Vec::new();
    let mut rest = content;

    while let Some((cut, _)) = rest.char_indices().nth(limit) {
        let window = &rest[..cut];
        let split_at = match window.rfind('\n') {
            Some(newline) => newline + 1,
            None => cut,
        };
        segments.push(&rest[..split_at]);
        rest = &rest[split_at..];
    }

    if !rest.is_empty() {
        segments.push(rest);
    }
    segments
}

/// Segment code content by the run bound.
pub fn split_code_content(content: &str) -> Vec<String> {
    split_content(content, MAX_RUN_LEN)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Merge neighbouring text runs that share annotations and link.
pub fn merge_adjacent(runs: Vec<RichText>) -> Vec<RichText> {
    let mut merged: Vec<RichText> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.content.is_empty() && matches!(run.kind, RunKind::Text { .. }) {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            let same_text = matches!(
                (&last.kind, &run.kind),
                (RunKind::Text { link: a }, RunKind::Text { link: b }) if a == b
            );
            if same_text && last.annotations == run.annotations {
                last.content.push_str(&run.content);
                continue;
            }
        }
        merged.push(run);
    }
    merged
}

/// Bound every run to [`MAX_RUN_LEN`] characters.
///
/// Text runs are split into several runs with the same styling. Inline math
/// that is too long for one equation run becomes code-styled text runs
/// carrying the expression. Mention display text is cut at the bound; the
/// service derives it from the page anyway.
pub fn enforce_run_limit(runs: Vec<RichText>) -> Vec<RichText> {
    let mut bounded = Vec::with_capacity(runs.len());
    for run in runs {
        if run.content.char_indices().nth(MAX_RUN_LEN).is_none() {
            bounded.push(run);
            continue;
        }
        match run.kind {
            RunKind::Text { .. } => {
                for segment in split_content(&run.content, MAX_RUN_LEN) {
                    bounded.push(RichText {
                        content: segment.to_string(),
                        annotations: run.annotations,
                        kind: run.kind.clone(),
                    });
                }
            }
            RunKind::Equation => {
                tracing::debug!(
                    length = run.content.chars().count(),
                    "inline math too long for one run, kept as code"
                );
                let code = run.annotations.with_code();
                for segment in split_content(&run.content, MAX_RUN_LEN) {
                    bounded.push(RichText::text(segment).with_annotations(code));
                }
            }
            RunKind::Mention { .. } => {
                let content = run.content.chars().take(MAX_RUN_LEN).collect();
                bounded.push(RichText { content, ..run });
            }
        }
    }
    bounded
}
