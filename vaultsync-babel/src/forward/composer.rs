//! Inline markup → rich-text runs.
//!
//! Annotations flow down the inline tree by value: each emphasis, strike or
//! code span copies the inherited set and flips one flag, so siblings never
//! observe each other's styling.

use crate::markup::nodes::{CrossRef, Image, InlineNode};
use crate::markup::wikilink::is_image_target;
use crate::options::{TransformOptions, UnresolvedLinkStyle};
use crate::resolver::CrossRefResolver;
use crate::target::rich_text::{enforce_run_limit, merge_adjacent};
use crate::target::{Annotations, Color, RichText, RunKind};
use tracing::{debug, trace};

/// Builds rich-text runs from inline nodes.
pub struct Composer<'a> {
    resolver: &'a dyn CrossRefResolver,
    options: &'a TransformOptions,
}

impl<'a> Composer<'a> {
    pub fn new(resolver: &'a dyn CrossRefResolver, options: &'a TransformOptions) -> Self {
        Self { resolver, options }
    }

    /// Compose `nodes` under `inherited` annotations.
    ///
    /// Neighbouring runs with the same styling are merged and every run is
    /// bounded to [`crate::target::MAX_RUN_LEN`].
    pub fn compose(&self, nodes: &[InlineNode], inherited: Annotations) -> Vec<RichText> {
        let mut runs = Vec::new();
        for node in nodes {
            self.push_inline(node, inherited, &mut runs);
        }
        enforce_run_limit(merge_adjacent(runs))
    }

    fn push_inline(&self, node: &InlineNode, annotations: Annotations, out: &mut Vec<RichText>) {
        match node {
            InlineNode::Text(text) => self.push_text(text, annotations, out),
            InlineNode::Emphasis { strong, children } => {
                let inner = if *strong {
                    annotations.with_bold()
                } else {
                    annotations.with_italic()
                };
                for child in children {
                    self.push_inline(child, inner, out);
                }
            }
            InlineNode::Strikethrough(children) => {
                let inner = annotations.with_strikethrough();
                for child in children {
                    self.push_inline(child, inner, out);
                }
            }
            InlineNode::CodeSpan(code) => {
                out.push(RichText::text(code.as_str()).with_annotations(annotations.with_code()));
            }
            InlineNode::Link { url, children, .. } => {
                let start = out.len();
                for child in children {
                    self.push_inline(child, annotations, out);
                }
                if out.len() == start {
                    out.push(RichText::text(url.as_str()).with_annotations(annotations));
                }
                for run in &mut out[start..] {
                    if let RunKind::Text { link } = &mut run.kind {
                        *link = Some(url.clone());
                    }
                }
            }
            InlineNode::Autolink(url) => {
                out.push(RichText::link(url.as_str(), url.as_str()).with_annotations(annotations));
            }
            InlineNode::Image(image) => self.push_image(image, annotations, out),
            InlineNode::RawInline(raw) => {
                out.push(RichText::text(raw.as_str()).with_annotations(annotations));
            }
            InlineNode::CrossRef(cross_ref) => self.push_cross_ref(cross_ref, annotations, out),
            InlineNode::Math { literal, .. } => {
                out.push(RichText::equation(literal.trim()).with_annotations(annotations));
            }
            InlineNode::TaskCheckbox { .. } => {
                trace!("task checkbox consumed by list item mapping");
            }
            InlineNode::SoftBreak | InlineNode::LineBreak => {
                out.push(RichText::text("\n").with_annotations(annotations));
            }
        }
    }

    /// Literal text, split around `==highlight==` pairs.
    fn push_text(&self, text: &str, annotations: Annotations, out: &mut Vec<RichText>) {
        for (piece, highlighted) in split_highlights(text) {
            let styled = if highlighted {
                annotations.with_color(self.options.highlight_color)
            } else {
                annotations
            };
            out.push(RichText::text(piece).with_annotations(styled));
        }
    }

    /// An image that did not stand alone in its paragraph: keep it as a link.
    fn push_image(&self, image: &Image, annotations: Annotations, out: &mut Vec<RichText>) {
        let label = if image.alt.is_empty() {
            image.url.as_str()
        } else {
            image.alt.as_str()
        };
        let run = if is_remote_url(&image.url) {
            RichText::link(label, image.url.as_str())
        } else {
            RichText::text(label)
        };
        out.push(run.with_annotations(annotations));
    }

    fn push_cross_ref(&self, cross_ref: &CrossRef, annotations: Annotations, out: &mut Vec<RichText>) {
        let display = cross_ref.display_name();
        if cross_ref.embed && is_image_target(&cross_ref.target) {
            out.push(RichText::text(display).with_annotations(annotations));
            return;
        }

        if let Some(page_id) = self.resolver.resolve(&cross_ref.target) {
            out.push(RichText::mention(display, page_id).with_annotations(annotations));
            return;
        }

        debug!(reference = %cross_ref.target, "unresolved cross-reference");
        match self.options.unresolved_links {
            UnresolvedLinkStyle::Placeholder => out.push(
                RichText::text(format!("[[{display}]]"))
                    .with_annotations(annotations.with_color(Color::Red)),
            ),
            UnresolvedLinkStyle::Text => {
                out.push(RichText::text(display).with_annotations(annotations));
            }
            UnresolvedLinkStyle::Skip => {}
        }
    }
}

/// Split text into `(piece, highlighted)` parts around `==...==` pairs.
///
/// An opening `==` without a closing one stays literal, as does `====`.
pub fn split_highlights(text: &str) -> Vec<(&str, bool)> {
    let mut parts = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("==") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("==") else {
            break;
        };
        if close == 0 {
            // `====`: nothing to highlight, keep the markers as text
            parts.push((&rest[..open + 4], false));
            rest = &rest[open + 4..];
            continue;
        }
        if open > 0 {
            parts.push((&rest[..open], false));
        }
        parts.push((&after_open[..close], true));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        parts.push((rest, false));
    }
    parts
}

/// Whether `url` is an absolute `http(s)` URL the service can fetch.
pub fn is_remote_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}
