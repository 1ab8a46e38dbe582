//! Wiki-style cross-reference syntax.
//!
//! Supports:
//! - Basic links: `[[Note]]`
//! - Aliases: `[[Note|Display Text]]`
//! - Headings: `[[Note#Heading]]`
//! - Block references: `[[Note#^block-id]]` (kept as a heading fragment)
//! - Embeds: `![[Note]]`
//! - Paths: `[[folder/Note]]`

use super::nodes::{CrossRef, InlineNode};

/// Parse the text between `[[` and `]]` into a [`CrossRef`].
pub fn parse_cross_ref(content: &str, embed: bool) -> CrossRef {
    let (target_part, alias) = match content.split_once('|') {
        Some((target, alias)) => (target, Some(alias.trim().to_string())),
        None => (content, None),
    };

    let (target, heading) = match target_part.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment.trim().to_string())),
        None => (target_part, None),
    };

    CrossRef {
        target: target.trim().to_string(),
        heading: heading.filter(|h| !h.is_empty()),
        alias: alias.filter(|a| !a.is_empty()),
        embed,
    }
}

/// Split literal text into text and cross-reference nodes.
///
/// Used for `[[...]]` sequences the markup parser left as plain text.
/// Unterminated brackets stay text.
pub fn split_wiki_links(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut pending = String::new();
    let mut rest = text;

    while let Some(open) = rest.find("[[") {
        let Some(close) = rest[open + 2..].find("]]") else {
            break;
        };
        let inner = &rest[open + 2..open + 2 + close];
        if inner.is_empty() || inner.contains('\n') {
            pending.push_str(&rest[..open + 2]);
            rest = &rest[open + 2..];
            continue;
        }

        let embed = rest[..open].ends_with('!');
        let before_end = if embed { open - 1 } else { open };
        pending.push_str(&rest[..before_end]);
        if !pending.is_empty() {
            nodes.push(InlineNode::Text(std::mem::take(&mut pending)));
        }
        nodes.push(InlineNode::CrossRef(parse_cross_ref(inner, embed)));
        rest = &rest[open + 2 + close + 2..];
    }

    pending.push_str(rest);
    if !pending.is_empty() {
        nodes.push(InlineNode::Text(pending));
    }
    nodes
}

/// Whether a cross-reference target names an image file.
pub fn is_image_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    [
        ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".avif",
    ]
    .iter()
    .any(|ext| lower.ends_with(ext))
}
