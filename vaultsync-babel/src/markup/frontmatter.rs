//! YAML front matter handling for notes
//!
//! ```markdown
//! ---
//! title: My Note
//! tags: [rust, wasm]
//! ---
//!
//! Note content here...
//! ```

use super::nodes::Frontmatter;
use crate::error::Result;
use serde_json::Value;

/// Split a note into front matter YAML and body, without parsing the YAML.
///
/// Returns `(None, raw)` when the note does not open with a complete
/// `---` delimited block.
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let Some(after_opening) = raw.strip_prefix("---") else {
        return (None, raw);
    };

    let yaml_start = if let Some(rest) = after_opening.strip_prefix('\n') {
        rest
    } else if let Some(rest) = after_opening.strip_prefix("\r\n") {
        rest
    } else {
        return (None, raw);
    };

    let Some(close_pos) = find_closing_delimiter(yaml_start) else {
        return (None, raw);
    };

    let yaml = &yaml_start[..close_pos];
    let after_close = &yaml_start[close_pos + 3..];
    let body = after_close
        .strip_prefix("\r\n")
        .or_else(|| after_close.strip_prefix('\n'))
        .unwrap_or(after_close);

    (Some(yaml), body)
}

/// Byte offset of the closing `---` line, which must start a line.
fn find_closing_delimiter(s: &str) -> Option<usize> {
    let mut pos = 0;
    for line in s.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if bare == "---" {
            return Some(pos);
        }
        pos += line.len();
    }
    None
}

/// Parse front matter YAML into a record.
///
/// Invalid YAML, or YAML that is not a mapping, yields an empty record: the
/// note is still transformed, only without metadata.
pub fn parse_frontmatter(yaml: &str) -> Frontmatter {
    if yaml.trim().is_empty() {
        return Frontmatter::new();
    }
    match serde_yaml::from_str::<Frontmatter>(yaml) {
        Ok(record) => record,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unparseable front matter");
            Frontmatter::new()
        }
    }
}

/// Tags declared in the record's `tags` (or `tag`) field.
///
/// Accepts a list or a comma/space separated string; leading `#` is dropped.
pub fn frontmatter_tags(record: &Frontmatter) -> Vec<String> {
    let Some(value) = record.get("tags").or_else(|| record.get("tag")) else {
        return Vec::new();
    };

    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|tag| tag.trim().trim_start_matches('#').to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Build a complete note from a record and a markup body.
///
/// An empty record produces the body alone.
pub fn render_note(record: &Frontmatter, body: &str) -> Result<String> {
    if record.is_empty() {
        return Ok(body.to_string());
    }

    let yaml = serde_yaml::to_string(record)?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}
