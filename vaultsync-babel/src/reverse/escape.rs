//! Markdown escaping for text coming back from the page model.
//!
//! Run content is literal text. Anything the markup parser would read as
//! syntax gets a backslash so the note re-parses to the same runs.

/// Escape `text` for use as inline markup.
///
/// Inline metacharacters are always escaped. Block markers (`#`, `>`, `-`,
/// `+`, `=`, and `1.` / `1)` style ordinals) are escaped only where they
/// would start a line; `line_start` says whether `text` begins one. Pipes
/// are left to the table writer.
pub fn escape_text(text: &str, line_start: bool) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 10);
    let mut chars = text.chars().peekable();
    let mut at_line_start = line_start;
    let mut in_ordinal = false;

    while let Some(c) = chars.next() {
        let escape = match c {
            '\\' | '*' | '_' | '[' | ']' | '`' | '<' | '>' | '~' | '$' => true,
            '#' | '-' | '+' | '=' => at_line_start,
            '.' | ')' => in_ordinal,
            '!' => chars.peek() == Some(&'['),
            _ => false,
        };
        if escape {
            result.push('\\');
        }
        result.push(c);

        in_ordinal = (at_line_start || in_ordinal) && c.is_ascii_digit();
        at_line_start = c == '\n' || (at_line_start && matches!(c, ' ' | '\t'));
    }

    result
}

/// Longest run of `ch` in `content`.
pub fn longest_run(content: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Backtick fence for a code block: at least three, longer than any run
/// inside the content.
pub fn code_fence(content: &str) -> String {
    "`".repeat(longest_run(content, '`').max(2) + 1)
}
