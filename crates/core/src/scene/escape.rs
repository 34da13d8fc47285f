//! String-literal escaping and title derivation.
//!
//! Every piece of user text that reaches a generated script goes through
//! [`escape_py_string`] and is emitted inside a double-quoted literal.

use std::fmt::Write;

/// Maximum number of characters kept from a title.
pub const MAX_TITLE_CHARS: usize = 50;

/// Title used when the prompt and scene title are both empty.
pub const DEFAULT_TITLE: &str = "Manim";

/// Escape `s` for embedding inside a double-quoted Python string literal.
///
/// Backslashes and double quotes are escaped, and control characters are
/// written as escape sequences so a literal can never span lines.
pub fn escape_py_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            // Line and paragraph separators end a line for some tokenizers.
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// True when `label` can go into a `MathTex` literal unchanged.
///
/// LaTeX is a second interpreter behind the script, so only a small
/// character set without backslashes is accepted, and braces must balance.
/// Labels that fail this check are rendered as plain `Text` instead.
pub fn is_tex_safe(label: &str) -> bool {
    let mut depth = 0usize;
    for c in label.chars() {
        match c {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            c if c.is_ascii_alphanumeric() => {}
            ' ' | '_' | '^' | '+' | '-' | '=' | ',' | '.' | '(' | ')' | '|' | '\'' | '*' | '<' | '>' => {}
            _ => return false,
        }
    }
    depth == 0
}

/// First line of `text`, trimmed, cut to [`MAX_TITLE_CHARS`] characters,
/// with quote characters removed.
pub fn safe_title(text: &str) -> String {
    text.trim()
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(MAX_TITLE_CHARS)
        .filter(|c| *c != '"' && *c != '\'')
        .collect()
}

/// Pick the scene title: an explicit non-blank scene title wins over the
/// prompt. Falls back to [`DEFAULT_TITLE`] when nothing usable remains.
pub fn derive_title(prompt: Option<&str>, scene_title: Option<&str>) -> String {
    let source = scene_title
        .filter(|t| !t.trim().is_empty())
        .or(prompt)
        .unwrap_or("");
    let title = safe_title(source);
    if title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}
