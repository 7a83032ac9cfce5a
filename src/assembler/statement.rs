//! Line-level tokenizing helpers shared by the first and second pass: strip
//! comments, peel an optional label, and split the remaining text into a
//! mnemonic/directive plus comma-separated operand tokens.

use std::sync::LazyLock;

use regex::Regex;

static LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]{0,29}):\s*(.*)$").unwrap());

/// Strip an in-line comment (`;` to end-of-line) and trim whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(index) => line[..index].trim(),
        None => line.trim(),
    }
}

/// Peel an optional `name:` label prefix off the front of an
/// already-comment-stripped line. Returns `(label, rest)`.
pub fn peel_label(line: &str) -> (Option<&str>, &str) {
    match LABEL_PREFIX.captures(line) {
        Some(captures) => {
            let label = captures.get(1).unwrap().as_str();
            let rest_start = captures.get(2).unwrap().start();
            (Some(label), line[rest_start..].trim())
        }
        None => (None, line),
    }
}

/// Split the remainder of a line into its first token (mnemonic or
/// directive name) and the raw operand text that follows.
pub fn split_first_token(rest: &str) -> (&str, &str) {
    match rest.find(char::is_whitespace) {
        Some(index) => (&rest[..index], rest[index..].trim()),
        None => (rest, ""),
    }
}

/// Split comma-separated operand tokens, trimming whitespace around each.
/// Does not handle quoted strings — callers parsing `.string` use
/// [`extract_quoted_string`] instead.
pub fn split_operands(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::trim).collect()
}

/// Extract the text between the first and last `"` on a line, per the
/// `.string` directive's rule that inner quotes are literal.
pub fn extract_quoted_string(text: &str) -> Option<&str> {
    let first = text.find('"')?;
    let last = text.rfind('"')?;
    if last <= first {
        return None;
    }
    Some(&text[first + 1..last])
}
