//! Scalar handling utilities for yconf.
//!
//! Decides whether scalar text can be written plain and escapes it for
//! double-quoted output otherwise.

use std::borrow::Cow;

/// Check if a string can be written as a plain scalar.
///
/// A plain scalar is valid when:
/// 1. It's not empty and has no leading or trailing whitespace
/// 2. It starts with a letter, a digit, one of `_./+()~$^=;<\`, or a `-`
///    followed by a digit, a letter or `.`
/// 3. It has no control characters, no `: ` or trailing `:`, and no ` #`
///
/// Such text reads back unchanged both as a key and as a value.
pub fn can_be_plain(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    let first_ok = first.is_alphanumeric()
        || matches!(
            first,
            '_' | '.' | '/' | '+' | '(' | ')' | '~' | '$' | '^' | '=' | ';' | '<' | '\\'
        )
        || (first == '-' && chars.next().is_some_and(|c| c.is_alphanumeric() || c == '.'));
    if !first_ok {
        return false;
    }

    if s.ends_with(char::is_whitespace) || s.ends_with(':') {
        return false;
    }
    if s.contains(": ") || s.contains(" #") {
        return false;
    }
    !s.chars().any(char::is_control)
}

/// Escape a string for double-quoted output.
///
/// Returns the escaped content (without surrounding quotes).
pub fn escape_quoted(s: &str) -> Cow<'_, str> {
    if !s
        .chars()
        .any(|c| matches!(c, '"' | '\\') || c.is_control())
    {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let code = c as u32;
                result.push_str(&format!("\\u{code:04x}"));
            }
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}
