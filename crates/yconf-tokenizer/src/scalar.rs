//! Quoted scalar unescaping.

use std::borrow::Cow;

/// Unescape the content of a double-quoted scalar (without the quotes).
pub(crate) fn unescape_double(s: &str) -> Result<Cow<'_, str>, &'static str> {
    if !s.contains('\\') {
        return Ok(Cow::Borrowed(s));
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => result.push('\0'),
            Some('a') => result.push('\u{07}'),
            Some('b') => result.push('\u{08}'),
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('v') => result.push('\u{0b}'),
            Some('f') => result.push('\u{0c}'),
            Some('r') => result.push('\r'),
            Some('e') => result.push('\u{1b}'),
            Some(' ') => result.push(' '),
            Some('"') => result.push('"'),
            Some('/') => result.push('/'),
            Some('\\') => result.push('\\'),
            Some('x') => result.push(hex_escape(&mut chars, 2)?),
            Some('u') => result.push(hex_escape(&mut chars, 4)?),
            Some('U') => result.push(hex_escape(&mut chars, 8)?),
            Some(_) => return Err("invalid escape sequence"),
            None => return Err("unterminated escape sequence"),
        }
    }

    Ok(Cow::Owned(result))
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, &'static str> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or("invalid hexadecimal escape")?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or("escape is not a valid unicode scalar value")
}

/// Unescape the content of a single-quoted scalar (without the quotes).
/// The only escape is `''` for a literal quote.
pub(crate) fn unescape_single(s: &str) -> Cow<'_, str> {
    if s.contains("''") {
        Cow::Owned(s.replace("''", "'"))
    } else {
        Cow::Borrowed(s)
    }
}
