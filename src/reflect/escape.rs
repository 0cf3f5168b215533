//! Backslash-escape decoding for constant string values.
//!
//! Constant values are stored escape-encoded so they never contain the
//! space that terminates a constant declaration. An unrecognized escape is
//! passed through verbatim, backslash included, so decoders stay tolerant
//! of encodings produced by newer compilers.

use super::ReflectError;

use crate::logging::warn;

/// Decode the backslash escapes in a constant value.
///
/// Supports `\' \" \\ \b \f \n \r \t \v \0`, `\xHH`, and `\uHHHH`. Hex
/// escapes decode to the Unicode scalar value, so `é` yields two
/// UTF-8 bytes.
pub fn unescape(input: &str) -> Result<String, ReflectError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let (_, escape) = chars
            .next()
            .ok_or(ReflectError::BadEscape { offset })?;
        match escape {
            '\'' | '"' | '\\' => out.push(escape),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{000b}'),
            '0' => out.push('\0'),
            'x' => out.push(hex_escape(&mut chars, 2, offset)?),
            'u' => out.push(hex_escape(&mut chars, 4, offset)?),
            other => {
                warn!(escape = %other, offset, "unknown escape passed through");
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn hex_escape(
    chars: &mut std::str::CharIndices<'_>,
    digits: u32,
    offset: usize,
) -> Result<char, ReflectError> {
    let mut code: u32 = 0;
    for _ in 0..digits {
        let (_, c) = chars.next().ok_or(ReflectError::BadEscape { offset })?;
        let digit = c
            .to_digit(16)
            .ok_or(ReflectError::BadEscape { offset })?;
        code = code << 4 | digit;
    }
    char::from_u32(code).ok_or(ReflectError::BadEscape { offset })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(unescape("hello").unwrap(), "hello");
    }

    #[test]
    fn named_escapes() {
        assert_eq!(unescape(r"a\nb\tc\\d").unwrap(), "a\nb\tc\\d");
        assert_eq!(unescape(r"\0").unwrap(), "\0");
    }

    #[test]
    fn hex_and_unicode_escapes() {
        assert_eq!(unescape(r"\x41").unwrap(), "A");
        assert_eq!(unescape(r"\u00e9").unwrap(), "\u{e9}");
    }

    #[test]
    fn unknown_escape_is_literal() {
        assert_eq!(unescape(r"\q").unwrap(), "\\q");
    }

    #[test]
    fn surrogate_is_rejected() {
        assert_eq!(
            unescape(r"\ud800"),
            Err(ReflectError::BadEscape { offset: 0 })
        );
    }

    #[test]
    fn truncated_escape_is_rejected() {
        assert!(matches!(
            unescape(r"tail\x4"),
            Err(ReflectError::BadEscape { .. })
        ));
    }
}
