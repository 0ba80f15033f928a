// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Go string and rune literal unquoting.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("invalid syntax")]
    Syntax,
    #[error("invalid escape sequence")]
    Escape,
}

/// Interpret a quoted Go literal: `"..."`, `` `...` `` or `'.'`.
pub fn unquote(lit: &str) -> Result<String, UnquoteError> {
    let bytes = lit.as_bytes();
    if bytes.len() < 2 {
        return Err(UnquoteError::Syntax);
    }
    let quote = bytes[0];
    if bytes[bytes.len() - 1] != quote {
        return Err(UnquoteError::Syntax);
    }
    let body = &lit[1..lit.len() - 1];

    match quote {
        b'`' => {
            if body.contains('`') {
                return Err(UnquoteError::Syntax);
            }
            Ok(body.replace('\r', ""))
        }
        b'"' | b'\'' => {
            if body.contains('\n') {
                return Err(UnquoteError::Syntax);
            }
            let out = unescape(body, quote as char)?;
            if quote == b'\'' && out.chars().count() != 1 {
                return Err(UnquoteError::Syntax);
            }
            Ok(out)
        }
        _ => Err(UnquoteError::Syntax),
    }
}

fn unescape(body: &str, quote: char) -> Result<String, UnquoteError> {
    let mut out = String::with_capacity(body.len());
    // Octal and \x escapes produce raw bytes that may form UTF-8 sequences.
    let mut pending: Vec<u8> = Vec::new();
    let mut chars = body.chars();

    let flush = |pending: &mut Vec<u8>, out: &mut String| {
        if !pending.is_empty() {
            out.push_str(&String::from_utf8_lossy(pending));
            pending.clear();
        }
    };

    while let Some(c) = chars.next() {
        if c == quote {
            return Err(UnquoteError::Syntax);
        }
        if c != '\\' {
            flush(&mut pending, &mut out);
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or(UnquoteError::Escape)?;
        let simple = match escape {
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            '\\' => Some('\\'),
            c if c == quote => Some(c),
            _ => None,
        };
        if let Some(ch) = simple {
            flush(&mut pending, &mut out);
            out.push(ch);
            continue;
        }
        match escape {
            '0'..='7' => {
                let mut value = escape.to_digit(8).ok_or(UnquoteError::Escape)?;
                for _ in 0..2 {
                    let digit = chars
                        .next()
                        .and_then(|c| c.to_digit(8))
                        .ok_or(UnquoteError::Escape)?;
                    value = value * 8 + digit;
                }
                if value > 255 {
                    return Err(UnquoteError::Escape);
                }
                pending.push(value as u8);
            }
            'x' => {
                let value = hex_value(&mut chars, 2)?;
                pending.push(value as u8);
            }
            'u' | 'U' => {
                let len = if escape == 'u' { 4 } else { 8 };
                let value = hex_value(&mut chars, len)?;
                let ch = char::from_u32(value).ok_or(UnquoteError::Escape)?;
                flush(&mut pending, &mut out);
                out.push(ch);
            }
            _ => return Err(UnquoteError::Escape),
        }
    }
    flush(&mut pending, &mut out);
    Ok(out)
}

fn hex_value(chars: &mut std::str::Chars<'_>, len: usize) -> Result<u32, UnquoteError> {
    let mut value = 0u32;
    for _ in 0..len {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(UnquoteError::Escape)?;
        value = value * 16 + digit;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreted_strings() {
        assert_eq!(unquote(r#""fmt""#).as_deref(), Ok("fmt"));
        assert_eq!(unquote(r#""a\tb\n""#).as_deref(), Ok("a\tb\n"));
        assert_eq!(unquote(r#""é\x41\101""#).as_deref(), Ok("éAA"));
        assert_eq!(unquote(r#""\xc3\xa9""#).as_deref(), Ok("é"));
    }

    #[test]
    fn raw_strings_drop_carriage_returns() {
        assert_eq!(unquote("`a\\n\r\nb`").as_deref(), Ok("a\\n\nb"));
    }

    #[test]
    fn runes() {
        assert_eq!(unquote("'x'").as_deref(), Ok("x"));
        assert_eq!(unquote(r"'\''").as_deref(), Ok("'"));
        assert_eq!(unquote("'xy'"), Err(UnquoteError::Syntax));
    }

    #[test]
    fn malformed_literals() {
        assert_eq!(unquote("fmt"), Err(UnquoteError::Syntax));
        assert_eq!(unquote("\"fmt"), Err(UnquoteError::Syntax));
        assert_eq!(unquote(r#""\q""#), Err(UnquoteError::Escape));
        assert_eq!(unquote("\""), Err(UnquoteError::Syntax));
    }
}
