// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Go tokenizer.
//!
//! Produces one [`Lexeme`] at a time, inserting semicolons at line ends the
//! way the Go grammar requires. Comments are consumed and discarded. Lexical
//! errors are recorded and scanning continues.


use memchr::{memchr, memmem};

use crate::token::{lookup_keyword, Pos, Token};

/// A lexical error at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerError {
    pub pos: Pos,
    pub message: String,
}

/// One scanned token with its position and literal text.
///
/// `lit` holds the source text for identifiers, keywords and literals, `"\n"`
/// for an automatically inserted semicolon and `";"` for an explicit one.
/// Operators carry an empty literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub pos: Pos,
    pub tok: Token,
    pub lit: String,
}

pub struct Tokenizer<'a> {
    src: &'a [u8],
    base: u32,
    offset: usize,
    insert_semi: bool,
    errors: Vec<TokenizerError>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `src`, issuing positions relative to `base`.
    pub fn new(src: &'a [u8], base: u32) -> Self {
        let mut offset = 0;
        if src.starts_with(b"\xEF\xBB\xBF") {
            offset = 3;
        }
        Tokenizer {
            src,
            base,
            offset,
            insert_semi: false,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[TokenizerError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<TokenizerError> {
        std::mem::take(&mut self.errors)
    }

    fn pos_at(&self, offset: usize) -> Pos {
        Pos(self.base + offset as u32)
    }

    fn error(&mut self, offset: usize, message: impl Into<String>) {
        let pos = self.pos_at(offset);
        self.errors.push(TokenizerError {
            pos,
            message: message.into(),
        });
    }

    fn peek_byte(&self, ahead: usize) -> u8 {
        self.src.get(self.offset + ahead).copied().unwrap_or(0)
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.offset]).into_owned()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.src.get(self.offset) {
            match b {
                b' ' | b'\t' | b'\r' => self.offset += 1,
                b'\n' if !self.insert_semi => self.offset += 1,
                _ => break,
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Lexeme {
        loop {
            self.skip_whitespace();
            let start = self.offset;
            let pos = self.pos_at(start);

            let Some(&c) = self.src.get(start) else {
                if self.insert_semi {
                    self.insert_semi = false;
                    return Lexeme {
                        pos,
                        tok: Token::Semicolon,
                        lit: "\n".to_string(),
                    };
                }
                return Lexeme {
                    pos,
                    tok: Token::Eof,
                    lit: String::new(),
                };
            };

            if c == b'\n' {
                // Only reached with insert_semi set.
                self.offset += 1;
                self.insert_semi = false;
                return Lexeme {
                    pos,
                    tok: Token::Semicolon,
                    lit: "\n".to_string(),
                };
            }

            if c == b'/' && matches!(self.peek_byte(1), b'/' | b'*') {
                if let Some(semi) = self.scan_comment(pos) {
                    return semi;
                }
                continue;
            }

            let (tok, lit, insert) = self.scan_token(c);
            self.insert_semi = insert;
            return Lexeme { pos, tok, lit };
        }
    }

    /// Consume a comment. Returns a semicolon when the comment ends a line
    /// that needs one.
    fn scan_comment(&mut self, pos: Pos) -> Option<Lexeme> {
        let start = self.offset;
        let newline_semi = Lexeme {
            pos,
            tok: Token::Semicolon,
            lit: "\n".to_string(),
        };
        if self.peek_byte(1) == b'/' {
            let rest = &self.src[start..];
            self.offset = start + memchr(b'\n', rest).unwrap_or(rest.len());
            if self.insert_semi {
                self.insert_semi = false;
                return Some(newline_semi);
            }
            return None;
        }

        let body = &self.src[start + 2..];
        let (end, terminated) = match memmem::find(body, b"*/") {
            Some(idx) => (start + 2 + idx + 2, true),
            None => (self.src.len(), false),
        };
        if !terminated {
            self.error(start, "comment not terminated");
        }
        let has_newline = memchr(b'\n', &self.src[start..end]).is_some();
        self.offset = end;
        if self.insert_semi && (has_newline || !terminated) {
            self.insert_semi = false;
            return Some(newline_semi);
        }
        None
    }

    fn scan_token(&mut self, c: u8) -> (Token, String, bool) {
        let start = self.offset;

        if is_letter_start(c) || c >= 0x80 {
            if c >= 0x80 {
                let (ch, _) = decode_char(&self.src[start..]);
                if !ch.is_alphabetic() {
                    self.offset += char_len(&self.src[start..]);
                    self.error(start, format!("invalid character {ch:?} in source"));
                    return (Token::Illegal, self.text(start), self.insert_semi);
                }
            }
            self.scan_identifier();
            let lit = self.text(start);
            return match lookup_keyword(&lit) {
                Some(kw) => {
                    let insert = matches!(
                        kw,
                        Token::Break | Token::Continue | Token::Fallthrough | Token::Return
                    );
                    (kw, lit, insert)
                }
                None => (Token::Ident, lit, true),
            };
        }

        if c.is_ascii_digit() || (c == b'.' && self.peek_byte(1).is_ascii_digit()) {
            let tok = self.scan_number();
            return (tok, self.text(start), true);
        }

        self.offset += 1;
        let (tok, insert) = match c {
            b'"' => {
                self.scan_string(start);
                return (Token::String, self.text(start), true);
            }
            b'`' => {
                self.scan_raw_string(start);
                return (Token::String, self.text(start), true);
            }
            b'\'' => {
                self.scan_char(start);
                return (Token::Char, self.text(start), true);
            }
            b'(' => (Token::LParen, false),
            b')' => (Token::RParen, true),
            b'[' => (Token::LBrack, false),
            b']' => (Token::RBrack, true),
            b'{' => (Token::LBrace, false),
            b'}' => (Token::RBrace, true),
            b',' => (Token::Comma, false),
            b';' => return (Token::Semicolon, ";".to_string(), false),
            b'~' => (Token::Tilde, false),
            b'.' => {
                if self.peek_byte(0) == b'.' && self.peek_byte(1) == b'.' {
                    self.offset += 2;
                    (Token::Ellipsis, false)
                } else {
                    (Token::Period, false)
                }
            }
            b':' => (self.switch2(Token::Colon, Token::Define), false),
            b'+' => {
                let tok = self.switch3(Token::Add, Token::AddAssign, b'+', Token::Inc);
                (tok, tok == Token::Inc)
            }
            b'-' => {
                let tok = self.switch3(Token::Sub, Token::SubAssign, b'-', Token::Dec);
                (tok, tok == Token::Dec)
            }
            b'*' => (self.switch2(Token::Mul, Token::MulAssign), false),
            b'/' => (self.switch2(Token::Quo, Token::QuoAssign), false),
            b'%' => (self.switch2(Token::Rem, Token::RemAssign), false),
            b'^' => (self.switch2(Token::Xor, Token::XorAssign), false),
            b'<' => {
                if self.peek_byte(0) == b'-' {
                    self.offset += 1;
                    (Token::Arrow, false)
                } else {
                    (
                        self.switch4(Token::Lss, Token::Leq, b'<', Token::Shl, Token::ShlAssign),
                        false,
                    )
                }
            }
            b'>' => (
                self.switch4(Token::Gtr, Token::Geq, b'>', Token::Shr, Token::ShrAssign),
                false,
            ),
            b'=' => (self.switch2(Token::Assign, Token::Eql), false),
            b'!' => (self.switch2(Token::Not, Token::Neq), false),
            b'&' => {
                if self.peek_byte(0) == b'^' {
                    self.offset += 1;
                    (self.switch2(Token::AndNot, Token::AndNotAssign), false)
                } else {
                    (
                        self.switch3(Token::And, Token::AndAssign, b'&', Token::LAnd),
                        false,
                    )
                }
            }
            b'|' => (
                self.switch3(Token::Or, Token::OrAssign, b'|', Token::LOr),
                false,
            ),
            _ => {
                self.error(start, format!("invalid character {:?} in source", c as char));
                return (Token::Illegal, self.text(start), self.insert_semi);
            }
        };
        (tok, String::new(), insert)
    }

    fn switch2(&mut self, plain: Token, with_eq: Token) -> Token {
        if self.peek_byte(0) == b'=' {
            self.offset += 1;
            return with_eq;
        }
        plain
    }

    fn switch3(&mut self, plain: Token, with_eq: Token, doubled: u8, double: Token) -> Token {
        if self.peek_byte(0) == b'=' {
            self.offset += 1;
            return with_eq;
        }
        if self.peek_byte(0) == doubled {
            self.offset += 1;
            return double;
        }
        plain
    }

    fn switch4(
        &mut self,
        plain: Token,
        with_eq: Token,
        doubled: u8,
        double: Token,
        double_eq: Token,
    ) -> Token {
        if self.peek_byte(0) == b'=' {
            self.offset += 1;
            return with_eq;
        }
        if self.peek_byte(0) == doubled {
            self.offset += 1;
            if self.peek_byte(0) == b'=' {
                self.offset += 1;
                return double_eq;
            }
            return double;
        }
        plain
    }

    fn scan_identifier(&mut self) {
        while let Some(&b) = self.src.get(self.offset) {
            if is_letter_start(b) || b.is_ascii_digit() {
                self.offset += 1;
            } else if b >= 0x80 {
                let (ch, len) = decode_char(&self.src[self.offset..]);
                if ch.is_alphanumeric() {
                    self.offset += len;
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    fn scan_digits(&mut self, hex: bool) {
        while let Some(&b) = self.src.get(self.offset) {
            if b == b'_' || b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.offset;
        let mut tok = Token::Int;
        let mut hex = false;

        if self.peek_byte(0) != b'.' {
            if self.peek_byte(0) == b'0' {
                match self.peek_byte(1).to_ascii_lowercase() {
                    b'x' => {
                        self.offset += 2;
                        hex = true;
                    }
                    b'b' | b'o' => self.offset += 2,
                    _ => {}
                }
            }
            self.scan_digits(hex);
        }

        if self.peek_byte(0) == b'.' && self.peek_byte(1) != b'.' {
            tok = Token::Float;
            self.offset += 1;
            self.scan_digits(hex);
        }

        let exp = self.peek_byte(0).to_ascii_lowercase();
        if (exp == b'e' && !hex) || (exp == b'p' && hex) {
            tok = Token::Float;
            self.offset += 1;
            if matches!(self.peek_byte(0), b'+' | b'-') {
                self.offset += 1;
            }
            if !self.peek_byte(0).is_ascii_digit() {
                self.error(start, "exponent has no digits");
            }
            self.scan_digits(false);
        }

        if self.peek_byte(0) == b'i' {
            self.offset += 1;
            tok = Token::Imag;
        }
        tok
    }

    fn scan_escape(&mut self, quote: u8) {
        let start = self.offset;
        let b = self.peek_byte(0);
        let digits = match b {
            b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' => {
                self.offset += 1;
                return;
            }
            _ if b == quote => {
                self.offset += 1;
                return;
            }
            b'0'..=b'7' => 3,
            b'x' => {
                self.offset += 1;
                2
            }
            b'u' => {
                self.offset += 1;
                4
            }
            b'U' => {
                self.offset += 1;
                8
            }
            _ => {
                self.error(start, "unknown escape sequence");
                return;
            }
        };
        for _ in 0..digits {
            if !self.peek_byte(0).is_ascii_hexdigit() {
                self.error(start, "illegal character in escape sequence");
                return;
            }
            self.offset += 1;
        }
    }

    fn scan_string(&mut self, start: usize) {
        loop {
            match self.src.get(self.offset) {
                None | Some(b'\n') => {
                    self.error(start, "string literal not terminated");
                    return;
                }
                Some(b'"') => {
                    self.offset += 1;
                    return;
                }
                Some(b'\\') => {
                    self.offset += 1;
                    self.scan_escape(b'"');
                }
                Some(_) => self.offset += 1,
            }
        }
    }

    fn scan_raw_string(&mut self, start: usize) {
        match memchr(b'`', &self.src[self.offset..]) {
            Some(idx) => self.offset += idx + 1,
            None => {
                self.offset = self.src.len();
                self.error(start, "raw string literal not terminated");
            }
        }
    }

    fn scan_char(&mut self, start: usize) {
        let mut count = 0;
        loop {
            match self.src.get(self.offset) {
                None | Some(b'\n') => {
                    self.error(start, "rune literal not terminated");
                    return;
                }
                Some(b'\'') => {
                    self.offset += 1;
                    break;
                }
                Some(b'\\') => {
                    self.offset += 1;
                    self.scan_escape(b'\'');
                }
                Some(_) => self.offset += char_len(&self.src[self.offset..]),
            }
            count += 1;
        }
        if count != 1 {
            self.error(start, "illegal rune literal");
        }
    }
}

fn is_letter_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn char_len(bytes: &[u8]) -> usize {
    decode_char(bytes).1
}

/// Decode one UTF-8 character, yielding U+FFFD and length 1 for invalid input.
fn decode_char(bytes: &[u8]) -> (char, usize) {
    let len = match bytes.first() {
        Some(b) if *b < 0x80 => 1,
        Some(b) if b >> 5 == 0b110 => 2,
        Some(b) if b >> 4 == 0b1110 => 3,
        Some(b) if b >> 3 == 0b11110 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    match bytes
        .get(..len)
        .and_then(|chunk| std::str::from_utf8(chunk).ok())
        .and_then(|s| s.chars().next())
    {
        Some(ch) => (ch, len),
        None => (char::REPLACEMENT_CHARACTER, 1),
    }
}
