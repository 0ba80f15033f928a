// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Go tokens and source positions.

use std::fmt;
use std::ops::Add;

// ============================================================================
// Pos
// ============================================================================

/// A compact source position: a file's base plus a byte offset into it.
///
/// Positions are only meaningful relative to the [`FileSet`](crate::FileSet)
/// that issued the file base. `Pos::NONE` is the "no position" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(pub u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Add<usize> for Pos {
    type Output = Pos;

    fn add(self, rhs: usize) -> Pos {
        if !self.is_valid() {
            return self;
        }
        // Saturates: a position past the table lies outside every file.
        u32::try_from(rhs)
            .ok()
            .and_then(|rhs| self.0.checked_add(rhs))
            .map_or(Pos(u32::MAX), Pos)
    }
}

// ============================================================================
// Token
// ============================================================================

/// Lexical token kinds of the Go language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Illegal,
    Eof,

    // Literals
    Ident,
    Int,
    Float,
    Imag,
    Char,
    String,

    // Operators and delimiters
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,
    Eql,
    Lss,
    Gtr,
    Assign,
    Not,
    Neq,
    Leq,
    Geq,
    Define,
    Ellipsis,
    LParen,
    LBrack,
    LBrace,
    Comma,
    Period,
    RParen,
    RBrack,
    RBrace,
    Semicolon,
    Colon,
    Tilde,

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

/// Binary operator precedence of the lowest level (`||`).
pub const LOWEST_PREC: u8 = 0;

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Token::Illegal => "ILLEGAL",
            Token::Eof => "EOF",
            Token::Ident => "IDENT",
            Token::Int => "INT",
            Token::Float => "FLOAT",
            Token::Imag => "IMAG",
            Token::Char => "CHAR",
            Token::String => "STRING",
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Quo => "/",
            Token::Rem => "%",
            Token::And => "&",
            Token::Or => "|",
            Token::Xor => "^",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::AndNot => "&^",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::QuoAssign => "/=",
            Token::RemAssign => "%=",
            Token::AndAssign => "&=",
            Token::OrAssign => "|=",
            Token::XorAssign => "^=",
            Token::ShlAssign => "<<=",
            Token::ShrAssign => ">>=",
            Token::AndNotAssign => "&^=",
            Token::LAnd => "&&",
            Token::LOr => "||",
            Token::Arrow => "<-",
            Token::Inc => "++",
            Token::Dec => "--",
            Token::Eql => "==",
            Token::Lss => "<",
            Token::Gtr => ">",
            Token::Assign => "=",
            Token::Not => "!",
            Token::Neq => "!=",
            Token::Leq => "<=",
            Token::Geq => ">=",
            Token::Define => ":=",
            Token::Ellipsis => "...",
            Token::LParen => "(",
            Token::LBrack => "[",
            Token::LBrace => "{",
            Token::Comma => ",",
            Token::Period => ".",
            Token::RParen => ")",
            Token::RBrack => "]",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Tilde => "~",
            Token::Break => "break",
            Token::Case => "case",
            Token::Chan => "chan",
            Token::Const => "const",
            Token::Continue => "continue",
            Token::Default => "default",
            Token::Defer => "defer",
            Token::Else => "else",
            Token::Fallthrough => "fallthrough",
            Token::For => "for",
            Token::Func => "func",
            Token::Go => "go",
            Token::Goto => "goto",
            Token::If => "if",
            Token::Import => "import",
            Token::Interface => "interface",
            Token::Map => "map",
            Token::Package => "package",
            Token::Range => "range",
            Token::Return => "return",
            Token::Select => "select",
            Token::Struct => "struct",
            Token::Switch => "switch",
            Token::Type => "type",
            Token::Var => "var",
        }
    }

    /// Binary operator precedence, or 0 for tokens that are not binary operators.
    pub fn precedence(self) -> u8 {
        match self {
            Token::LOr => 1,
            Token::LAnd => 2,
            Token::Eql | Token::Neq | Token::Lss | Token::Leq | Token::Gtr | Token::Geq => 3,
            Token::Add | Token::Sub | Token::Or | Token::Xor => 4,
            Token::Mul
            | Token::Quo
            | Token::Rem
            | Token::Shl
            | Token::Shr
            | Token::And
            | Token::AndNot => 5,
            _ => LOWEST_PREC,
        }
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::Ident | Token::Int | Token::Float | Token::Imag | Token::Char | Token::String
        )
    }

    pub fn is_keyword(self) -> bool {
        lookup_keyword(self.as_str()).is_some()
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Token::Eql | Token::Neq | Token::Lss | Token::Leq | Token::Gtr | Token::Geq
        )
    }

    /// Assignment operators accepted in simple statements.
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            Token::Assign
                | Token::Define
                | Token::AddAssign
                | Token::SubAssign
                | Token::MulAssign
                | Token::QuoAssign
                | Token::RemAssign
                | Token::AndAssign
                | Token::OrAssign
                | Token::XorAssign
                | Token::ShlAssign
                | Token::ShrAssign
                | Token::AndNotAssign
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a keyword spelling to its token.
pub fn lookup_keyword(word: &str) -> Option<Token> {
    let tok = match word {
        "break" => Token::Break,
        "case" => Token::Case,
        "chan" => Token::Chan,
        "const" => Token::Const,
        "continue" => Token::Continue,
        "default" => Token::Default,
        "defer" => Token::Defer,
        "else" => Token::Else,
        "fallthrough" => Token::Fallthrough,
        "for" => Token::For,
        "func" => Token::Func,
        "go" => Token::Go,
        "goto" => Token::Goto,
        "if" => Token::If,
        "import" => Token::Import,
        "interface" => Token::Interface,
        "map" => Token::Map,
        "package" => Token::Package,
        "range" => Token::Range,
        "return" => Token::Return,
        "select" => Token::Select,
        "struct" => Token::Struct,
        "switch" => Token::Switch,
        "type" => Token::Type,
        "var" => Token::Var,
        _ => return None,
    };
    Some(tok)
}
