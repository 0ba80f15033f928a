//! Shared types for definition results.
//!
//! These types are used across all godef crates and form the output
//! contract of a query.

use std::fmt;

use serde::Serialize;

// ============================================================================
// Position
// ============================================================================

/// A source location with 1-indexed line and byte column.
///
/// The empty position (no filename, line 0) stands for declarations without
/// source, such as predeclared identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub line: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub column: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Position {
    pub fn new(filename: impl Into<String>, line: u32, column: u32) -> Self {
        Position {
            filename: filename.into(),
            line,
            column,
        }
    }

    /// True when the position carries neither a filename nor a line.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.line == 0
    }
}

/// Renders `file:line:col`, `line:col`, `file`, or `-`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_file = !self.filename.is_empty();
        let has_line = self.line > 0;
        match (has_file, has_line) {
            (true, true) => write!(f, "{}:{}:{}", self.filename, self.line, self.column),
            (false, true) => write!(f, "{}:{}", self.line, self.column),
            (true, false) => f.write_str(&self.filename),
            (false, false) => f.write_str("-"),
        }
    }
}

// ============================================================================
// Kind
// ============================================================================

/// What a definition denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bad,
    Func,
    Var,
    Import,
    Const,
    Label,
    Type,
    /// A resolved import path; the value holds the package directory.
    Path,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bad => "bad",
            Kind::Func => "func",
            Kind::Var => "var",
            Kind::Import => "import",
            Kind::Const => "const",
            Kind::Label => "label",
            Kind::Type => "type",
            Kind::Path => "path",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Definition
// ============================================================================

/// The resolved declaration of a queried identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub name: String,
    pub kind: Kind,
    /// Import path of the declaring package; empty for the queried package
    /// and for predeclared identifiers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pkg: String,
    pub position: Position,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Definition>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_str: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Definition {
    pub fn new(name: impl Into<String>, kind: Kind, position: Position) -> Self {
        Definition {
            name: name.into(),
            kind,
            pkg: String::new(),
            position,
            members: Vec::new(),
            type_str: None,
            value: None,
        }
    }

    /// A `path` definition for a resolved import directory.
    pub fn path(dir: impl Into<String>) -> Self {
        Definition {
            value: Some(dir.into()),
            ..Definition::new(String::new(), Kind::Path, Position::default())
        }
    }
}
