// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Go parser.
//!
//! A hand-written recursive descent parser over [`Tokenizer`] output. It
//! builds the AST and, as it goes, declares objects into the scopes of the
//! [`Program`] and binds identifiers (see [`Resolution`]).
//!
//! Syntax errors are recorded and parsing continues; after
//! [`MAX_ERRORS`] errors the parser stops and returns what it has. Only a
//! missing or malformed package clause makes a parse fail outright.

mod declarations;
mod errors;
mod expressions;
mod statements;
mod types;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub use errors::ParseError;

use crate::literal::unquote;
use crate::nodes::{BasicLit, Decl, Expr, ExprRef, File, Ident, ImportSpec, Resolution, Spec};
use crate::program::Program;
use crate::scope::{ObjDecl, ObjId, ObjKind, ScopeId, ScopeKind};
use crate::token::{Pos, Token};
use crate::tokenizer::{Lexeme, Tokenizer};

/// Number of syntax errors after which parsing stops.
pub const MAX_ERRORS: usize = 10;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Full,
    /// Stop after the package clause.
    PackageClauseOnly,
}

/// Supplies the package name of an import path for imports without an
/// explicit name.
pub trait ImportNamer {
    fn import_name(&mut self, path: &str, src_dir: &Path) -> Option<String>;
}

#[derive(Default)]
pub struct ParseConfig<'n> {
    pub mode: ParseMode,
    /// Package scope to declare top-level objects into. A fresh scope whose
    /// outer scope is the universe is created when absent.
    pub package_scope: Option<ScopeId>,
    /// Import path recorded on every declared object.
    pub package_path: String,
    pub namer: Option<&'n mut dyn ImportNamer>,
    /// Register the file as builtin: its positions translate to nothing.
    pub builtin: bool,
}

impl<'n> ParseConfig<'n> {
    pub fn new() -> Self {
        ParseConfig::default()
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_package_scope(mut self, scope: ScopeId) -> Self {
        self.package_scope = Some(scope);
        self
    }

    pub fn with_package_path(mut self, path: impl Into<String>) -> Self {
        self.package_path = path.into();
        self
    }

    pub fn with_namer(mut self, namer: &'n mut dyn ImportNamer) -> Self {
        self.namer = Some(namer);
        self
    }
}

/// A parsed file and the syntax errors recovered from along the way.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub file: Rc<File>,
    pub errors: Vec<ParseError>,
}

// ============================================================================
// Entry points
// ============================================================================

/// Parse a Go source file, declaring its objects into `program`.
pub fn parse_file(
    program: &mut Program,
    filename: &str,
    src: &[u8],
    config: ParseConfig<'_>,
) -> Result<ParsedFile, ParseError> {
    let base = if config.builtin {
        program.fileset_mut().add_builtin_file(filename, src)
    } else {
        program.fileset_mut().add_file(filename, src)
    };
    let universe = program.universe();
    let package_scope = match config.package_scope {
        Some(scope) => scope,
        None => program.new_scope(ScopeKind::Package, Some(universe)),
    };
    let file_scope = program.new_scope(ScopeKind::File, Some(package_scope));
    let src_dir = Path::new(filename)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut parser = Parser::new(program, src, base, file_scope, package_scope);
    parser.package_path = config.package_path;
    parser.namer = config.namer;
    parser.src_dir = src_dir;

    let start = Pos(base);
    let end = Pos(base) + src.len();
    let Some((package_pos, name)) = parser.parse_package_clause() else {
        let (pos, message) = parser
            .errors
            .first()
            .cloned()
            .unwrap_or((start, "expected 'package'".to_string()));
        let position = parser.program.fileset().position(pos);
        return Err(ParseError::new(pos, position, message));
    };

    let mut decls = Vec::new();
    let mut imports = Vec::new();
    if config.mode == ParseMode::Full {
        while parser.tok == Token::Import {
            let decl = parser.parse_gen_decl(Token::Import);
            imports.extend(decl.specs.iter().filter_map(|spec| match spec {
                Spec::Import(import) => Some(import.clone()),
                _ => None,
            }));
            decls.push(Decl::Gen(decl));
        }
        while parser.tok != Token::Eof {
            let before = parser.pos;
            decls.push(parser.parse_decl());
            parser.ensure_progress(before);
        }
    }

    let errors = parser.finish();
    let file = File {
        filename: filename.to_string(),
        package_pos,
        name,
        decls,
        imports,
        file_scope,
        package_scope,
        start,
        end,
    };
    Ok(ParsedFile {
        file: Rc::new(file),
        errors,
    })
}

/// Parse `text` as a single expression whose identifiers are looked up from
/// `scope`.
pub fn parse_expr(program: &mut Program, scope: ScopeId, text: &str) -> Result<ExprRef, ParseError> {
    let base = program.fileset_mut().add_file("<expr>", text.as_bytes());
    let mut parser = Parser::new(program, text.as_bytes(), base, scope, scope);
    parser.next();
    let expr = parser.parse_expr();
    if parser.tok == Token::Semicolon && parser.lit == "\n" {
        parser.next();
    }
    if parser.tok != Token::Eof {
        let pos = parser.pos;
        parser.error_expected(pos, "end of expression");
    }
    match parser.finish().into_iter().next() {
        Some(err) => Err(err),
        None => Ok(expr),
    }
}

/// Read only the package clause of `src`.
pub fn parse_package_name(src: &[u8]) -> Option<String> {
    let mut tokenizer = Tokenizer::new(src, 1);
    if tokenizer.next_token().tok != Token::Package {
        return None;
    }
    let name = tokenizer.next_token();
    (name.tok == Token::Ident).then_some(name.lit)
}

/// The package name conventionally used for an import path: its last
/// element, skipping a major version suffix, trimmed to an identifier.
pub fn default_import_name(path: &str) -> String {
    let mut elems = path.rsplit('/').filter(|e| !e.is_empty());
    let mut last = elems.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(prev) = elems.next() {
            last = prev;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    let last = last.split('.').next().unwrap_or(last);
    let last = last.strip_suffix("-go").unwrap_or(last);
    last.replace('-', "_")
}

fn is_major_version(elem: &str) -> bool {
    elem.len() > 1
        && elem.starts_with('v')
        && elem[1..].bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Parser state
// ============================================================================

pub(crate) struct Parser<'p, 's, 'n> {
    program: &'p mut Program,
    tokenizer: Tokenizer<'s>,
    lookahead: VecDeque<Lexeme>,

    // Current token.
    pos: Pos,
    tok: Token,
    lit: String,

    errors: Vec<(Pos, String)>,
    bailed: bool,
    /// Below zero inside control clauses, where `T{` does not start a
    /// composite literal.
    expr_lev: i32,

    file_scope: ScopeId,
    package_scope: ScopeId,
    top_scope: ScopeId,
    label_scope: Option<ScopeId>,

    package_path: String,
    src_dir: PathBuf,
    namer: Option<&'n mut dyn ImportNamer>,
}

impl<'p, 's, 'n> Parser<'p, 's, 'n> {
    fn new(
        program: &'p mut Program,
        src: &'s [u8],
        base: u32,
        file_scope: ScopeId,
        package_scope: ScopeId,
    ) -> Self {
        Parser {
            program,
            tokenizer: Tokenizer::new(src, base),
            lookahead: VecDeque::new(),
            pos: Pos(base),
            tok: Token::Illegal,
            lit: String::new(),
            errors: Vec::new(),
            bailed: false,
            expr_lev: 0,
            file_scope,
            package_scope,
            top_scope: file_scope,
            label_scope: None,
            package_path: String::new(),
            src_dir: PathBuf::new(),
            namer: None,
        }
    }

    /// Collect recorded syntax and lexical errors, sorted by position.
    fn finish(&mut self) -> Vec<ParseError> {
        let mut raw: Vec<(Pos, String)> = self
            .tokenizer
            .take_errors()
            .into_iter()
            .map(|e| (e.pos, e.message))
            .collect();
        raw.append(&mut self.errors);
        raw.sort_by_key(|(pos, _)| *pos);
        raw.into_iter()
            .map(|(pos, message)| {
                let position = self.program.fileset().position(pos);
                ParseError::new(pos, position, message)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn next(&mut self) {
        if self.bailed {
            self.tok = Token::Eof;
            return;
        }
        let lexeme = match self.lookahead.pop_front() {
            Some(lexeme) => lexeme,
            None => self.tokenizer.next_token(),
        };
        self.pos = lexeme.pos;
        self.tok = lexeme.tok;
        self.lit = lexeme.lit;
    }

    /// The token `n` positions after the current one.
    fn peek(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let lexeme = self.tokenizer.next_token();
            self.lookahead.push_back(lexeme);
        }
        self.lookahead[n].tok
    }

    fn error(&mut self, pos: Pos, message: impl Into<String>) {
        if self.bailed {
            return;
        }
        if self.errors.last().is_some_and(|(last, _)| *last == pos) {
            return;
        }
        self.errors.push((pos, message.into()));
        if self.errors.len() >= MAX_ERRORS {
            self.bailed = true;
            self.tok = Token::Eof;
        }
    }

    fn error_expected(&mut self, pos: Pos, what: &str) {
        let mut message = format!("expected {what}");
        if pos == self.pos {
            if self.tok == Token::Semicolon && self.lit == "\n" {
                message.push_str(", found newline");
            } else if self.tok.is_literal() {
                message.push_str(&format!(", found {}", self.lit));
            } else {
                message.push_str(&format!(", found '{}'", self.tok));
            }
        }
        self.error(pos, message);
    }

    fn expect(&mut self, tok: Token) -> Pos {
        let pos = self.pos;
        if self.tok != tok {
            self.error_expected(pos, &format!("'{tok}'"));
        }
        self.next();
        pos
    }

    /// Like `expect`, with a clearer message for a missing comma before a
    /// newline in a list.
    fn expect_closing(&mut self, tok: Token, context: &str) -> Pos {
        if self.tok != tok && self.tok == Token::Semicolon && self.lit == "\n" {
            let pos = self.pos;
            self.error(pos, format!("missing ',' before newline in {context}"));
            self.next();
        }
        self.expect(tok)
    }

    fn expect_semi(&mut self) {
        match self.tok {
            Token::RParen | Token::RBrace => {}
            Token::Semicolon => self.next(),
            _ => {
                let pos = self.pos;
                self.error_expected(pos, "';'");
                self.advance_to_stmt_start();
            }
        }
    }

    /// Accept a comma in a list, reporting a missing one before a token that
    /// does not close the list.
    fn at_comma(&mut self, context: &str, closing: Token) -> bool {
        if self.tok == Token::Comma {
            return true;
        }
        if self.tok != closing && self.tok != Token::Eof {
            let pos = self.pos;
            let mut message = format!("missing ',' in {context}");
            if self.tok == Token::Semicolon && self.lit == "\n" {
                message.push_str(" before newline");
            }
            self.error(pos, message);
            return true;
        }
        false
    }

    fn advance_to_stmt_start(&mut self) {
        while !matches!(
            self.tok,
            Token::Eof
                | Token::Break
                | Token::Const
                | Token::Continue
                | Token::Defer
                | Token::Fallthrough
                | Token::For
                | Token::Go
                | Token::Goto
                | Token::If
                | Token::Return
                | Token::Select
                | Token::Switch
                | Token::Type
                | Token::Var
                | Token::Func
                | Token::RBrace
        ) {
            if self.tok == Token::Semicolon {
                self.next();
                return;
            }
            self.next();
        }
    }

    /// Skip the current token when parsing made no progress from `before`.
    fn ensure_progress(&mut self, before: Pos) {
        if self.pos == before && self.tok != Token::Eof {
            self.next();
        }
    }

    // ------------------------------------------------------------------------
    // Identifiers and scopes
    // ------------------------------------------------------------------------

    fn parse_ident(&mut self) -> Ident {
        let pos = self.pos;
        if self.tok == Token::Ident {
            let name = std::mem::take(&mut self.lit);
            self.next();
            Ident::new(name, pos)
        } else {
            self.expect(Token::Ident);
            Ident::new("_", pos)
        }
    }

    fn parse_ident_list(&mut self) -> Vec<Ident> {
        let mut list = vec![self.parse_ident()];
        while self.tok == Token::Comma {
            self.next();
            list.push(self.parse_ident());
        }
        list
    }

    /// Bind `ident` to a block-local object, or defer its lookup to the first
    /// non-local scope on the chain.
    fn resolve(&self, ident: &mut Ident) {
        if ident.is_blank() {
            return;
        }
        let mut scope = Some(self.top_scope);
        while let Some(id) = scope {
            let current = self.program.scope(id);
            if current.kind != ScopeKind::Local {
                ident.resolution = Resolution::Deferred(id);
                return;
            }
            if let Some(obj) = current.lookup(&ident.name) {
                ident.resolution = Resolution::Object(obj);
                return;
            }
            scope = current.outer;
        }
        ident.resolution = Resolution::Deferred(self.file_scope);
    }

    /// An identifier expression referring to whatever `ident` names.
    fn ident_expr(&self, mut ident: Ident) -> ExprRef {
        self.resolve(&mut ident);
        Rc::new(Expr::Ident(ident))
    }

    fn open_scope(&mut self) {
        self.top_scope = self
            .program
            .new_scope(ScopeKind::Local, Some(self.top_scope));
    }

    fn close_scope(&mut self) {
        self.top_scope = self
            .program
            .scope(self.top_scope)
            .outer
            .unwrap_or(self.file_scope);
    }

    /// The scope declarations at the current nesting level go into.
    fn decl_scope(&self) -> ScopeId {
        if self.top_scope == self.file_scope {
            self.package_scope
        } else {
            self.top_scope
        }
    }

    /// Create an object for `ident` without inserting it into any scope.
    fn new_object(&mut self, kind: ObjKind, ident: &mut Ident) -> Option<ObjId> {
        if ident.is_blank() {
            return None;
        }
        let id = self.program.new_object(
            kind,
            &ident.name,
            ident.pos,
            ObjDecl::Pending,
            &self.package_path,
        );
        ident.resolution = Resolution::Object(id);
        Some(id)
    }

    /// Declare `ident` in `scope`. Redeclarations leave the first object in
    /// the scope; the identifier still gets its own object.
    fn declare(&mut self, kind: ObjKind, scope: ScopeId, ident: &mut Ident) -> Option<ObjId> {
        let id = self.new_object(kind, ident)?;
        self.program.declare(scope, id);
        Some(id)
    }

    fn set_decls(&mut self, ids: &[Option<ObjId>], decl: impl Fn(usize) -> ObjDecl) {
        for (index, id) in ids.iter().enumerate() {
            if let Some(id) = id {
                self.program.set_decl(*id, decl(index));
            }
        }
    }

    fn import_name(&mut self, path: &str) -> String {
        let src_dir = self.src_dir.clone();
        self.namer
            .as_mut()
            .and_then(|namer| namer.import_name(path, &src_dir))
            .unwrap_or_else(|| default_import_name(path))
    }

    // ------------------------------------------------------------------------
    // Package clause and imports
    // ------------------------------------------------------------------------

    fn parse_package_clause(&mut self) -> Option<(Pos, Ident)> {
        self.next();
        if self.tok != Token::Package {
            let pos = self.pos;
            self.error_expected(pos, "'package'");
            return None;
        }
        let package_pos = self.pos;
        self.next();
        if self.tok != Token::Ident {
            let pos = self.pos;
            self.error_expected(pos, "package name");
            return None;
        }
        let name = self.parse_ident();
        if name.is_blank() {
            self.error(name.pos, "invalid package name _");
        }
        self.expect_semi();
        Some((package_pos, name))
    }

    fn declare_import(&mut self, mut name: Option<Ident>, path: BasicLit) -> Rc<ImportSpec> {
        let import_path = unquote(&path.value).unwrap_or_default();
        let local = match &name {
            Some(ident) => ident.name.clone(),
            None if import_path.is_empty() => String::new(),
            None => self.import_name(&import_path),
        };

        let mut obj = None;
        if !local.is_empty() && local != "." && local != "_" {
            let pos = name.as_ref().map_or(path.pos, |n| n.pos);
            let id = self.program.new_object(
                ObjKind::Pkg,
                &local,
                pos,
                ObjDecl::Pending,
                &self.package_path,
            );
            self.program.declare(self.file_scope, id);
            if let Some(ident) = name.as_mut() {
                ident.resolution = Resolution::Object(id);
            }
            obj = Some(id);
        }

        let spec = Rc::new(ImportSpec { name, path });
        if let Some(id) = obj {
            self.program.set_decl(id, ObjDecl::Import(spec.clone()));
        }
        if local == "." {
            self.program
                .scope_mut(self.file_scope)
                .dot_imports
                .push(spec.clone());
        }
        spec
    }
}

#[cfg(test)]
mod tests;
