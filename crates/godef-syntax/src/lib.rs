// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Go tokenizer, parser and scope builder.
//!
//! # Overview
//!
//! - **Positions**: every file parsed during an invocation is registered in
//!   the [`FileSet`] owned by a [`Program`]; a [`Pos`] translates to a
//!   filename, line and column through it.
//! - **Parsing**: [`parse_file`] builds the AST of one file and declares its
//!   objects into the program's scopes; [`parse_expr`] parses a lone
//!   expression against an existing scope.
//! - **Scopes**: objects and scopes live in arenas inside the [`Program`].
//!   Identifiers bound to block-local objects carry the object; everything
//!   else is looked up lazily from a starting scope (see [`Resolution`]).
//! - **Traversal**: [`visitor`] provides a pre-order walk with early exit.
//! - **Rendering**: [`print_expr`] renders expressions and types in gofmt
//!   style.
//!
//! # Quick Start
//!
//! ```
//! use godef_syntax::{parse_file, ParseConfig, Program};
//!
//! let mut program = Program::new();
//! let src = b"package main\n\nfunc main() {}\n";
//! let parsed = parse_file(&mut program, "main.go", src, ParseConfig::default()).unwrap();
//! assert!(parsed.errors.is_empty());
//! assert!(program.scope(parsed.file.package_scope).lookup("main").is_some());
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

pub mod fileset;
pub use fileset::{FileSet, SourceFileInfo};

pub mod literal;
pub use literal::{unquote, UnquoteError};

pub mod nodes;
pub use nodes::{
    AssignStmt, BasicLit, Block, ChanDir, Decl, Expr, ExprRef, Field, FieldList, File, FuncDecl,
    FuncType, GenDecl, Ident, ImportSpec, Resolution, Spec, Stmt, TypeSpec, ValueSpec,
};

pub mod parser;
pub use parser::{
    default_import_name, parse_expr, parse_file, parse_package_name, ImportNamer, ParseConfig,
    ParseError, ParseMode, ParsedFile, MAX_ERRORS,
};

pub mod printer;
pub use printer::{print_expr, print_signature};

pub mod program;
pub use program::Program;

pub mod scope;
pub use scope::{ObjDecl, ObjId, ObjKind, Object, Scope, ScopeId, ScopeKind};

pub mod token;
pub use token::{Pos, Token};

pub mod tokenizer;

pub mod universe;
pub use universe::is_basic_type;

pub mod visitor;
pub use visitor::{VisitResult, Visitor};
