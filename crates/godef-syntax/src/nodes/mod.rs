// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Go abstract syntax tree.
//!
//! Expression children are shared through [`ExprRef`]. Declaring nodes that
//! objects point back at (value, type and import specs, function
//! declarations, fields) are held in `Rc` so an object's declaration can be
//! reached without borrowing the whole file.

mod expression;
mod statement;

pub use expression::{
    BasicLit, ChanDir, Expr, ExprRef, Field, FieldList, FuncType, Ident, Resolution,
};
pub use statement::{
    AssignStmt, Block, Decl, File, FuncDecl, GenDecl, ImportSpec, Spec, Stmt, TypeSpec,
    ValueSpec,
};
