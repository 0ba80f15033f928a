// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions driving a [`Visitor`] over the AST.
//!
//! Each `walk_*` function calls the visitor for its node and then walks the
//! children. `ControlFlow::Break` means a visitor returned
//! [`VisitResult::Stop`]; it propagates straight out of the walk.

use std::ops::ControlFlow;

use crate::nodes::{Block, Decl, Expr, ExprRef, Field, FieldList, File, FuncType, Spec, Stmt};

use super::traits::{VisitResult, Visitor};

/// Translate a visit result into "descend into children or not".
fn descend(result: VisitResult) -> ControlFlow<(), bool> {
    match result {
        VisitResult::Continue => ControlFlow::Continue(true),
        VisitResult::SkipChildren => ControlFlow::Continue(false),
        VisitResult::Stop => ControlFlow::Break(()),
    }
}

pub fn walk_file<V: Visitor + ?Sized>(v: &mut V, file: &File) -> ControlFlow<()> {
    if !descend(v.visit_file(file))? {
        return ControlFlow::Continue(());
    }
    descend(v.visit_ident(&file.name))?;
    for decl in &file.decls {
        walk_decl(v, decl)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, decl: &Decl) -> ControlFlow<()> {
    if !descend(v.visit_decl(decl))? {
        return ControlFlow::Continue(());
    }
    match decl {
        Decl::Bad { .. } => {}
        Decl::Gen(gen) => {
            for spec in &gen.specs {
                walk_spec(v, spec)?;
            }
        }
        Decl::Func(func) => {
            if let Some(recv) = &func.recv {
                walk_field_list(v, recv)?;
            }
            descend(v.visit_ident(&func.name))?;
            walk_func_type(v, &func.ty)?;
            if let Some(body) = &func.body {
                walk_block(v, body)?;
            }
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_spec<V: Visitor + ?Sized>(v: &mut V, spec: &Spec) -> ControlFlow<()> {
    if !descend(v.visit_spec(spec))? {
        return ControlFlow::Continue(());
    }
    match spec {
        Spec::Import(import) => {
            if let Some(name) = &import.name {
                descend(v.visit_ident(name))?;
            }
        }
        Spec::Value(value) => {
            for name in &value.names {
                descend(v.visit_ident(name))?;
            }
            if let Some(ty) = &value.ty {
                walk_expr(v, ty)?;
            }
            walk_exprs(v, &value.values)?;
        }
        Spec::Type(ty) => {
            descend(v.visit_ident(&ty.name))?;
            if let Some(params) = &ty.type_params {
                walk_field_list(v, params)?;
            }
            walk_expr(v, &ty.ty)?;
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) -> ControlFlow<()> {
    walk_stmts(v, &block.list)
}

fn walk_stmts<V: Visitor + ?Sized>(v: &mut V, stmts: &[Stmt]) -> ControlFlow<()> {
    for stmt in stmts {
        walk_stmt(v, stmt)?;
    }
    ControlFlow::Continue(())
}

fn walk_opt_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Option<Box<Stmt>>) -> ControlFlow<()> {
    match stmt {
        Some(stmt) => walk_stmt(v, stmt),
        None => ControlFlow::Continue(()),
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) -> ControlFlow<()> {
    if !descend(v.visit_stmt(stmt))? {
        return ControlFlow::Continue(());
    }
    match stmt {
        Stmt::Bad { .. } | Stmt::Empty { .. } => {}
        Stmt::Decl(decl) => walk_decl(v, decl)?,
        Stmt::Labeled { label, stmt, .. } => {
            descend(v.visit_ident(label))?;
            walk_stmt(v, stmt)?;
        }
        Stmt::Expr(x) => walk_expr(v, x)?,
        Stmt::Send { chan, value, .. } => {
            walk_expr(v, chan)?;
            walk_expr(v, value)?;
        }
        Stmt::IncDec { x, .. } => walk_expr(v, x)?,
        Stmt::Assign(assign) => {
            walk_exprs(v, &assign.lhs)?;
            walk_exprs(v, &assign.rhs)?;
        }
        Stmt::Go { call, .. } | Stmt::Defer { call, .. } => walk_expr(v, call)?,
        Stmt::Return { results, .. } => walk_exprs(v, results)?,
        Stmt::Branch { label, .. } => {
            if let Some(label) = label {
                descend(v.visit_ident(label))?;
            }
        }
        Stmt::Block(block) => walk_block(v, block)?,
        Stmt::If {
            init,
            cond,
            body,
            else_branch,
            ..
        } => {
            walk_opt_stmt(v, init)?;
            walk_expr(v, cond)?;
            walk_block(v, body)?;
            walk_opt_stmt(v, else_branch)?;
        }
        Stmt::CaseClause { list, body, .. } => {
            walk_exprs(v, list)?;
            walk_stmts(v, body)?;
        }
        Stmt::Switch {
            init, tag, body, ..
        } => {
            walk_opt_stmt(v, init)?;
            if let Some(tag) = tag {
                walk_expr(v, tag)?;
            }
            walk_block(v, body)?;
        }
        Stmt::TypeSwitch {
            init, assign, body, ..
        } => {
            walk_opt_stmt(v, init)?;
            walk_stmt(v, assign)?;
            walk_block(v, body)?;
        }
        Stmt::CommClause { comm, body, .. } => {
            walk_opt_stmt(v, comm)?;
            walk_stmts(v, body)?;
        }
        Stmt::Select { body, .. } => walk_block(v, body)?,
        Stmt::For {
            init,
            cond,
            post,
            body,
            ..
        } => {
            walk_opt_stmt(v, init)?;
            if let Some(cond) = cond {
                walk_expr(v, cond)?;
            }
            walk_opt_stmt(v, post)?;
            walk_block(v, body)?;
        }
        Stmt::Range {
            key,
            value,
            x,
            body,
            ..
        } => {
            for var in [key, value].into_iter().flatten() {
                walk_expr(v, var)?;
            }
            walk_expr(v, x)?;
            walk_block(v, body)?;
        }
    }
    ControlFlow::Continue(())
}

fn walk_exprs<V: Visitor + ?Sized>(v: &mut V, exprs: &[ExprRef]) -> ControlFlow<()> {
    for expr in exprs {
        walk_expr(v, expr)?;
    }
    ControlFlow::Continue(())
}

fn walk_opt_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Option<ExprRef>) -> ControlFlow<()> {
    match expr {
        Some(expr) => walk_expr(v, expr),
        None => ControlFlow::Continue(()),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &ExprRef) -> ControlFlow<()> {
    if !descend(v.visit_expr(expr))? {
        return ControlFlow::Continue(());
    }
    match &**expr {
        Expr::Bad { .. } | Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::Ellipsis { elt, .. } => walk_opt_expr(v, elt)?,
        Expr::FuncLit { ty, body } => {
            walk_func_type(v, ty)?;
            walk_block(v, body)?;
        }
        Expr::CompositeLit { ty, elts, .. } => {
            walk_opt_expr(v, ty)?;
            walk_exprs(v, elts)?;
        }
        Expr::Paren { x, .. } | Expr::Star { x, .. } | Expr::Unary { x, .. } => walk_expr(v, x)?,
        Expr::Selector { x, sel } => {
            walk_expr(v, x)?;
            descend(v.visit_ident(sel))?;
        }
        Expr::Index { x, indices, .. } => {
            walk_expr(v, x)?;
            walk_exprs(v, indices)?;
        }
        Expr::Slice {
            x, low, high, max, ..
        } => {
            walk_expr(v, x)?;
            walk_opt_expr(v, low)?;
            walk_opt_expr(v, high)?;
            walk_opt_expr(v, max)?;
        }
        Expr::TypeAssert { x, ty, .. } => {
            walk_expr(v, x)?;
            walk_opt_expr(v, ty)?;
        }
        Expr::Call { fun, args, .. } => {
            walk_expr(v, fun)?;
            walk_exprs(v, args)?;
        }
        Expr::Binary { x, y, .. } => {
            walk_expr(v, x)?;
            walk_expr(v, y)?;
        }
        Expr::KeyValue { key, value, .. } => {
            walk_expr(v, key)?;
            walk_expr(v, value)?;
        }
        Expr::ArrayType { len, elt, .. } => {
            walk_opt_expr(v, len)?;
            walk_expr(v, elt)?;
        }
        Expr::StructType { fields, .. } => walk_field_list(v, fields)?,
        Expr::FuncType(ty) => walk_func_type(v, ty)?,
        Expr::InterfaceType { methods, .. } => walk_field_list(v, methods)?,
        Expr::MapType { key, value, .. } => {
            walk_expr(v, key)?;
            walk_expr(v, value)?;
        }
        Expr::ChanType { value, .. } => walk_expr(v, value)?,
    }
    ControlFlow::Continue(())
}

pub fn walk_func_type<V: Visitor + ?Sized>(v: &mut V, ty: &FuncType) -> ControlFlow<()> {
    if let Some(params) = &ty.type_params {
        walk_field_list(v, params)?;
    }
    walk_field_list(v, &ty.params)?;
    if let Some(results) = &ty.results {
        walk_field_list(v, results)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_field_list<V: Visitor + ?Sized>(v: &mut V, list: &FieldList) -> ControlFlow<()> {
    for field in &list.list {
        walk_field(v, field)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_field<V: Visitor + ?Sized>(v: &mut V, field: &Field) -> ControlFlow<()> {
    if !descend(v.visit_field(field))? {
        return ControlFlow::Continue(());
    }
    for name in &field.names {
        descend(v.visit_ident(name))?;
    }
    walk_expr(v, &field.ty)
}
