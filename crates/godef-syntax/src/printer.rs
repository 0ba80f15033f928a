// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rendering of expressions and type expressions in gofmt style.
//!
//! ```text
//! struct {
//!     A int
//! }
//! func(a int) (string, error)
//! map[string][]int
//! <-chan T
//! ```
//!
//! Struct and interface bodies are indented with tabs. Function literal
//! bodies are elided as `{...}`.

use crate::nodes::{ChanDir, Expr, ExprRef, Field, FieldList, FuncType};
use crate::token::Token;

/// Render an expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

/// Render a function signature without the `func` keyword, as used for
/// interface methods: `(x int) string`.
pub fn print_signature(ty: &FuncType) -> String {
    let mut printer = Printer::default();
    printer.signature(ty);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn list(&mut self, exprs: &[ExprRef]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Bad { .. } => self.out.push_str("BadExpr"),
            Expr::Ident(ident) => self.out.push_str(&ident.name),
            Expr::Ellipsis { elt, .. } => {
                self.out.push_str("...");
                if let Some(elt) = elt {
                    self.expr(elt);
                }
            }
            Expr::BasicLit(lit) => self.out.push_str(&lit.value),
            Expr::FuncLit { ty, .. } => {
                self.out.push_str("func");
                self.signature(ty);
                self.out.push_str(" {...}");
            }
            Expr::CompositeLit { ty, elts, .. } => {
                if let Some(ty) = ty {
                    self.expr(ty);
                }
                self.out.push('{');
                self.list(elts);
                self.out.push('}');
            }
            Expr::Paren { x, .. } => {
                self.out.push('(');
                self.expr(x);
                self.out.push(')');
            }
            Expr::Selector { x, sel } => {
                self.expr(x);
                self.out.push('.');
                self.out.push_str(&sel.name);
            }
            Expr::Index { x, indices, .. } => {
                self.expr(x);
                self.out.push('[');
                self.list(indices);
                self.out.push(']');
            }
            Expr::Slice {
                x,
                low,
                high,
                max,
                slice3,
                ..
            } => {
                self.expr(x);
                self.out.push('[');
                if let Some(low) = low {
                    self.expr(low);
                }
                self.out.push(':');
                if let Some(high) = high {
                    self.expr(high);
                }
                if *slice3 {
                    self.out.push(':');
                    if let Some(max) = max {
                        self.expr(max);
                    }
                }
                self.out.push(']');
            }
            Expr::TypeAssert { x, ty, .. } => {
                self.expr(x);
                self.out.push_str(".(");
                match ty {
                    Some(ty) => self.expr(ty),
                    None => self.out.push_str("type"),
                }
                self.out.push(')');
            }
            Expr::Call {
                fun,
                args,
                ellipsis,
                ..
            } => {
                self.expr(fun);
                self.out.push('(');
                self.list(args);
                if ellipsis.is_valid() {
                    self.out.push_str("...");
                }
                self.out.push(')');
            }
            Expr::Star { x, .. } => {
                self.out.push('*');
                self.expr(x);
            }
            Expr::Unary { op, x, .. } => {
                if *op != Token::Range {
                    self.out.push_str(op.as_str());
                } else {
                    self.out.push_str("range ");
                }
                self.expr(x);
            }
            Expr::Binary { x, op, y, .. } => {
                self.expr(x);
                self.out.push(' ');
                self.out.push_str(op.as_str());
                self.out.push(' ');
                self.expr(y);
            }
            Expr::KeyValue { key, value, .. } => {
                self.expr(key);
                self.out.push_str(": ");
                self.expr(value);
            }
            Expr::ArrayType { len, elt, .. } => {
                self.out.push('[');
                if let Some(len) = len {
                    self.expr(len);
                }
                self.out.push(']');
                self.expr(elt);
            }
            Expr::StructType { fields, .. } => self.struct_type(fields),
            Expr::FuncType(ty) => {
                self.out.push_str("func");
                self.signature(ty);
            }
            Expr::InterfaceType { methods, .. } => self.interface_type(methods),
            Expr::MapType { key, value, .. } => {
                self.out.push_str("map[");
                self.expr(key);
                self.out.push(']');
                self.expr(value);
            }
            Expr::ChanType { dir, value, .. } => {
                self.out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
        }
    }

    fn struct_type(&mut self, fields: &FieldList) {
        if fields.is_empty() {
            self.out.push_str("struct{}");
            return;
        }
        self.out.push_str("struct {");
        self.indent += 1;
        for field in &fields.list {
            self.newline();
            self.names(field);
            if !field.names.is_empty() {
                self.out.push(' ');
            }
            self.expr(&field.ty);
            if let Some(tag) = &field.tag {
                self.out.push(' ');
                self.out.push_str(&tag.value);
            }
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn interface_type(&mut self, methods: &FieldList) {
        if methods.is_empty() {
            self.out.push_str("interface{}");
            return;
        }
        self.out.push_str("interface {");
        self.indent += 1;
        for field in &methods.list {
            self.newline();
            match (&*field.ty, field.names.first()) {
                (Expr::FuncType(ty), Some(name)) => {
                    self.out.push_str(&name.name);
                    self.signature(ty);
                }
                _ => self.expr(&field.ty),
            }
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn names(&mut self, field: &Field) {
        for (i, name) in field.names.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&name.name);
        }
    }

    fn fields(&mut self, list: &FieldList) {
        for (i, field) in list.list.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.names(field);
            if !field.names.is_empty() {
                self.out.push(' ');
            }
            self.expr(&field.ty);
        }
    }

    fn signature(&mut self, ty: &FuncType) {
        if let Some(params) = &ty.type_params {
            self.out.push('[');
            self.fields(params);
            self.out.push(']');
        }
        self.out.push('(');
        self.fields(&ty.params);
        self.out.push(')');

        let Some(results) = &ty.results else {
            return;
        };
        if results.is_empty() {
            return;
        }
        self.out.push(' ');
        let single_unnamed = results.list.len() == 1 && results.list[0].names.is_empty();
        if single_unnamed {
            self.expr(&results.list[0].ty);
        } else {
            self.out.push('(');
            self.fields(results);
            self.out.push(')');
        }
    }
}
