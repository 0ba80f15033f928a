// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definitions for AST traversal.

use crate::nodes::{Decl, ExprRef, Field, File, Ident, Spec, Stmt};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    SkipChildren,

    /// Stop traversal entirely. The walk function returns
    /// `ControlFlow::Break` immediately.
    Stop,
}

/// Read-only AST visitor.
///
/// Every method defaults to [`VisitResult::Continue`]; implement only the
/// node kinds of interest. Traversal is depth-first and pre-order, children
/// in source order.
pub trait Visitor {
    fn visit_file(&mut self, _node: &File) -> VisitResult {
        VisitResult::Continue
    }

    fn visit_decl(&mut self, _node: &Decl) -> VisitResult {
        VisitResult::Continue
    }

    fn visit_spec(&mut self, _node: &Spec) -> VisitResult {
        VisitResult::Continue
    }

    fn visit_stmt(&mut self, _node: &Stmt) -> VisitResult {
        VisitResult::Continue
    }

    fn visit_expr(&mut self, _node: &ExprRef) -> VisitResult {
        VisitResult::Continue
    }

    fn visit_field(&mut self, _node: &Field) -> VisitResult {
        VisitResult::Continue
    }

    /// Identifiers that are not expressions: declared names, field names,
    /// labels and the package name.
    fn visit_ident(&mut self, _node: &Ident) -> VisitResult {
        VisitResult::Continue
    }
}
