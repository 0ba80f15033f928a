// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for AST traversal.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order**
//! - Children are visited in source order
//! - [`VisitResult::Stop`] ends the whole walk; the walk function returns
//!   `ControlFlow::Break(())`
//!
//! ```ignore
//! use godef_syntax::visitor::{walk_file, VisitResult, Visitor};
//!
//! struct CallCounter {
//!     count: usize,
//! }
//!
//! impl Visitor for CallCounter {
//!     fn visit_expr(&mut self, node: &ExprRef) -> VisitResult {
//!         if matches!(**node, Expr::Call { .. }) {
//!             self.count += 1;
//!         }
//!         VisitResult::Continue
//!     }
//! }
//! ```

mod traits;
mod walk;

pub use traits::{VisitResult, Visitor};
pub use walk::{
    walk_block, walk_decl, walk_expr, walk_field, walk_field_list, walk_file, walk_func_type,
    walk_spec, walk_stmt,
};
