//! Node lookup: finding the identifier, selector or import at a byte offset.
//!
//! The locator walks the file once, depth first, and stops at the first
//! node whose span contains the offset. Spans are inclusive at both ends, so
//! an offset just past the last character of an identifier still finds it.

use std::ops::ControlFlow;
use std::rc::Rc;

use godef_core::GodefError;
use godef_syntax::visitor::walk_file;
use godef_syntax::{
    parse_expr, Expr, ExprRef, FieldList, File, Ident, ImportSpec, Pos, Program, ScopeId, Spec,
    VisitResult, Visitor,
};
use thiserror::Error;
use tracing::trace;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    /// Nothing resolvable at the offset.
    #[error("no identifier found")]
    NotFound {
        offset: usize,
        /// Character at the offset, for diagnostics.
        char_at_offset: Option<char>,
    },

    /// A query expression that is neither an identifier nor a selector.
    #[error("no identifier found in expression")]
    NotAnIdentifier,

    /// The type name of an embedded field did not parse as an expression.
    #[error("cannot parse embedded field {name}: {message}")]
    EmbeddedField { name: String, message: String },
}

impl From<LocateError> for GodefError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::NotFound { .. } => GodefError::NotFound,
            LocateError::NotAnIdentifier | LocateError::EmbeddedField { .. } => {
                GodefError::unresolvable(err.to_string())
            }
        }
    }
}

pub type LocateResult<T> = Result<T, LocateError>;

// ============================================================================
// Located nodes
// ============================================================================

/// A node a definition can be looked up for.
#[derive(Debug, Clone)]
pub enum ResolvedNode {
    Identifier(ExprRef),
    /// A whole `x.sel` expression.
    Selector(ExprRef),
    Import(Rc<ImportSpec>),
}

impl ResolvedNode {
    /// The expression to infer, unless this is an import.
    pub fn expr(&self) -> Option<&ExprRef> {
        match self {
            ResolvedNode::Identifier(expr) | ResolvedNode::Selector(expr) => Some(expr),
            ResolvedNode::Import(_) => None,
        }
    }

    /// Classify a parsed query expression.
    pub fn from_expr(expr: ExprRef) -> LocateResult<Self> {
        match &*expr {
            Expr::Ident(_) => Ok(ResolvedNode::Identifier(expr)),
            Expr::Selector { .. } => Ok(ResolvedNode::Selector(expr)),
            _ => Err(LocateError::NotAnIdentifier),
        }
    }
}

/// Find the node at byte `offset` of `file`, whose source is `src`.
pub fn locate(
    program: &mut Program,
    file: &File,
    src: &[u8],
    offset: usize,
) -> LocateResult<ResolvedNode> {
    if offset <= src.len() {
        let mut locator = Locator {
            program,
            file_scope: file.file_scope,
            target: file.start + offset,
            found: None,
        };
        if let ControlFlow::Break(()) = walk_file(&mut locator, file) {
            if let Some(found) = locator.found {
                return found;
            }
        }
    }
    let char_at_offset = src
        .get(offset..)
        .and_then(|rest| String::from_utf8_lossy(&rest[..rest.len().min(4)]).chars().next());
    Err(LocateError::NotFound {
        offset,
        char_at_offset,
    })
}

struct Locator<'a> {
    program: &'a mut Program,
    file_scope: ScopeId,
    target: Pos,
    found: Option<LocateResult<ResolvedNode>>,
}

impl Locator<'_> {
    fn contains(&self, start: Pos, end: Pos) -> bool {
        start <= self.target && self.target <= end
    }

    fn found(&mut self, found: LocateResult<ResolvedNode>) -> VisitResult {
        trace!(?found, "located node");
        self.found = Some(found);
        VisitResult::Stop
    }

    /// An anonymous struct field of type `T` or `*T` names the type `T`,
    /// looked up from the file scope.
    fn embedded_field(&mut self, fields: &FieldList) -> Option<LocateResult<ResolvedNode>> {
        for field in fields.list.iter().filter(|f| f.names.is_empty()) {
            let ident = match &*field.ty {
                Expr::Ident(ident) => ident,
                Expr::Star { x, .. } => match &**x {
                    Expr::Ident(ident) => ident,
                    _ => continue,
                },
                _ => continue,
            };
            if !self.contains(ident.pos, ident.end()) {
                continue;
            }
            let found = parse_expr(self.program, self.file_scope, &ident.name)
                .map(ResolvedNode::Identifier)
                .map_err(|err| LocateError::EmbeddedField {
                    name: ident.name.clone(),
                    message: err.to_string(),
                });
            return Some(found);
        }
        None
    }
}

impl Visitor for Locator<'_> {
    fn visit_spec(&mut self, node: &Spec) -> VisitResult {
        match node {
            Spec::Import(import) if self.contains(import.pos(), import.end()) => {
                self.found(Ok(ResolvedNode::Import(import.clone())))
            }
            _ => VisitResult::Continue,
        }
    }

    fn visit_expr(&mut self, node: &ExprRef) -> VisitResult {
        match &**node {
            Expr::Ident(ident) if self.contains(ident.pos, ident.end()) => {
                self.found(Ok(ResolvedNode::Identifier(node.clone())))
            }
            Expr::Selector { sel, .. } if self.contains(sel.pos, sel.end()) => {
                self.found(Ok(ResolvedNode::Selector(node.clone())))
            }
            Expr::StructType { fields, .. } => match self.embedded_field(fields) {
                Some(found) => self.found(found),
                None => VisitResult::Continue,
            },
            _ => VisitResult::Continue,
        }
    }

    fn visit_ident(&mut self, node: &Ident) -> VisitResult {
        if self.contains(node.pos, node.end()) {
            return self.found(Ok(ResolvedNode::Identifier(Rc::new(Expr::Ident(node.clone())))));
        }
        VisitResult::Continue
    }
}
