//! Type inference over parsed Go source.
//!
//! Inference works on the syntax tree directly: a [`Type`] is a type
//! expression from the source (or a tuple of them, or an imported package)
//! together with what the inferred expression denotes. Identifiers inside a
//! type expression carry their own resolution, so a type can be followed to
//! its definition from anywhere.
//!
//! # Quick Start
//!
//! ```ignore
//! let mut checker = Checker::new(&mut program, &mut importer);
//! let (obj, typ) = checker.expr_object(&expr);
//! ```
//!
//! Imports are parsed lazily, the first time a selector needs them.
//! Recursion through declarations is bounded by [`MAX_DEPTH`]; cyclic
//! declarations infer no type.

mod infer;
mod members;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use godef_syntax::{
    unquote, Expr, ExprRef, Ident, ImportSpec, ObjId, ObjKind, Pos, Program, Resolution, ScopeId,
};
use tracing::{debug, trace};

use crate::importer::Importer;

/// Nesting limit for inference through declarations.
pub const MAX_DEPTH: usize = 64;

/// The shape of an inferred type.
#[derive(Debug, Clone)]
pub enum TypeNode {
    None,
    /// A type expression.
    Expr(ExprRef),
    /// The results of a call returning several values.
    Tuple(Vec<ExprRef>),
    /// An imported package.
    Package(ScopeId),
}

/// An inferred type and what the expression denotes: a type (`Typ`), a
/// value (`Var`), a constant (`Con`), a function (`Fun`) or a package
/// (`Pkg`).
#[derive(Debug, Clone)]
pub struct Type {
    pub node: TypeNode,
    pub kind: ObjKind,
}

impl Type {
    pub fn none() -> Self {
        Type {
            node: TypeNode::None,
            kind: ObjKind::Bad,
        }
    }

    pub fn new(expr: ExprRef, kind: ObjKind) -> Self {
        Type {
            node: TypeNode::Expr(expr),
            kind,
        }
    }

    pub fn value(expr: ExprRef) -> Self {
        Type::new(expr, ObjKind::Var)
    }

    pub fn of_type(expr: ExprRef) -> Self {
        Type::new(expr, ObjKind::Typ)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.node, TypeNode::None)
    }

    /// The type expression, unless this is a tuple, package or nothing.
    pub fn expr(&self) -> Option<&ExprRef> {
        match &self.node {
            TypeNode::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn with_kind(mut self, kind: ObjKind) -> Self {
        if !self.is_none() {
            self.kind = kind;
        }
        self
    }

    /// The type of a value of this type.
    pub fn into_value(self) -> Self {
        self.with_kind(ObjKind::Var)
    }
}

pub struct Checker<'a> {
    program: &'a mut Program,
    importer: &'a mut Importer,
    depth: usize,
}

impl<'a> Checker<'a> {
    pub fn new(program: &'a mut Program, importer: &'a mut Importer) -> Self {
        Checker {
            program,
            importer,
            depth: 0,
        }
    }

    pub fn program(&self) -> &Program {
        self.program
    }

    /// The declaring object and type of an identifier or selector.
    ///
    /// Other expressions have no declaring object; only their type is
    /// inferred.
    pub fn expr_object(&mut self, expr: &ExprRef) -> (Option<ObjId>, Type) {
        match &**expr {
            Expr::Ident(ident) => match self.lookup_ident(ident) {
                Some(id) => (Some(id), self.object_type(id)),
                None => (None, Type::none()),
            },
            Expr::Selector { x, sel } => self.selector(x, sel),
            Expr::Paren { x, .. } => self.expr_object(x),
            _ => (None, self.expr_type(expr)),
        }
    }

    fn selector(&mut self, x: &ExprRef, sel: &Ident) -> (Option<ObjId>, Type) {
        let base = self.expr_type(x);
        let found = match base.node {
            TypeNode::Package(scope) => self.program.scope(scope).lookup(&sel.name),
            _ => self.member(&base, &sel.name),
        };
        match found {
            Some(id) => (Some(id), self.object_type(id)),
            None => {
                trace!(name = %sel.name, "selector has no member");
                (None, Type::none())
            }
        }
    }

    /// The object an identifier refers to.
    pub fn lookup_ident(&mut self, ident: &Ident) -> Option<ObjId> {
        match ident.resolution {
            Resolution::None => None,
            Resolution::Object(id) => Some(id),
            Resolution::Deferred(scope) => self.lookup_deferred(scope, &ident.name),
        }
    }

    /// Look `name` up from `scope` outwards, then in the dot imports of the
    /// enclosing file.
    fn lookup_deferred(&mut self, scope: ScopeId, name: &str) -> Option<ObjId> {
        if let Some(id) = self.program.lookup(scope, name) {
            return Some(id);
        }
        let file_scope = self.program.enclosing_file_scope(scope)?;
        let dot_imports = self.program.scope(file_scope).dot_imports.clone();
        for spec in dot_imports {
            let Some(package) = self.import_spec(&spec) else {
                continue;
            };
            if let Some(id) = self.program.scope(package).lookup(name) {
                return Some(id);
            }
        }
        None
    }

    /// The package scope an import spec refers to, importing it on first use.
    pub fn import_spec(&mut self, spec: &ImportSpec) -> Option<ScopeId> {
        let path = unquote(&spec.path.value).ok()?;
        let src_dir = self.src_dir(spec.path.pos);
        match self.importer.import(self.program, &path, &src_dir) {
            Ok(package) => Some(package.scope),
            Err(err) => {
                debug!(path, %err, "import failed");
                None
            }
        }
    }

    /// Directory of the file containing `pos`.
    fn src_dir(&self, pos: Pos) -> PathBuf {
        self.program
            .fileset()
            .filename(pos)
            .and_then(|name| Path::new(name).parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// An identifier expression bound to `id`.
    fn named(&self, id: ObjId) -> ExprRef {
        let obj = self.program.object(id);
        Rc::new(Expr::Ident(Ident {
            name: obj.name.clone(),
            pos: obj.pos,
            resolution: Resolution::Object(id),
        }))
    }

    /// The predeclared type `name`.
    fn predeclared(&self, name: &str) -> Type {
        match self.program.lookup_universe(name) {
            Some(id) => Type::of_type(self.named(id)),
            None => Type::none(),
        }
    }

    /// Run `f` one level deeper, or return `fallback` at the depth limit.
    fn nested<T>(&mut self, fallback: T, f: impl FnOnce(&mut Self) -> T) -> T {
        if self.depth >= MAX_DEPTH {
            trace!("inference depth limit reached");
            return fallback;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
