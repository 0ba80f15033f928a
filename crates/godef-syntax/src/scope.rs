// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declaring objects and lexical scopes.
//!
//! Objects and scopes live in arenas owned by [`Program`](crate::Program) and
//! are referred to by [`ObjId`] and [`ScopeId`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use godef_core::Kind;

use crate::nodes::{AssignStmt, ExprRef, Field, FuncDecl, ImportSpec, TypeSpec, ValueSpec};
use crate::token::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

/// What an object denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjKind {
    Bad,
    Pkg,
    Con,
    Typ,
    Var,
    Fun,
    Lbl,
}

impl ObjKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjKind::Bad => "bad",
            ObjKind::Pkg => "package",
            ObjKind::Con => "const",
            ObjKind::Typ => "type",
            ObjKind::Var => "var",
            ObjKind::Fun => "func",
            ObjKind::Lbl => "label",
        }
    }
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ObjKind> for Kind {
    fn from(kind: ObjKind) -> Kind {
        match kind {
            ObjKind::Bad => Kind::Bad,
            ObjKind::Pkg => Kind::Import,
            ObjKind::Con => Kind::Const,
            ObjKind::Typ => Kind::Type,
            ObjKind::Var => Kind::Var,
            ObjKind::Fun => Kind::Func,
            ObjKind::Lbl => Kind::Label,
        }
    }
}

/// The syntax that declared an object.
#[derive(Debug, Clone)]
pub enum ObjDecl {
    /// Predeclared types, constants and `nil`.
    Builtin,
    /// Not yet attached; replaced once the declaring node is built.
    Pending,
    Value {
        spec: Rc<ValueSpec>,
        index: usize,
    },
    Type(Rc<TypeSpec>),
    Func(Rc<FuncDecl>),
    /// Struct fields, interface methods, parameters, results and receivers.
    Field(Rc<Field>),
    Import(Rc<ImportSpec>),
    /// A variable introduced by `:=` outside of range and type switch clauses.
    Assign {
        stmt: Rc<AssignStmt>,
        index: usize,
    },
    /// A range clause variable; `value` distinguishes the second variable.
    Range {
        x: ExprRef,
        value: bool,
    },
    /// A type switch guard variable. `case_type` holds the clause's single
    /// type, when the clause lists exactly one.
    TypeSwitch {
        x: ExprRef,
        case_type: Option<ExprRef>,
    },
    Label,
    TypeParam {
        constraint: ExprRef,
    },
}

#[derive(Debug, Clone)]
pub struct Object {
    pub kind: ObjKind,
    pub name: String,
    pub pos: Pos,
    pub decl: ObjDecl,
    /// Import path of the declaring package; empty for the principal package
    /// and for predeclared objects.
    pub pkg_path: String,
    /// The scope the object was inserted into, if any.
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Universe,
    Package,
    File,
    /// Function, block and clause scopes.
    Local,
    Labels,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub outer: Option<ScopeId>,
    names: HashMap<String, ObjId>,
    order: Vec<ObjId>,
    /// Import specs of `import . "path"` declarations (file scopes only).
    pub dot_imports: Vec<Rc<ImportSpec>>,
}

impl Scope {
    pub fn new(kind: ScopeKind, outer: Option<ScopeId>) -> Self {
        Scope {
            kind,
            outer,
            names: HashMap::new(),
            order: Vec::new(),
            dot_imports: Vec::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ObjId> {
        self.names.get(name).copied()
    }

    /// Insert an object, returning the object already declared under that
    /// name instead if there is one.
    pub fn insert(&mut self, name: &str, id: ObjId) -> Option<ObjId> {
        if let Some(existing) = self.names.get(name) {
            return Some(*existing);
        }
        self.names.insert(name.to_string(), id);
        self.order.push(id);
        None
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[ObjId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
