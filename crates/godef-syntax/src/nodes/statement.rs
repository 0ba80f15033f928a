// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use crate::nodes::expression::{BasicLit, ExprRef, FieldList, FuncType, Ident};
use crate::scope::ScopeId;
use crate::token::{Pos, Token};

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub lbrace: Pos,
    pub list: Vec<Stmt>,
    pub rbrace: Pos,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<ExprRef>,
    pub tok_pos: Pos,
    pub tok: Token,
    pub rhs: Vec<ExprRef>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Bad {
        from: Pos,
        to: Pos,
    },
    Decl(Decl),
    Empty {
        semicolon: Pos,
        implicit: bool,
    },
    Labeled {
        label: Ident,
        colon: Pos,
        stmt: Box<Stmt>,
    },
    Expr(ExprRef),
    Send {
        chan: ExprRef,
        arrow: Pos,
        value: ExprRef,
    },
    IncDec {
        x: ExprRef,
        tok_pos: Pos,
        tok: Token,
    },
    Assign(Rc<AssignStmt>),
    Go {
        go_pos: Pos,
        call: ExprRef,
    },
    Defer {
        defer_pos: Pos,
        call: ExprRef,
    },
    Return {
        return_pos: Pos,
        results: Vec<ExprRef>,
    },
    Branch {
        tok_pos: Pos,
        tok: Token,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        if_pos: Pos,
        init: Option<Box<Stmt>>,
        cond: ExprRef,
        body: Block,
        else_branch: Option<Box<Stmt>>,
    },
    /// A `case` or `default` clause; `list` is empty for `default`.
    CaseClause {
        case_pos: Pos,
        list: Vec<ExprRef>,
        colon: Pos,
        body: Vec<Stmt>,
    },
    Switch {
        switch_pos: Pos,
        init: Option<Box<Stmt>>,
        tag: Option<ExprRef>,
        body: Block,
    },
    TypeSwitch {
        switch_pos: Pos,
        init: Option<Box<Stmt>>,
        /// `x := y.(type)` or `y.(type)`.
        assign: Box<Stmt>,
        body: Block,
    },
    /// A `select` case; `comm` is `None` for `default`.
    CommClause {
        case_pos: Pos,
        comm: Option<Box<Stmt>>,
        colon: Pos,
        body: Vec<Stmt>,
    },
    Select {
        select_pos: Pos,
        body: Block,
    },
    For {
        for_pos: Pos,
        init: Option<Box<Stmt>>,
        cond: Option<ExprRef>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        for_pos: Pos,
        key: Option<ExprRef>,
        value: Option<ExprRef>,
        /// `Define`, `Assign`, or `Illegal` when there are no iteration variables.
        tok: Token,
        x: ExprRef,
        body: Block,
    },
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    pub path: BasicLit,
}

impl ImportSpec {
    pub fn pos(&self) -> Pos {
        self.name.as_ref().map_or(self.path.pos, |n| n.pos)
    }

    pub fn end(&self) -> Pos {
        self.path.end()
    }
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<ExprRef>,
    pub values: Vec<ExprRef>,
    /// For a constant spec without values, the earlier spec of the group it
    /// repeats.
    pub implicit: Option<Rc<ValueSpec>>,
    /// Index of this spec within its const group.
    pub iota: usize,
}

impl ValueSpec {
    /// The spec supplying this spec's type and values.
    pub fn effective(&self) -> &ValueSpec {
        match &self.implicit {
            Some(spec) => spec,
            None => self,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Option<FieldList>,
    /// Position of `=` for alias declarations, otherwise `Pos::NONE`.
    pub assign: Pos,
    pub ty: ExprRef,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(Rc<ImportSpec>),
    Value(Rc<ValueSpec>),
    Type(Rc<TypeSpec>),
}

#[derive(Debug, Clone)]
pub struct GenDecl {
    pub tok_pos: Pos,
    /// `Import`, `Const`, `Type` or `Var`.
    pub tok: Token,
    pub lparen: Pos,
    pub specs: Vec<Spec>,
    pub rparen: Pos,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: Rc<FuncType>,
    pub body: Option<Block>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Bad { from: Pos, to: Pos },
    Gen(GenDecl),
    Func(Rc<FuncDecl>),
}

// ============================================================================
// Files
// ============================================================================

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct File {
    pub filename: String,
    /// Position of the `package` keyword.
    pub package_pos: Pos,
    pub name: Ident,
    pub decls: Vec<Decl>,
    pub imports: Vec<Rc<ImportSpec>>,
    /// Holds the file's imports; its outer scope is the package scope.
    pub file_scope: ScopeId,
    pub package_scope: ScopeId,
    /// Position of the first byte of the file.
    pub start: Pos,
    pub end: Pos,
}
