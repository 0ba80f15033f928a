// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use crate::nodes::statement::Block;
use crate::scope::{ObjId, ScopeId};
use crate::token::{Pos, Token};

/// Shared handle to an expression node.
pub type ExprRef = Rc<Expr>;

// ============================================================================
// Identifiers
// ============================================================================

/// How an identifier is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Not a reference: blank identifiers, selector names, composite keys.
    None,
    /// Bound while parsing, either as a declaration or to a block-local object.
    Object(ObjId),
    /// Looked up on demand starting at this scope.
    ///
    /// Lookup happens at inference time, so declarations merged into the
    /// package scope after parsing are visible.
    Deferred(ScopeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
    pub resolution: Resolution,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Ident {
            name: name.into(),
            pos,
            resolution: Resolution::None,
        }
    }

    pub fn end(&self) -> Pos {
        self.pos + self.name.len()
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }

    /// The object bound at parse time, if any.
    pub fn obj(&self) -> Option<ObjId> {
        match self.resolution {
            Resolution::Object(id) => Some(id),
            _ => None,
        }
    }
}

// ============================================================================
// Literals and field lists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub pos: Pos,
    /// One of `Int`, `Float`, `Imag`, `Char`, `String`.
    pub kind: Token,
    pub value: String,
}

impl BasicLit {
    pub fn end(&self) -> Pos {
        self.pos + self.value.len()
    }
}

/// A field in a struct, interface, parameter, result or type parameter list.
///
/// Anonymous fields (embedded types, unnamed parameters) have no names.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: ExprRef,
    pub tag: Option<BasicLit>,
    /// The object standing for an embedded struct field, named after its type.
    pub embedded: Option<ObjId>,
}

impl Field {
    pub fn new(names: Vec<Ident>, ty: ExprRef) -> Self {
        Field {
            names,
            ty,
            tag: None,
            embedded: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldList {
    pub opening: Pos,
    pub list: Vec<Rc<Field>>,
    pub closing: Pos,
}

impl FieldList {
    /// The number of entries, counting each name of a grouped field.
    pub fn num_fields(&self) -> usize {
        self.list.iter().map(|f| f.names.len().max(1)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub func_pos: Pos,
    pub type_params: Option<FieldList>,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum Expr {
    Bad {
        from: Pos,
        to: Pos,
    },
    Ident(Ident),
    /// `...T` in parameter lists, or `[...]T` array lengths.
    Ellipsis {
        pos: Pos,
        elt: Option<ExprRef>,
    },
    BasicLit(BasicLit),
    FuncLit {
        ty: Rc<FuncType>,
        body: Rc<Block>,
    },
    CompositeLit {
        ty: Option<ExprRef>,
        lbrace: Pos,
        elts: Vec<ExprRef>,
        rbrace: Pos,
    },
    Paren {
        lparen: Pos,
        x: ExprRef,
        rparen: Pos,
    },
    Selector {
        x: ExprRef,
        sel: Ident,
    },
    /// Index expressions and generic instantiations (`m[k]`, `Pair[K, V]`).
    Index {
        x: ExprRef,
        lbrack: Pos,
        indices: Vec<ExprRef>,
        rbrack: Pos,
    },
    Slice {
        x: ExprRef,
        lbrack: Pos,
        low: Option<ExprRef>,
        high: Option<ExprRef>,
        max: Option<ExprRef>,
        slice3: bool,
        rbrack: Pos,
    },
    /// `x.(T)`; `ty` is `None` for the `x.(type)` of a type switch.
    TypeAssert {
        x: ExprRef,
        lparen: Pos,
        ty: Option<ExprRef>,
        rparen: Pos,
    },
    Call {
        fun: ExprRef,
        lparen: Pos,
        args: Vec<ExprRef>,
        ellipsis: Pos,
        rparen: Pos,
    },
    Star {
        star: Pos,
        x: ExprRef,
    },
    Unary {
        op_pos: Pos,
        op: Token,
        x: ExprRef,
    },
    Binary {
        x: ExprRef,
        op_pos: Pos,
        op: Token,
        y: ExprRef,
    },
    KeyValue {
        key: ExprRef,
        colon: Pos,
        value: ExprRef,
    },

    // Type expressions
    /// `[len]elt`; `len` is `None` for slices.
    ArrayType {
        lbrack: Pos,
        len: Option<ExprRef>,
        elt: ExprRef,
    },
    StructType {
        struct_pos: Pos,
        fields: FieldList,
    },
    FuncType(Rc<FuncType>),
    InterfaceType {
        interface_pos: Pos,
        methods: FieldList,
    },
    MapType {
        map_pos: Pos,
        key: ExprRef,
        value: ExprRef,
    },
    ChanType {
        begin: Pos,
        dir: ChanDir,
        value: ExprRef,
    },
}

impl Expr {
    /// Position of the first character of the expression.
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Bad { from, .. } => *from,
            Expr::Ident(ident) => ident.pos,
            Expr::Ellipsis { pos, .. } => *pos,
            Expr::BasicLit(lit) => lit.pos,
            Expr::FuncLit { ty, .. } => ty.func_pos,
            Expr::CompositeLit { ty, lbrace, .. } => ty.as_ref().map_or(*lbrace, |t| t.pos()),
            Expr::Paren { lparen, .. } => *lparen,
            Expr::Selector { x, .. }
            | Expr::Index { x, .. }
            | Expr::Slice { x, .. }
            | Expr::TypeAssert { x, .. }
            | Expr::Binary { x, .. } => x.pos(),
            Expr::Call { fun, .. } => fun.pos(),
            Expr::Star { star, .. } => *star,
            Expr::Unary { op_pos, .. } => *op_pos,
            Expr::KeyValue { key, .. } => key.pos(),
            Expr::ArrayType { lbrack, .. } => *lbrack,
            Expr::StructType { struct_pos, .. } => *struct_pos,
            Expr::FuncType(ty) => ty.func_pos,
            Expr::InterfaceType { interface_pos, .. } => *interface_pos,
            Expr::MapType { map_pos, .. } => *map_pos,
            Expr::ChanType { begin, .. } => *begin,
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Strip any enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { x, .. } = expr {
            expr = x;
        }
        expr
    }

    /// Whether this is a type-switch guard's `x.(type)`.
    pub fn is_type_switch_assert(&self) -> bool {
        matches!(self.unparen(), Expr::TypeAssert { ty: None, .. })
    }
}
