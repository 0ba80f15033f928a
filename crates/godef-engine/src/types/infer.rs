//! Types of objects and expressions.

use std::rc::Rc;

use godef_syntax::{
    is_basic_type, BasicLit, Expr, ExprRef, FieldList, ObjDecl, ObjId, ObjKind, Pos, Token,
};

use super::{Checker, Type, TypeNode};

impl Checker<'_> {
    /// The type of the object `id`.
    pub fn object_type(&mut self, id: ObjId) -> Type {
        self.nested(Type::none(), |c| c.declared_type(id))
    }

    /// The type of an expression.
    pub fn expr_type(&mut self, expr: &ExprRef) -> Type {
        self.nested(Type::none(), |c| c.infer(expr))
    }

    fn declared_type(&mut self, id: ObjId) -> Type {
        let obj = self.program.object(id);
        let kind = obj.kind;
        match obj.decl.clone() {
            ObjDecl::Builtin => self.builtin_type(id),
            ObjDecl::Pending | ObjDecl::Label => Type::none(),
            ObjDecl::Value { spec, index } => {
                let spec = spec.effective();
                match &spec.ty {
                    Some(ty) => Type::new(ty.clone(), kind),
                    None => self.assigned_type(&spec.values, index).with_kind(kind),
                }
            }
            ObjDecl::Type(_) | ObjDecl::TypeParam { .. } => Type::of_type(self.named(id)),
            ObjDecl::Func(decl) => Type::new(Rc::new(Expr::FuncType(decl.ty.clone())), ObjKind::Fun),
            ObjDecl::Field(field) => {
                // A variadic parameter `...T` is a `[]T` inside the function.
                let ty = match &*field.ty {
                    Expr::Ellipsis {
                        pos,
                        elt: Some(elt),
                    } => Rc::new(Expr::ArrayType {
                        lbrack: *pos,
                        len: None,
                        elt: elt.clone(),
                    }),
                    _ => field.ty.clone(),
                };
                Type::new(ty, kind)
            }
            ObjDecl::Import(spec) => Type {
                node: self
                    .import_spec(&spec)
                    .map_or(TypeNode::None, TypeNode::Package),
                kind: ObjKind::Pkg,
            },
            ObjDecl::Assign { stmt, index } => self.assigned_type(&stmt.rhs, index).into_value(),
            ObjDecl::Range { x, value } => self.range_type(&x, value),
            ObjDecl::TypeSwitch { x, case_type } => match case_type {
                Some(ty) => Type::value(ty),
                None => self.expr_type(&x).into_value(),
            },
        }
    }

    fn builtin_type(&self, id: ObjId) -> Type {
        let obj = self.program.object(id);
        match (obj.kind, obj.name.as_str()) {
            (ObjKind::Typ, _) => Type::of_type(self.named(id)),
            (ObjKind::Con, "true" | "false") => self.predeclared("bool").with_kind(ObjKind::Con),
            (ObjKind::Con, "iota") => self.predeclared("int").with_kind(ObjKind::Con),
            _ => Type::none(),
        }
    }

    /// The type of the `index`th variable assigned from `values`.
    fn assigned_type(&mut self, values: &[ExprRef], index: usize) -> Type {
        if let [value] = values {
            let ty = self.expr_type(value);
            if let TypeNode::Tuple(results) = &ty.node {
                return results
                    .get(index)
                    .map_or_else(Type::none, |r| Type::value(r.clone()));
            }
            return match index {
                0 => ty,
                1 if is_comma_ok(value) => self.predeclared("bool").into_value(),
                _ => Type::none(),
            };
        }
        match values.get(index) {
            Some(value) => self.expr_type(value),
            None => Type::none(),
        }
    }

    /// The type of a range clause's key (or value) ranging over `x`.
    fn range_type(&mut self, x: &ExprRef, value: bool) -> Type {
        let Some(ty) = self.expr_type(x).expr().cloned() else {
            return Type::none();
        };
        let mut under = self.underlying(&ty);
        if let Expr::Star { x: elem, .. } = &*under {
            under = self.underlying(&elem.clone());
        }
        match &*under {
            Expr::Ident(ident) if ident.name == "string" => {
                self.predeclared(if value { "rune" } else { "int" }).into_value()
            }
            Expr::Ident(ident) if is_basic_type(&ident.name) && !value => Type::value(ty),
            Expr::ArrayType { elt, .. } if value => Type::value(elt.clone()),
            Expr::ArrayType { .. } => self.predeclared("int").into_value(),
            Expr::MapType { value: v, .. } if value => Type::value(v.clone()),
            Expr::MapType { key, .. } => Type::value(key.clone()),
            Expr::ChanType { value: elem, .. } if !value => Type::value(elem.clone()),
            Expr::FuncType(iter) => {
                let Some(yield_param) = iter.params.list.first() else {
                    return Type::none();
                };
                let yield_ty = self.underlying(&yield_param.ty.clone());
                let Expr::FuncType(yield_fn) = &*yield_ty else {
                    return Type::none();
                };
                param_types(&yield_fn.params)
                    .get(usize::from(value))
                    .map_or_else(Type::none, |t| Type::value(t.clone()))
            }
            _ => Type::none(),
        }
    }

    fn infer(&mut self, expr: &ExprRef) -> Type {
        match &**expr {
            Expr::Bad { .. } | Expr::KeyValue { .. } | Expr::Ellipsis { .. } => Type::none(),
            Expr::Ident(_) | Expr::Selector { .. } => self.expr_object(expr).1,
            Expr::Paren { x, .. } => self.expr_type(x),
            Expr::BasicLit(lit) => self.literal_type(lit),
            Expr::FuncLit { ty, .. } => Type::value(Rc::new(Expr::FuncType(ty.clone()))),
            Expr::CompositeLit { ty, .. } => ty.clone().map_or_else(Type::none, Type::value),
            Expr::Index { x, .. } => self.index_type(expr, x),
            Expr::Slice { x, .. } => self.slice_type(x),
            Expr::TypeAssert { x, ty, .. } => match ty {
                Some(ty) => Type::value(ty.clone()),
                None => self.expr_type(x).into_value(),
            },
            Expr::Call { fun, args, .. } => self.call_type(fun, args),
            Expr::Star { x, .. } => self.star_type(expr, x),
            Expr::Unary { op, x, .. } => self.unary_type(*op, x),
            Expr::Binary { x, op, y, .. } => self.binary_type(*op, x, y),
            Expr::ArrayType { .. }
            | Expr::StructType { .. }
            | Expr::FuncType(_)
            | Expr::InterfaceType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. } => Type::of_type(expr.clone()),
        }
    }

    /// Untyped constants get their default type.
    fn literal_type(&self, lit: &BasicLit) -> Type {
        let name = match lit.kind {
            Token::Int => "int",
            Token::Float => "float64",
            Token::Imag => "complex128",
            Token::Char => "rune",
            Token::String => "string",
            _ => return Type::none(),
        };
        self.predeclared(name).with_kind(ObjKind::Con)
    }

    fn index_type(&mut self, expr: &ExprRef, x: &ExprRef) -> Type {
        let base = self.expr_type(x);
        match base.kind {
            // Instantiation of a generic type or function.
            ObjKind::Typ => return Type::of_type(expr.clone()),
            ObjKind::Fun if is_generic(&base) => return base,
            _ => {}
        }
        let Some(ty) = base.expr().cloned() else {
            return Type::none();
        };
        let mut under = self.underlying(&ty);
        if let Expr::Star { x: elem, .. } = &*under {
            under = self.underlying(&elem.clone());
        }
        match &*under {
            Expr::ArrayType { elt, .. } => Type::value(elt.clone()),
            Expr::MapType { value, .. } => Type::value(value.clone()),
            Expr::Ident(ident) if ident.name == "string" => self.predeclared("byte").into_value(),
            _ => Type::none(),
        }
    }

    fn slice_type(&mut self, x: &ExprRef) -> Type {
        let base = self.expr_type(x);
        let Some(ty) = base.expr().cloned() else {
            return Type::none();
        };
        let mut under = self.underlying(&ty);
        if let Expr::Star { x: elem, .. } = &*under {
            under = self.underlying(&elem.clone());
        }
        match &*under {
            // Slicing an array yields a slice of its elements.
            Expr::ArrayType {
                lbrack,
                len: Some(_),
                elt,
            } => Type::value(Rc::new(Expr::ArrayType {
                lbrack: *lbrack,
                len: None,
                elt: elt.clone(),
            })),
            _ => base.into_value(),
        }
    }

    fn call_type(&mut self, fun: &ExprRef, args: &[ExprRef]) -> Type {
        let callee = self.expr_type(fun);
        if callee.kind == ObjKind::Typ {
            // Conversion.
            return callee.into_value();
        }
        if let Some(name) = self.builtin_callee(fun) {
            return self.builtin_call(&name, args);
        }
        let Some(ty) = callee.expr().cloned() else {
            return Type::none();
        };
        let under = self.underlying(&ty);
        let Expr::FuncType(sig) = &*under else {
            return Type::none();
        };
        let results = sig.results.as_ref().map(param_types).unwrap_or_default();
        match results.as_slice() {
            [] => Type::none(),
            [single] => Type::value(single.clone()),
            _ => Type {
                node: TypeNode::Tuple(results),
                kind: ObjKind::Var,
            },
        }
    }

    /// The name of the predeclared function `fun` refers to, if it does.
    fn builtin_callee(&mut self, fun: &ExprRef) -> Option<String> {
        let Expr::Ident(ident) = fun.unparen() else {
            return None;
        };
        let id = self.lookup_ident(ident)?;
        let obj = self.program.object(id);
        (obj.kind == ObjKind::Fun && obj.scope == Some(self.program.universe()))
            .then(|| obj.name.clone())
    }

    fn builtin_call(&mut self, name: &str, args: &[ExprRef]) -> Type {
        let first = args.first().cloned();
        match name {
            "new" => first.map_or_else(Type::none, |t| {
                Type::value(Rc::new(Expr::Star {
                    star: Pos::NONE,
                    x: t,
                }))
            }),
            "make" => first.map_or_else(Type::none, Type::value),
            "append" => first.map_or_else(Type::none, |a| self.expr_type(&a).into_value()),
            "min" | "max" => {
                let mut result = Type::none();
                for arg in args {
                    let ty = self.expr_type(arg);
                    if ty.kind != ObjKind::Con {
                        return ty.into_value();
                    }
                    if result.is_none() {
                        result = ty;
                    }
                }
                result
            }
            "len" | "cap" | "copy" => self.predeclared("int").into_value(),
            "complex" => self.predeclared("complex128").into_value(),
            "real" | "imag" => self.predeclared("float64").into_value(),
            "recover" => self.predeclared("any").into_value(),
            _ => Type::none(),
        }
    }

    fn star_type(&mut self, expr: &ExprRef, x: &ExprRef) -> Type {
        let base = self.expr_type(x);
        if base.kind == ObjKind::Typ {
            return Type::of_type(expr.clone());
        }
        let Some(ty) = base.expr().cloned() else {
            return Type::none();
        };
        match &*self.underlying(&ty) {
            Expr::Star { x: elem, .. } => Type::value(elem.clone()),
            _ => Type::none(),
        }
    }

    fn unary_type(&mut self, op: Token, x: &ExprRef) -> Type {
        match op {
            Token::And => match self.expr_type(x).expr() {
                Some(ty) => Type::value(Rc::new(Expr::Star {
                    star: Pos::NONE,
                    x: ty.clone(),
                })),
                None => Type::none(),
            },
            Token::Arrow => {
                let Some(ty) = self.expr_type(x).expr().cloned() else {
                    return Type::none();
                };
                match &*self.underlying(&ty) {
                    Expr::ChanType { value, .. } => Type::value(value.clone()),
                    _ => Type::none(),
                }
            }
            Token::Not => self.predeclared("bool").into_value(),
            _ => self.expr_type(x),
        }
    }

    fn binary_type(&mut self, op: Token, x: &ExprRef, y: &ExprRef) -> Type {
        if op.is_comparison() || matches!(op, Token::LAnd | Token::LOr) {
            return self.predeclared("bool").into_value();
        }
        let left = self.expr_type(x);
        if matches!(op, Token::Shl | Token::Shr) {
            return left;
        }
        // An untyped literal operand takes the type of the other side.
        if matches!(x.unparen(), Expr::BasicLit(_)) {
            let right = self.expr_type(y);
            if !right.is_none() {
                return right;
            }
        }
        left
    }
}

/// One type per parameter or result, repeating grouped fields.
pub(super) fn param_types(list: &FieldList) -> Vec<ExprRef> {
    list.list
        .iter()
        .flat_map(|field| std::iter::repeat(field.ty.clone()).take(field.names.len().max(1)))
        .collect()
}

fn is_generic(ty: &Type) -> bool {
    matches!(ty.expr().map(|e| &**e), Some(Expr::FuncType(sig)) if sig.type_params.is_some())
}

/// Whether `expr` may produce a second boolean value: map index, type
/// assertion or channel receive.
fn is_comma_ok(expr: &ExprRef) -> bool {
    matches!(
        expr.unparen(),
        Expr::Index { .. } | Expr::TypeAssert { .. } | Expr::Unary { op: Token::Arrow, .. }
    )
}
