//! Underlying types and member lookup.
//!
//! Members are searched breadth first by embedding depth, so a field or
//! method declared directly on a type shadows one promoted from an embedded
//! type. Methods are found through the method table of the package that
//! declares the named type.

use std::collections::HashSet;

use godef_syntax::{Expr, ExprRef, Field, ObjDecl, ObjId, ObjKind};

use super::{Checker, Type, MAX_DEPTH};

/// A member found at some embedding depth, before deduplication.
struct Found {
    name: String,
    id: ObjId,
}

impl Checker<'_> {
    /// Follow named types to their definitions and type parameters to their
    /// constraints. Predeclared basic types are their own underlying type.
    pub fn underlying(&mut self, expr: &ExprRef) -> ExprRef {
        let mut current = expr.clone();
        for _ in 0..MAX_DEPTH {
            let next = match &*current {
                Expr::Paren { x, .. } | Expr::Index { x, .. } => Some(x.clone()),
                Expr::Ident(_) | Expr::Selector { .. } => self.type_definition(&current),
                _ => None,
            };
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// The type expression a named type or type parameter is declared as.
    fn type_definition(&mut self, expr: &ExprRef) -> Option<ExprRef> {
        let id = self.expr_object(expr).0?;
        let obj = self.program.object(id);
        if obj.kind != ObjKind::Typ {
            return None;
        }
        match &obj.decl {
            ObjDecl::Type(spec) => Some(spec.ty.clone()),
            ObjDecl::TypeParam { constraint } => Some(constraint.clone()),
            _ => None,
        }
    }

    /// The defined type object `expr` names, following aliases. Method
    /// tables are keyed by it.
    fn named_type(&mut self, expr: &ExprRef) -> Option<ObjId> {
        let mut current = expr.clone();
        for _ in 0..MAX_DEPTH {
            let id = match &*current {
                Expr::Paren { x, .. } | Expr::Index { x, .. } => {
                    current = x.clone();
                    continue;
                }
                Expr::Ident(_) | Expr::Selector { .. } => self.expr_object(&current).0?,
                _ => return None,
            };
            let obj = self.program.object(id);
            if obj.kind != ObjKind::Typ {
                return None;
            }
            match &obj.decl {
                ObjDecl::Type(spec) if spec.assign.is_valid() => current = spec.ty.clone(),
                _ => return Some(id),
            }
        }
        None
    }

    fn methods_of(&self, type_obj: ObjId) -> Vec<ObjId> {
        let obj = self.program.object(type_obj);
        match obj.scope {
            Some(scope) => self.program.methods(scope, &obj.name).to_vec(),
            None => Vec::new(),
        }
    }

    /// The field or method `name` of a value (or type) of type `ty`.
    pub fn member(&mut self, ty: &Type, name: &str) -> Option<ObjId> {
        let start = ty.expr()?.clone();
        let mut found = None;
        self.walk_members(start, |member| {
            if member.name == name {
                found = Some(member.id);
                return true;
            }
            false
        });
        found
    }

    /// Every field and method of `ty`, including promoted ones, ordered by
    /// name. A shallower member hides deeper ones of the same name.
    pub fn members(&mut self, ty: &Type) -> Vec<ObjId> {
        let Some(start) = ty.expr().cloned() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        self.walk_members(start, |member| {
            if seen.insert(member.name.clone()) {
                all.push((member.name, member.id));
            }
            false
        });
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all.into_iter().map(|(_, id)| id).collect()
    }

    /// Visit members level by level until `visit` returns true.
    fn walk_members(&mut self, start: ExprRef, mut visit: impl FnMut(Found) -> bool) {
        let mut level = vec![start];
        let mut visited = HashSet::new();
        for _ in 0..MAX_DEPTH {
            if level.is_empty() {
                return;
            }
            let mut next = Vec::new();
            for ty in std::mem::take(&mut level) {
                let ty = match &*ty {
                    Expr::Star { x, .. } => x.clone(),
                    _ => ty.clone(),
                };
                if let Some(named) = self.named_type(&ty) {
                    if !visited.insert(named) {
                        continue;
                    }
                    for method in self.methods_of(named) {
                        let name = self.program.object(method).name.clone();
                        if visit(Found { name, id: method }) {
                            return;
                        }
                    }
                }
                let fields = match &*self.underlying(&ty) {
                    Expr::StructType { fields, .. } => fields.list.clone(),
                    Expr::InterfaceType { methods, .. } => methods.list.clone(),
                    _ => continue,
                };
                for field in fields {
                    if self.visit_field(&field, &mut next, &mut visit) {
                        return;
                    }
                }
            }
            level = next;
        }
    }

    /// Visit the names a field declares, queueing embedded types for the
    /// next level.
    fn visit_field(
        &self,
        field: &Field,
        next: &mut Vec<ExprRef>,
        visit: &mut impl FnMut(Found) -> bool,
    ) -> bool {
        if field.names.is_empty() {
            next.push(field.ty.clone());
            return match field.embedded {
                Some(id) => visit(Found {
                    name: self.program.object(id).name.clone(),
                    id,
                }),
                None => false,
            };
        }
        for ident in &field.names {
            let Some(id) = ident.obj() else {
                continue;
            };
            if visit(Found {
                name: ident.name.clone(),
                id,
            }) {
                return true;
            }
        }
        false
    }
}
