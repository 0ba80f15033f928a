// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarations: `import`, `const`, `var`, `type` and `func`.

use std::rc::Rc;

use crate::nodes::{
    BasicLit, Decl, Expr, ExprRef, FieldList, FuncDecl, FuncType, GenDecl, Ident, ImportSpec,
    Resolution, Spec, TypeSpec, ValueSpec,
};
use crate::scope::{ObjDecl, ObjKind};
use crate::token::{Pos, Token};

use super::Parser;

impl Parser<'_, '_, '_> {
    pub(super) fn parse_decl(&mut self) -> Decl {
        match self.tok {
            Token::Const | Token::Var | Token::Type | Token::Import => {
                let keyword = self.tok;
                if keyword == Token::Import {
                    let pos = self.pos;
                    self.error(pos, "imports must appear before other declarations");
                }
                Decl::Gen(self.parse_gen_decl(keyword))
            }
            Token::Func => Decl::Func(self.parse_func_decl()),
            _ => {
                let from = self.pos;
                self.error_expected(from, "declaration");
                self.advance_to_decl_start();
                Decl::Bad { from, to: self.pos }
            }
        }
    }

    fn advance_to_decl_start(&mut self) {
        while !matches!(
            self.tok,
            Token::Eof | Token::Const | Token::Var | Token::Type | Token::Func | Token::Import
        ) {
            self.next();
        }
    }

    pub(super) fn parse_gen_decl(&mut self, keyword: Token) -> GenDecl {
        let tok_pos = self.expect(keyword);
        let mut specs = Vec::new();
        let mut lparen = Pos::NONE;
        let mut rparen = Pos::NONE;
        // The last const spec with values, repeated by specs without any.
        let mut last_values: Option<Rc<ValueSpec>> = None;

        if self.tok == Token::LParen {
            lparen = self.pos;
            self.next();
            let mut iota = 0;
            while self.tok != Token::RParen && self.tok != Token::Eof {
                let before = self.pos;
                specs.push(self.parse_spec(keyword, iota, &mut last_values));
                self.ensure_progress(before);
                iota += 1;
            }
            rparen = self.expect(Token::RParen);
            self.expect_semi();
        } else {
            specs.push(self.parse_spec(keyword, 0, &mut last_values));
        }

        GenDecl {
            tok_pos,
            tok: keyword,
            lparen,
            specs,
            rparen,
        }
    }

    fn parse_spec(
        &mut self,
        keyword: Token,
        iota: usize,
        last_values: &mut Option<Rc<ValueSpec>>,
    ) -> Spec {
        match keyword {
            Token::Import => Spec::Import(self.parse_import_spec()),
            Token::Type => Spec::Type(self.parse_type_spec()),
            _ => Spec::Value(self.parse_value_spec(keyword, iota, last_values)),
        }
    }

    fn parse_import_spec(&mut self) -> Rc<ImportSpec> {
        let name = match self.tok {
            Token::Ident => Some(self.parse_ident()),
            Token::Period => {
                let ident = Ident::new(".", self.pos);
                self.next();
                Some(ident)
            }
            _ => None,
        };

        let pos = self.pos;
        let path = if self.tok == Token::String {
            let value = std::mem::take(&mut self.lit);
            self.next();
            BasicLit {
                pos,
                kind: Token::String,
                value,
            }
        } else {
            self.error_expected(pos, "import path");
            self.advance_to_stmt_start();
            BasicLit {
                pos,
                kind: Token::String,
                value: "\"\"".to_string(),
            }
        };
        self.expect_semi();
        self.declare_import(name, path)
    }

    fn parse_value_spec(
        &mut self,
        keyword: Token,
        iota: usize,
        last_values: &mut Option<Rc<ValueSpec>>,
    ) -> Rc<ValueSpec> {
        let mut names = self.parse_ident_list();
        let mut ty = None;
        let mut values = Vec::new();

        if !matches!(self.tok, Token::Assign | Token::Semicolon | Token::RParen) {
            ty = Some(self.parse_type());
        }
        if self.tok == Token::Assign {
            self.next();
            values = self.parse_expr_list();
        }
        self.expect_semi();

        let kind = if keyword == Token::Const {
            ObjKind::Con
        } else {
            ObjKind::Var
        };
        let implicit = if kind == ObjKind::Con && values.is_empty() && ty.is_none() {
            if last_values.is_none() {
                let pos = names[0].pos;
                self.error(pos, "missing init expr for const declaration");
            }
            last_values.clone()
        } else {
            None
        };

        let scope = self.decl_scope();
        let ids: Vec<_> = names
            .iter_mut()
            .map(|name| self.declare(kind, scope, name))
            .collect();
        let spec = Rc::new(ValueSpec {
            names,
            ty,
            values,
            implicit,
            iota,
        });
        self.set_decls(&ids, |index| ObjDecl::Value {
            spec: spec.clone(),
            index,
        });

        if kind == ObjKind::Con && (spec.ty.is_some() || !spec.values.is_empty()) {
            *last_values = Some(spec.clone());
        }
        spec
    }

    fn parse_type_spec(&mut self) -> Rc<TypeSpec> {
        let mut name = self.parse_ident();
        let scope = self.decl_scope();
        let id = self.declare(ObjKind::Typ, scope, &mut name);

        let mut type_params = None;
        let mut opened = false;
        if self.tok == Token::LBrack && self.at_type_params() {
            self.open_scope();
            opened = true;
            type_params = Some(self.parse_type_params());
        }

        let mut assign = Pos::NONE;
        if self.tok == Token::Assign {
            assign = self.pos;
            self.next();
        }
        let ty = self.parse_type();
        if opened {
            self.close_scope();
        }
        self.expect_semi();

        let spec = Rc::new(TypeSpec {
            name,
            type_params,
            assign,
            ty,
        });
        self.set_decls(&[id], |_| ObjDecl::Type(spec.clone()));
        spec
    }

    /// With the current token `[` after a type name: whether a type
    /// parameter list follows rather than an array length.
    fn at_type_params(&mut self) -> bool {
        if self.peek(0) != Token::Ident {
            return false;
        }
        matches!(
            self.peek(1),
            Token::Ident
                | Token::Comma
                | Token::Tilde
                | Token::Interface
                | Token::LBrack
                | Token::Mul
                | Token::Func
                | Token::Map
                | Token::Chan
                | Token::Struct
        )
    }

    fn parse_func_decl(&mut self) -> Rc<FuncDecl> {
        let func_pos = self.expect(Token::Func);
        let outer = self.top_scope;
        self.open_scope();

        let mut recv = None;
        if self.tok == Token::LParen {
            let mut list = self.parse_parameters();
            self.declare_receiver_type_params(&mut list);
            recv = Some(list);
        }

        let mut name = self.parse_ident();
        let type_params = if self.tok == Token::LBrack {
            Some(self.parse_type_params())
        } else {
            None
        };
        let params = self.parse_parameters();
        let results = self.parse_results();
        let ty = Rc::new(FuncType {
            func_pos,
            type_params,
            params,
            results,
        });

        let body = if self.tok == Token::LBrace {
            Some(self.parse_body())
        } else {
            None
        };
        self.top_scope = outer;
        self.expect_semi();

        let id = match &recv {
            None if name.name == "init" => self.new_object(ObjKind::Fun, &mut name),
            None => {
                let scope = self.package_scope;
                self.declare(ObjKind::Fun, scope, &mut name)
            }
            Some(recv) => {
                let id = self.new_object(ObjKind::Fun, &mut name);
                if let (Some(id), Some(base)) = (id, receiver_base_name(recv)) {
                    self.program.add_method(self.package_scope, &base, id);
                }
                id
            }
        };

        let decl = Rc::new(FuncDecl {
            recv,
            name,
            ty,
            body,
        });
        self.set_decls(&[id], |_| ObjDecl::Func(decl.clone()));
        decl
    }

    /// Declare the type parameters a generic receiver names, as in
    /// `func (l *List[T]) Len() int`.
    fn declare_receiver_type_params(&mut self, recv: &mut FieldList) {
        let Some(field) = recv.list.first().cloned() else {
            return;
        };
        let (star, base) = match &*field.ty {
            Expr::Star { star, x } => (Some(*star), x.clone()),
            _ => (None, field.ty.clone()),
        };
        let Expr::Index {
            x,
            lbrack,
            indices,
            rbrack,
        } = &*base
        else {
            return;
        };

        let any = self.ident_expr(Ident::new("any", Pos::NONE));
        let mut params = Vec::with_capacity(indices.len());
        for index in indices {
            let Some(ident) = index.as_ident() else {
                params.push(index.clone());
                continue;
            };
            let mut ident = Ident {
                resolution: Resolution::None,
                ..ident.clone()
            };
            let scope = self.top_scope;
            if let Some(id) = self.declare(ObjKind::Typ, scope, &mut ident) {
                self.program.set_decl(
                    id,
                    ObjDecl::TypeParam {
                        constraint: any.clone(),
                    },
                );
            }
            params.push(Rc::new(Expr::Ident(ident)));
        }

        let instance: ExprRef = Rc::new(Expr::Index {
            x: x.clone(),
            lbrack: *lbrack,
            indices: params,
            rbrack: *rbrack,
        });
        let ty = match star {
            Some(star) => Rc::new(Expr::Star { star, x: instance }),
            None => instance,
        };
        let mut rebuilt = (*field).clone();
        rebuilt.ty = ty;
        let rebuilt = Rc::new(rebuilt);
        for name in &rebuilt.names {
            if let Some(id) = name.obj() {
                self.program.set_decl(id, ObjDecl::Field(rebuilt.clone()));
            }
        }
        recv.list[0] = rebuilt;
    }
}

/// The name of the type a method receiver is declared on.
pub(crate) fn receiver_base_name(recv: &FieldList) -> Option<String> {
    let field = recv.list.first()?;
    let mut ty: &Expr = &field.ty;
    loop {
        ty = match ty {
            Expr::Star { x, .. } | Expr::Paren { x, .. } | Expr::Index { x, .. } => x,
            Expr::Ident(ident) => return Some(ident.name.clone()),
            _ => return None,
        };
    }
}
