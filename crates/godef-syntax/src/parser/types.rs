// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type expressions, field lists and parameter lists.

use std::rc::Rc;

use crate::nodes::{BasicLit, ChanDir, Expr, ExprRef, Field, FieldList, FuncType, Ident};
use crate::scope::{ObjDecl, ObjKind};
use crate::token::{Pos, Token};

use super::Parser;

/// One entry of a parameter list before grouping decides whether the list
/// is named.
enum ParamEntry {
    /// A lone identifier: a parameter name or a type name.
    Name(Ident),
    Named(Ident, ExprRef),
    Type(ExprRef),
}

impl Parser<'_, '_, '_> {
    /// Whether the current token can start a type.
    pub(super) fn at_type_start(&self) -> bool {
        matches!(
            self.tok,
            Token::Ident
                | Token::Mul
                | Token::LBrack
                | Token::LParen
                | Token::Func
                | Token::Map
                | Token::Chan
                | Token::Struct
                | Token::Interface
                | Token::Arrow
        )
    }

    pub(super) fn parse_type(&mut self) -> ExprRef {
        match self.tok {
            Token::Ident => {
                let name = self.parse_type_name();
                if self.tok == Token::LBrack {
                    self.parse_type_instance(name)
                } else {
                    name
                }
            }
            Token::LBrack => self.parse_array_type(),
            Token::Struct => self.parse_struct_type(),
            Token::Mul => {
                let star = self.pos;
                self.next();
                let x = self.parse_type();
                Rc::new(Expr::Star { star, x })
            }
            Token::Func => {
                let func_pos = self.pos;
                self.next();
                Rc::new(Expr::FuncType(self.parse_signature(func_pos)))
            }
            Token::Interface => self.parse_interface_type(),
            Token::Map => {
                let map_pos = self.pos;
                self.next();
                self.expect(Token::LBrack);
                let key = self.parse_type();
                self.expect(Token::RBrack);
                let value = self.parse_type();
                Rc::new(Expr::MapType {
                    map_pos,
                    key,
                    value,
                })
            }
            Token::Chan | Token::Arrow => self.parse_chan_type(),
            Token::LParen => {
                let lparen = self.pos;
                self.next();
                let x = self.parse_type();
                let rparen = self.expect(Token::RParen);
                Rc::new(Expr::Paren { lparen, x, rparen })
            }
            _ => {
                let pos = self.pos;
                self.error_expected(pos, "type");
                Rc::new(Expr::Bad { from: pos, to: pos })
            }
        }
    }

    /// `T` or `pkg.T`.
    fn parse_type_name(&mut self) -> ExprRef {
        let ident = self.parse_ident();
        let x = self.ident_expr(ident);
        self.parse_qualified_rest(x)
    }

    fn parse_qualified_rest(&mut self, x: ExprRef) -> ExprRef {
        if self.tok != Token::Period {
            return x;
        }
        self.next();
        let sel = self.parse_ident();
        Rc::new(Expr::Selector { x, sel })
    }

    /// `T[A, B]`, with the current token `[`.
    fn parse_type_instance(&mut self, x: ExprRef) -> ExprRef {
        let lbrack = self.expect(Token::LBrack);
        let mut indices = Vec::new();
        while self.tok != Token::RBrack && self.tok != Token::Eof {
            indices.push(self.parse_type());
            if !self.at_comma("type argument list", Token::RBrack) {
                break;
            }
            self.next();
        }
        let rbrack = self.expect(Token::RBrack);
        if indices.is_empty() {
            self.error(rbrack, "expected type argument list");
        }
        Rc::new(Expr::Index {
            x,
            lbrack,
            indices,
            rbrack,
        })
    }

    fn parse_array_type(&mut self) -> ExprRef {
        let lbrack = self.expect(Token::LBrack);
        let len = if self.tok == Token::RBrack {
            None
        } else if self.tok == Token::Ellipsis && self.peek(0) == Token::RBrack {
            let pos = self.pos;
            self.next();
            Some(Rc::new(Expr::Ellipsis { pos, elt: None }))
        } else {
            self.expr_lev += 1;
            let len = self.parse_expr();
            self.expr_lev -= 1;
            Some(len)
        };
        self.expect(Token::RBrack);
        let elt = self.parse_type();
        Rc::new(Expr::ArrayType { lbrack, len, elt })
    }

    fn parse_chan_type(&mut self) -> ExprRef {
        let begin = self.pos;
        let dir = if self.tok == Token::Chan {
            self.next();
            if self.tok == Token::Arrow {
                self.next();
                ChanDir::Send
            } else {
                ChanDir::Both
            }
        } else {
            self.expect(Token::Arrow);
            self.expect(Token::Chan);
            ChanDir::Recv
        };
        let value = self.parse_type();
        Rc::new(Expr::ChanType { begin, dir, value })
    }

    /// Parameters and results following `func` or a method name. Parameter
    /// objects go into a scope that is discarded.
    fn parse_signature(&mut self, func_pos: Pos) -> Rc<FuncType> {
        self.open_scope();
        let params = self.parse_parameters();
        let results = self.parse_results();
        self.close_scope();
        Rc::new(FuncType {
            func_pos,
            type_params: None,
            params,
            results,
        })
    }

    // ------------------------------------------------------------------------
    // Structs and interfaces
    // ------------------------------------------------------------------------

    fn parse_struct_type(&mut self) -> ExprRef {
        let struct_pos = self.expect(Token::Struct);
        let opening = self.expect(Token::LBrace);
        let mut list = Vec::new();
        while matches!(self.tok, Token::Ident | Token::Mul | Token::LParen) {
            let before = self.pos;
            list.push(self.parse_field_decl());
            self.ensure_progress(before);
        }
        let closing = self.expect(Token::RBrace);
        Rc::new(Expr::StructType {
            struct_pos,
            fields: FieldList {
                opening,
                list,
                closing,
            },
        })
    }

    fn parse_field_decl(&mut self) -> Rc<Field> {
        let mut names = Vec::new();
        let ty = match self.tok {
            Token::Ident => {
                let ident = self.parse_ident();
                match self.tok {
                    Token::Period | Token::String | Token::Semicolon | Token::RBrace => {
                        let x = self.ident_expr(ident);
                        let name = self.parse_qualified_rest(x);
                        if self.tok == Token::LBrack {
                            self.parse_type_instance(name)
                        } else {
                            name
                        }
                    }
                    Token::LBrack => match self.parse_array_or_instance(ident) {
                        ParamEntry::Named(name, ty) => {
                            names.push(name);
                            ty
                        }
                        ParamEntry::Type(ty) => ty,
                        ParamEntry::Name(name) => self.ident_expr(name),
                    },
                    _ => {
                        names.push(ident);
                        while self.tok == Token::Comma {
                            self.next();
                            names.push(self.parse_ident());
                        }
                        self.parse_type()
                    }
                }
            }
            Token::Mul => {
                let star = self.pos;
                self.next();
                let mut x = self.parse_type_name();
                if self.tok == Token::LBrack {
                    x = self.parse_type_instance(x);
                }
                Rc::new(Expr::Star { star, x })
            }
            _ => {
                let pos = self.pos;
                self.error(pos, "cannot parenthesize embedded type");
                self.parse_type()
            }
        };

        let tag = if self.tok == Token::String {
            let pos = self.pos;
            let value = std::mem::take(&mut self.lit);
            self.next();
            Some(BasicLit {
                pos,
                kind: Token::String,
                value,
            })
        } else {
            None
        };
        self.expect_semi();

        let ids: Vec<_> = names
            .iter_mut()
            .map(|name| self.new_object(ObjKind::Var, name))
            .collect();
        let mut embedded = None;
        if names.is_empty() {
            if let Some(base) = embedded_type_ident(&ty) {
                let mut ident = Ident::new(base.name.clone(), base.pos);
                embedded = self.new_object(ObjKind::Var, &mut ident);
            }
        }
        let field = Rc::new(Field {
            names,
            ty,
            tag,
            embedded,
        });
        self.set_decls(&ids, |_| ObjDecl::Field(field.clone()));
        self.set_decls(&[embedded], |_| ObjDecl::Field(field.clone()));
        field
    }

    fn parse_interface_type(&mut self) -> ExprRef {
        let interface_pos = self.expect(Token::Interface);
        let opening = self.expect(Token::LBrace);
        let mut list = Vec::new();
        while self.tok != Token::RBrace && self.tok != Token::Eof {
            let before = self.pos;
            if self.tok == Token::Ident && self.peek(0) == Token::LParen {
                let mut name = self.parse_ident();
                let ty = self.parse_signature(Pos::NONE);
                let id = self.new_object(ObjKind::Fun, &mut name);
                let field = Rc::new(Field::new(vec![name], Rc::new(Expr::FuncType(ty))));
                self.set_decls(&[id], |_| ObjDecl::Field(field.clone()));
                list.push(field);
            } else {
                let ty = self.parse_type_elem();
                list.push(Rc::new(Field::new(Vec::new(), ty)));
            }
            self.expect_semi();
            self.ensure_progress(before);
        }
        let closing = self.expect(Token::RBrace);
        Rc::new(Expr::InterfaceType {
            interface_pos,
            methods: FieldList {
                opening,
                list,
                closing,
            },
        })
    }

    /// A constraint element: `~T | U | ...`.
    fn parse_type_elem(&mut self) -> ExprRef {
        let mut x = self.parse_tilde_type();
        while self.tok == Token::Or {
            let op_pos = self.pos;
            self.next();
            let y = self.parse_tilde_type();
            x = Rc::new(Expr::Binary {
                x,
                op_pos,
                op: Token::Or,
                y,
            });
        }
        x
    }

    fn parse_tilde_type(&mut self) -> ExprRef {
        if self.tok == Token::Tilde {
            let op_pos = self.pos;
            self.next();
            let x = self.parse_type();
            return Rc::new(Expr::Unary {
                op_pos,
                op: Token::Tilde,
                x,
            });
        }
        self.parse_type()
    }

    // ------------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------------

    /// `[P Constraint, ...]`, declaring each parameter in the current scope.
    pub(super) fn parse_type_params(&mut self) -> FieldList {
        let opening = self.expect(Token::LBrack);
        let mut list = Vec::new();
        while self.tok != Token::RBrack && self.tok != Token::Eof {
            let mut names = vec![self.parse_ident()];
            while self.tok == Token::Comma {
                self.next();
                names.push(self.parse_ident());
            }
            let constraint = self.parse_type_elem();
            let scope = self.top_scope;
            let ids: Vec<_> = names
                .iter_mut()
                .map(|name| self.declare(ObjKind::Typ, scope, name))
                .collect();
            self.set_decls(&ids, |_| ObjDecl::TypeParam {
                constraint: constraint.clone(),
            });
            list.push(Rc::new(Field::new(names, constraint)));
            if !self.at_comma("type parameter list", Token::RBrack) {
                break;
            }
            self.next();
        }
        let closing = self.expect(Token::RBrack);
        FieldList {
            opening,
            list,
            closing,
        }
    }

    /// `(a, b int, c ...string)`, declaring named parameters in the current
    /// scope.
    pub(super) fn parse_parameters(&mut self) -> FieldList {
        let opening = self.expect(Token::LParen);
        let mut entries = Vec::new();
        while self.tok != Token::RParen && self.tok != Token::Eof {
            entries.push(self.parse_param_entry());
            if !self.at_comma("parameter list", Token::RParen) {
                break;
            }
            self.next();
        }
        let closing = self.expect_closing(Token::RParen, "parameter list");
        let list = self.group_params(entries);
        FieldList {
            opening,
            list,
            closing,
        }
    }

    /// A single unparenthesized result type, or a parenthesized list.
    pub(super) fn parse_results(&mut self) -> Option<FieldList> {
        if self.tok == Token::LParen {
            return Some(self.parse_parameters());
        }
        if self.at_type_start() {
            let ty = self.parse_type();
            return Some(FieldList {
                opening: Pos::NONE,
                list: vec![Rc::new(Field::new(Vec::new(), ty))],
                closing: Pos::NONE,
            });
        }
        None
    }

    fn parse_param_entry(&mut self) -> ParamEntry {
        match self.tok {
            Token::Ident => {
                let ident = self.parse_ident();
                match self.tok {
                    Token::Comma | Token::RParen => ParamEntry::Name(ident),
                    Token::Period => {
                        let x = self.ident_expr(ident);
                        let name = self.parse_qualified_rest(x);
                        if self.tok == Token::LBrack {
                            ParamEntry::Type(self.parse_type_instance(name))
                        } else {
                            ParamEntry::Type(name)
                        }
                    }
                    Token::LBrack => self.parse_array_or_instance(ident),
                    Token::Ellipsis => {
                        let ty = self.parse_variadic();
                        ParamEntry::Named(ident, ty)
                    }
                    _ => {
                        let ty = self.parse_type();
                        ParamEntry::Named(ident, ty)
                    }
                }
            }
            Token::Ellipsis => ParamEntry::Type(self.parse_variadic()),
            _ => ParamEntry::Type(self.parse_type()),
        }
    }

    fn parse_variadic(&mut self) -> ExprRef {
        let pos = self.expect(Token::Ellipsis);
        let elt = self.parse_type();
        Rc::new(Expr::Ellipsis {
            pos,
            elt: Some(elt),
        })
    }

    /// After an identifier, with the current token `[`: either a named entry
    /// of array or slice type (`a [4]int`, `a []int`) or a generic type
    /// instance (`List[int]`).
    fn parse_array_or_instance(&mut self, ident: Ident) -> ParamEntry {
        let lbrack = self.expect(Token::LBrack);
        if self.tok == Token::RBrack {
            self.next();
            let elt = self.parse_type();
            let ty = Rc::new(Expr::ArrayType {
                lbrack,
                len: None,
                elt,
            });
            return ParamEntry::Named(ident, ty);
        }
        if self.tok == Token::Ellipsis && self.peek(0) == Token::RBrack {
            let pos = self.pos;
            self.next();
            self.next();
            let elt = self.parse_type();
            let len = Some(Rc::new(Expr::Ellipsis { pos, elt: None }));
            return ParamEntry::Named(ident, Rc::new(Expr::ArrayType { lbrack, len, elt }));
        }

        self.expr_lev += 1;
        let mut args = vec![self.parse_expr()];
        while self.tok == Token::Comma {
            self.next();
            if self.tok == Token::RBrack {
                break;
            }
            args.push(self.parse_expr());
        }
        self.expr_lev -= 1;
        let rbrack = self.expect(Token::RBrack);

        if args.len() == 1 && self.at_type_start() {
            let elt = self.parse_type();
            let len = args.pop();
            return ParamEntry::Named(ident, Rc::new(Expr::ArrayType { lbrack, len, elt }));
        }
        let x = self.ident_expr(ident);
        ParamEntry::Type(Rc::new(Expr::Index {
            x,
            lbrack,
            indices: args,
            rbrack,
        }))
    }

    /// Decide between a named and an unnamed parameter list and declare the
    /// named parameters.
    fn group_params(&mut self, entries: Vec<ParamEntry>) -> Vec<Rc<Field>> {
        let named = entries
            .iter()
            .any(|entry| matches!(entry, ParamEntry::Named(..)));
        let mut fields = Vec::new();

        if !named {
            for entry in entries {
                let ty = match entry {
                    ParamEntry::Name(ident) => self.ident_expr(ident),
                    ParamEntry::Type(ty) | ParamEntry::Named(_, ty) => ty,
                };
                fields.push(Rc::new(Field::new(Vec::new(), ty)));
            }
            return fields;
        }

        let mut pending = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Name(ident) => pending.push(ident),
                ParamEntry::Named(ident, ty) => {
                    pending.push(ident);
                    let names = std::mem::take(&mut pending);
                    fields.push(self.declare_param(names, ty));
                }
                ParamEntry::Type(ty) => {
                    let pos = ty.pos();
                    self.error(pos, "mixed named and unnamed parameters");
                    fields.push(Rc::new(Field::new(Vec::new(), ty)));
                }
            }
        }
        if let Some(last) = pending.last() {
            let pos = last.end();
            self.error(pos, "missing parameter type");
            let ty = Rc::new(Expr::Bad { from: pos, to: pos });
            fields.push(self.declare_param(pending, ty));
        }
        fields
    }

    fn declare_param(&mut self, mut names: Vec<Ident>, ty: ExprRef) -> Rc<Field> {
        let scope = self.top_scope;
        let ids: Vec<_> = names
            .iter_mut()
            .map(|name| self.declare(ObjKind::Var, scope, name))
            .collect();
        let field = Rc::new(Field::new(names, ty));
        self.set_decls(&ids, |_| ObjDecl::Field(field.clone()));
        field
    }
}

/// The type name identifier of an embedded field type: `T`, `*T`, `pkg.T`,
/// `T[int]`.
pub(crate) fn embedded_type_ident(ty: &Expr) -> Option<&Ident> {
    match ty {
        Expr::Ident(ident) => Some(ident),
        Expr::Star { x, .. } | Expr::Paren { x, .. } | Expr::Index { x, .. } => {
            embedded_type_ident(x)
        }
        Expr::Selector { sel, .. } => Some(sel),
        _ => None,
    }
}
