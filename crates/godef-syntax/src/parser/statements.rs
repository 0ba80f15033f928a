// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statements and blocks.

use std::rc::Rc;

use crate::nodes::{AssignStmt, Block, Decl, Expr, ExprRef, Ident, Resolution, Stmt};
use crate::scope::{ObjDecl, ObjId, ObjKind, ScopeKind};
use crate::token::{Pos, Token};

use super::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleMode {
    Basic,
    LabelOk,
    RangeOk,
}

/// A type switch guard `name := x.(type)`.
struct Guard {
    name: String,
    pos: Pos,
    x: ExprRef,
}

impl Parser<'_, '_, '_> {
    /// A function body. Its top-level statements share the function scope
    /// with the parameters; labels get a scope of their own.
    pub(super) fn parse_body(&mut self) -> Block {
        let saved_labels = self.label_scope;
        self.label_scope = Some(self.program.new_scope(ScopeKind::Labels, None));
        let lbrace = self.expect(Token::LBrace);
        let list = self.parse_stmt_list();
        let rbrace = self.expect_closing(Token::RBrace, "block");
        self.label_scope = saved_labels;
        Block {
            lbrace,
            list,
            rbrace,
        }
    }

    fn parse_block_stmt(&mut self) -> Block {
        let lbrace = self.expect(Token::LBrace);
        self.open_scope();
        let list = self.parse_stmt_list();
        self.close_scope();
        let rbrace = self.expect_closing(Token::RBrace, "block");
        Block {
            lbrace,
            list,
            rbrace,
        }
    }

    fn parse_stmt_list(&mut self) -> Vec<Stmt> {
        let mut list = Vec::new();
        while !matches!(
            self.tok,
            Token::Case | Token::Default | Token::RBrace | Token::Eof
        ) {
            let before = self.pos;
            list.push(self.parse_stmt());
            self.ensure_progress(before);
        }
        list
    }

    pub(super) fn parse_stmt(&mut self) -> Stmt {
        match self.tok {
            Token::Const | Token::Type | Token::Var => {
                let keyword = self.tok;
                Stmt::Decl(Decl::Gen(self.parse_gen_decl(keyword)))
            }
            Token::Ident
            | Token::Int
            | Token::Float
            | Token::Imag
            | Token::Char
            | Token::String
            | Token::Func
            | Token::LParen
            | Token::LBrack
            | Token::Struct
            | Token::Map
            | Token::Chan
            | Token::Interface
            | Token::Add
            | Token::Sub
            | Token::Mul
            | Token::And
            | Token::Xor
            | Token::Arrow
            | Token::Not
            | Token::Tilde => {
                let (stmt, _) = self.parse_simple_stmt(SimpleMode::LabelOk);
                if !matches!(stmt, Stmt::Labeled { .. }) {
                    self.expect_semi();
                }
                stmt
            }
            Token::Go => {
                let go_pos = self.pos;
                self.next();
                let call = self.parse_expr();
                self.expect_semi();
                Stmt::Go { go_pos, call }
            }
            Token::Defer => {
                let defer_pos = self.pos;
                self.next();
                let call = self.parse_expr();
                self.expect_semi();
                Stmt::Defer { defer_pos, call }
            }
            Token::Return => {
                let return_pos = self.pos;
                self.next();
                let results = if matches!(self.tok, Token::Semicolon | Token::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list()
                };
                self.expect_semi();
                Stmt::Return {
                    return_pos,
                    results,
                }
            }
            Token::Break | Token::Continue | Token::Goto | Token::Fallthrough => {
                self.parse_branch_stmt()
            }
            Token::LBrace => {
                let block = self.parse_block_stmt();
                self.expect_semi();
                Stmt::Block(block)
            }
            Token::If => self.parse_if_stmt(),
            Token::Switch => self.parse_switch_stmt(),
            Token::Select => self.parse_select_stmt(),
            Token::For => self.parse_for_stmt(),
            Token::Semicolon => {
                let stmt = Stmt::Empty {
                    semicolon: self.pos,
                    implicit: self.lit == "\n",
                };
                self.next();
                stmt
            }
            Token::RBrace => Stmt::Empty {
                semicolon: self.pos,
                implicit: true,
            },
            _ => {
                let from = self.pos;
                self.error_expected(from, "statement");
                self.advance_to_stmt_start();
                Stmt::Bad { from, to: self.pos }
            }
        }
    }

    /// Expression, send, inc/dec, assignment, short variable declaration or
    /// labeled statement. The flag is set for a `range` clause.
    fn parse_simple_stmt(&mut self, mode: SimpleMode) -> (Stmt, bool) {
        let mut lhs = self.parse_expr_list();

        if self.tok.is_assign_op() {
            let tok_pos = self.pos;
            let tok = self.tok;
            self.next();

            let mut is_range = false;
            let rhs = if mode == SimpleMode::RangeOk
                && self.tok == Token::Range
                && matches!(tok, Token::Define | Token::Assign)
            {
                let op_pos = self.pos;
                self.next();
                let x = self.parse_expr();
                is_range = true;
                vec![Rc::new(Expr::Unary {
                    op_pos,
                    op: Token::Range,
                    x,
                })]
            } else {
                self.parse_expr_list()
            };

            let mut declared = Vec::new();
            if tok == Token::Define {
                declared = self.declare_short_vars(&mut lhs);
            }
            let stmt = Rc::new(AssignStmt {
                lhs,
                tok_pos,
                tok,
                rhs,
            });
            for (index, id) in declared {
                let decl = short_var_decl(&stmt, index, is_range);
                self.program.set_decl(id, decl);
            }
            return (Stmt::Assign(stmt), is_range);
        }

        if lhs.len() > 1 {
            let pos = lhs[0].pos();
            self.error_expected(pos, "1 expression");
        }
        let x = lhs.swap_remove(0);

        match self.tok {
            Token::Colon if mode == SimpleMode::LabelOk && matches!(*x, Expr::Ident(_)) => {
                let colon = self.pos;
                self.next();
                let mut label = x.as_ident().cloned().unwrap_or_else(|| Ident::new("_", colon));
                if let Some(scope) = self.label_scope {
                    if let Some(id) = self.new_object(ObjKind::Lbl, &mut label) {
                        self.program.declare(scope, id);
                        self.program.set_decl(id, ObjDecl::Label);
                    }
                }
                let stmt = if self.tok == Token::RBrace {
                    Stmt::Empty {
                        semicolon: self.pos,
                        implicit: true,
                    }
                } else {
                    self.parse_stmt()
                };
                (
                    Stmt::Labeled {
                        label,
                        colon,
                        stmt: Box::new(stmt),
                    },
                    false,
                )
            }
            Token::Arrow => {
                let arrow = self.pos;
                self.next();
                let value = self.parse_expr();
                (
                    Stmt::Send {
                        chan: x,
                        arrow,
                        value,
                    },
                    false,
                )
            }
            Token::Inc | Token::Dec => {
                let tok_pos = self.pos;
                let tok = self.tok;
                self.next();
                (Stmt::IncDec { x, tok_pos, tok }, false)
            }
            _ => (Stmt::Expr(x), false),
        }
    }

    /// Declare the new names on the left of `:=`. Names already declared in
    /// the current scope are assignments and stay references.
    fn declare_short_vars(&mut self, lhs: &mut [ExprRef]) -> Vec<(usize, ObjId)> {
        let mut declared = Vec::new();
        for (index, expr) in lhs.iter_mut().enumerate() {
            let Some(Expr::Ident(ident)) = Rc::get_mut(expr) else {
                let pos = expr.pos();
                self.error(pos, "non-name on left side of :=");
                continue;
            };
            if ident.is_blank() {
                ident.resolution = Resolution::None;
                continue;
            }
            if let Some(existing) = self.program.scope(self.top_scope).lookup(&ident.name) {
                ident.resolution = Resolution::Object(existing);
                continue;
            }
            let scope = self.top_scope;
            if let Some(id) = self.declare(ObjKind::Var, scope, ident) {
                declared.push((index, id));
            }
        }
        declared
    }

    fn parse_branch_stmt(&mut self) -> Stmt {
        let tok_pos = self.pos;
        let tok = self.tok;
        self.next();
        let mut label = None;
        if tok != Token::Fallthrough && self.tok == Token::Ident {
            let mut ident = self.parse_ident();
            if let Some(scope) = self.label_scope {
                ident.resolution = Resolution::Deferred(scope);
            }
            label = Some(ident);
        }
        self.expect_semi();
        Stmt::Branch {
            tok_pos,
            tok,
            label,
        }
    }

    /// Condition of an `if`, with its optional init statement.
    fn parse_if_header(&mut self) -> (Option<Box<Stmt>>, ExprRef) {
        if self.tok == Token::LBrace {
            let pos = self.pos;
            self.error(pos, "missing condition in if statement");
            return (None, Rc::new(Expr::Bad { from: pos, to: pos }));
        }
        let prev_lev = self.expr_lev;
        self.expr_lev = -1;

        let mut init = None;
        let mut cond = None;
        if self.tok != Token::Semicolon {
            cond = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
        }
        if self.tok == Token::Semicolon {
            self.next();
            init = cond.take();
            if self.tok != Token::LBrace {
                cond = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
            }
        }
        self.expr_lev = prev_lev;

        let pos = self.pos;
        let cond = match cond {
            Some(Stmt::Expr(x)) => x,
            _ => {
                self.error(pos, "missing condition in if statement");
                Rc::new(Expr::Bad { from: pos, to: pos })
            }
        };
        (init.map(Box::new), cond)
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let if_pos = self.expect(Token::If);
        self.open_scope();
        let (init, cond) = self.parse_if_header();
        let body = self.parse_block_stmt();

        let else_branch = if self.tok == Token::Else {
            self.next();
            match self.tok {
                Token::If => Some(Box::new(self.parse_if_stmt())),
                Token::LBrace => {
                    let block = self.parse_block_stmt();
                    self.expect_semi();
                    Some(Box::new(Stmt::Block(block)))
                }
                _ => {
                    let pos = self.pos;
                    self.error_expected(pos, "if statement or block");
                    None
                }
            }
        } else {
            self.expect_semi();
            None
        };
        self.close_scope();

        Stmt::If {
            if_pos,
            init,
            cond,
            body,
            else_branch,
        }
    }

    fn parse_switch_stmt(&mut self) -> Stmt {
        let switch_pos = self.expect(Token::Switch);
        self.open_scope();

        let mut init = None;
        let mut header = None;
        if self.tok != Token::LBrace {
            let prev_lev = self.expr_lev;
            self.expr_lev = -1;
            if self.tok != Token::Semicolon {
                header = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
            }
            if self.tok == Token::Semicolon {
                self.next();
                init = header.take();
                if self.tok != Token::LBrace {
                    header = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
                }
            }
            self.expr_lev = prev_lev;
        }

        let type_switch = header.as_ref().is_some_and(is_type_switch_guard);
        let guard = header.as_ref().and_then(type_switch_guard);

        let lbrace = self.expect(Token::LBrace);
        let mut list = Vec::new();
        while matches!(self.tok, Token::Case | Token::Default) {
            list.push(self.parse_case_clause(type_switch, guard.as_ref()));
        }
        let rbrace = self.expect(Token::RBrace);
        self.expect_semi();
        self.close_scope();

        let body = Block {
            lbrace,
            list,
            rbrace,
        };
        let init = init.map(Box::new);
        match header {
            Some(assign) if type_switch => Stmt::TypeSwitch {
                switch_pos,
                init,
                assign: Box::new(assign),
                body,
            },
            header => {
                let tag = match header {
                    Some(Stmt::Expr(x)) => Some(x),
                    Some(_) => {
                        self.error(switch_pos, "switch expression must be an expression");
                        None
                    }
                    None => None,
                };
                Stmt::Switch {
                    switch_pos,
                    init,
                    tag,
                    body,
                }
            }
        }
    }

    fn parse_case_clause(&mut self, type_switch: bool, guard: Option<&Guard>) -> Stmt {
        let case_pos = self.pos;
        let list = if self.tok == Token::Case {
            self.next();
            if type_switch {
                self.parse_type_list()
            } else {
                self.parse_expr_list()
            }
        } else {
            self.expect(Token::Default);
            Vec::new()
        };
        let colon = self.expect(Token::Colon);

        self.open_scope();
        if let Some(guard) = guard {
            let case_type = match list.as_slice() {
                [single] if !matches!(&**single, Expr::Ident(id) if id.name == "nil") => {
                    Some(single.clone())
                }
                _ => None,
            };
            let mut ident = Ident::new(guard.name.clone(), guard.pos);
            let scope = self.top_scope;
            if let Some(id) = self.declare(ObjKind::Var, scope, &mut ident) {
                self.program.set_decl(
                    id,
                    ObjDecl::TypeSwitch {
                        x: guard.x.clone(),
                        case_type,
                    },
                );
            }
        }
        let body = self.parse_stmt_list();
        self.close_scope();

        Stmt::CaseClause {
            case_pos,
            list,
            colon,
            body,
        }
    }

    fn parse_type_list(&mut self) -> Vec<ExprRef> {
        let mut list = vec![self.parse_type()];
        while self.tok == Token::Comma {
            self.next();
            list.push(self.parse_type());
        }
        list
    }

    fn parse_select_stmt(&mut self) -> Stmt {
        let select_pos = self.expect(Token::Select);
        let lbrace = self.expect(Token::LBrace);
        let mut list = Vec::new();
        while matches!(self.tok, Token::Case | Token::Default) {
            list.push(self.parse_comm_clause());
        }
        let rbrace = self.expect(Token::RBrace);
        self.expect_semi();
        Stmt::Select {
            select_pos,
            body: Block {
                lbrace,
                list,
                rbrace,
            },
        }
    }

    fn parse_comm_clause(&mut self) -> Stmt {
        self.open_scope();
        let case_pos = self.pos;
        let comm = if self.tok == Token::Case {
            self.next();
            Some(Box::new(self.parse_simple_stmt(SimpleMode::Basic).0))
        } else {
            self.expect(Token::Default);
            None
        };
        let colon = self.expect(Token::Colon);
        let body = self.parse_stmt_list();
        self.close_scope();
        Stmt::CommClause {
            case_pos,
            comm,
            colon,
            body,
        }
    }

    fn parse_for_stmt(&mut self) -> Stmt {
        let for_pos = self.expect(Token::For);
        self.open_scope();

        let mut init = None;
        let mut cond = None;
        let mut post = None;
        let mut is_range = false;
        if self.tok != Token::LBrace {
            let prev_lev = self.expr_lev;
            self.expr_lev = -1;
            if self.tok == Token::Range {
                // for range x
                let op_pos = self.pos;
                self.next();
                let x = self.parse_expr();
                cond = Some(Stmt::Assign(Rc::new(AssignStmt {
                    lhs: Vec::new(),
                    tok_pos: Pos::NONE,
                    tok: Token::Illegal,
                    rhs: vec![Rc::new(Expr::Unary {
                        op_pos,
                        op: Token::Range,
                        x,
                    })],
                })));
                is_range = true;
            } else if self.tok != Token::Semicolon {
                let (stmt, range) = self.parse_simple_stmt(SimpleMode::RangeOk);
                cond = Some(stmt);
                is_range = range;
            }
            if !is_range && self.tok == Token::Semicolon {
                self.next();
                init = cond.take();
                if self.tok != Token::Semicolon {
                    cond = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
                }
                self.expect(Token::Semicolon);
                if self.tok != Token::LBrace {
                    post = Some(self.parse_simple_stmt(SimpleMode::Basic).0);
                }
            }
            self.expr_lev = prev_lev;
        }

        let body = self.parse_block_stmt();
        self.expect_semi();
        self.close_scope();

        if is_range {
            if let Some(Stmt::Assign(assign)) = cond {
                let x = match assign.rhs.first().map(|x| &**x) {
                    Some(Expr::Unary { x, .. }) => x.clone(),
                    _ => Rc::new(Expr::Bad {
                        from: for_pos,
                        to: for_pos,
                    }),
                };
                return Stmt::Range {
                    for_pos,
                    key: assign.lhs.first().cloned(),
                    value: assign.lhs.get(1).cloned(),
                    tok: assign.tok,
                    x,
                    body,
                };
            }
        }

        let cond = match cond {
            Some(Stmt::Expr(x)) => Some(x),
            Some(_) => {
                self.error(for_pos, "expected for loop condition");
                None
            }
            None => None,
        };
        Stmt::For {
            for_pos,
            init: init.map(Box::new),
            cond,
            post: post.map(Box::new),
            body,
        }
    }
}

/// The declaring syntax of the `index`th variable introduced by `stmt`.
fn short_var_decl(stmt: &Rc<AssignStmt>, index: usize, is_range: bool) -> ObjDecl {
    if is_range {
        if let Some(Expr::Unary { x, .. }) = stmt.rhs.first().map(|x| &**x) {
            return ObjDecl::Range {
                x: x.clone(),
                value: index == 1,
            };
        }
    }
    if let [rhs] = stmt.rhs.as_slice() {
        if let Expr::TypeAssert { x, ty: None, .. } = rhs.unparen() {
            return ObjDecl::TypeSwitch {
                x: x.clone(),
                case_type: None,
            };
        }
    }
    ObjDecl::Assign {
        stmt: stmt.clone(),
        index,
    }
}

fn is_type_switch_guard(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr(x) => x.is_type_switch_assert(),
        Stmt::Assign(assign) => {
            assign.rhs.len() == 1
                && assign.rhs[0].is_type_switch_assert()
                && matches!(assign.tok, Token::Define | Token::Assign)
        }
        _ => false,
    }
}

fn type_switch_guard(stmt: &Stmt) -> Option<Guard> {
    let Stmt::Assign(assign) = stmt else {
        return None;
    };
    if assign.tok != Token::Define {
        return None;
    }
    let ident = assign.lhs.first()?.as_ident()?;
    let Expr::TypeAssert { x, ty: None, .. } = assign.rhs.first()?.unparen() else {
        return None;
    };
    Some(Guard {
        name: ident.name.clone(),
        pos: ident.pos,
        x: x.clone(),
    })
}
