// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expressions.

use std::rc::Rc;

use crate::nodes::{BasicLit, ChanDir, Expr, ExprRef, FuncType, Ident};
use crate::token::{Pos, Token, LOWEST_PREC};

use super::Parser;

impl Parser<'_, '_, '_> {
    pub(super) fn parse_expr(&mut self) -> ExprRef {
        self.parse_binary_expr(LOWEST_PREC + 1)
    }

    pub(super) fn parse_expr_list(&mut self) -> Vec<ExprRef> {
        let mut list = vec![self.parse_expr()];
        while self.tok == Token::Comma {
            self.next();
            list.push(self.parse_expr());
        }
        list
    }

    fn parse_binary_expr(&mut self, prec1: u8) -> ExprRef {
        let mut x = self.parse_unary_expr();
        loop {
            let op = self.tok;
            let oprec = op.precedence();
            if oprec == LOWEST_PREC || oprec < prec1 {
                return x;
            }
            let op_pos = self.pos;
            self.next();
            let y = self.parse_binary_expr(oprec + 1);
            x = Rc::new(Expr::Binary { x, op_pos, op, y });
        }
    }

    pub(super) fn parse_unary_expr(&mut self) -> ExprRef {
        match self.tok {
            Token::Add | Token::Sub | Token::Not | Token::Xor | Token::And | Token::Tilde => {
                let op_pos = self.pos;
                let op = self.tok;
                self.next();
                let x = self.parse_unary_expr();
                Rc::new(Expr::Unary { op_pos, op, x })
            }
            Token::Arrow => {
                let arrow = self.pos;
                self.next();
                let x = self.parse_unary_expr();
                // `<-chan T` is a receive-only channel type, not a receive.
                if let Expr::ChanType {
                    dir: ChanDir::Both,
                    value,
                    ..
                } = &*x
                {
                    return Rc::new(Expr::ChanType {
                        begin: arrow,
                        dir: ChanDir::Recv,
                        value: value.clone(),
                    });
                }
                Rc::new(Expr::Unary {
                    op_pos: arrow,
                    op: Token::Arrow,
                    x,
                })
            }
            Token::Mul => {
                let star = self.pos;
                self.next();
                let x = self.parse_unary_expr();
                Rc::new(Expr::Star { star, x })
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_primary_expr(&mut self) -> ExprRef {
        let mut x = self.parse_operand();
        loop {
            match self.tok {
                Token::Period => {
                    self.next();
                    match self.tok {
                        Token::Ident => {
                            let sel = self.parse_ident();
                            x = Rc::new(Expr::Selector { x, sel });
                        }
                        Token::LParen => {
                            let lparen = self.pos;
                            self.next();
                            let ty = if self.tok == Token::Type {
                                self.next();
                                None
                            } else {
                                Some(self.parse_type())
                            };
                            let rparen = self.expect(Token::RParen);
                            x = Rc::new(Expr::TypeAssert {
                                x,
                                lparen,
                                ty,
                                rparen,
                            });
                        }
                        _ => {
                            let pos = self.pos;
                            self.error_expected(pos, "selector or type assertion");
                            let sel = Ident::new("_", pos);
                            x = Rc::new(Expr::Selector { x, sel });
                        }
                    }
                }
                Token::LBrack => x = self.parse_index_or_slice(x),
                Token::LParen => x = self.parse_call(x),
                Token::LBrace => {
                    if self.starts_composite_lit(&x) {
                        x = self.parse_composite_lit(Some(x));
                    } else {
                        return x;
                    }
                }
                _ => return x,
            }
        }
    }

    fn parse_operand(&mut self) -> ExprRef {
        match self.tok {
            Token::Ident => {
                let ident = self.parse_ident();
                self.ident_expr(ident)
            }
            Token::Int | Token::Float | Token::Imag | Token::Char | Token::String => {
                let lit = BasicLit {
                    pos: self.pos,
                    kind: self.tok,
                    value: std::mem::take(&mut self.lit),
                };
                self.next();
                Rc::new(Expr::BasicLit(lit))
            }
            Token::LParen => {
                let lparen = self.pos;
                self.next();
                self.expr_lev += 1;
                let x = self.parse_expr();
                self.expr_lev -= 1;
                let rparen = self.expect(Token::RParen);
                Rc::new(Expr::Paren { lparen, x, rparen })
            }
            Token::Func => self.parse_func_type_or_lit(),
            Token::LBrack
            | Token::Struct
            | Token::Map
            | Token::Chan
            | Token::Interface => self.parse_type(),
            _ => {
                let pos = self.pos;
                self.error_expected(pos, "operand");
                if !matches!(
                    self.tok,
                    Token::RParen
                        | Token::RBrack
                        | Token::RBrace
                        | Token::Semicolon
                        | Token::Comma
                        | Token::Colon
                        | Token::LBrace
                        | Token::Eof
                ) {
                    self.next();
                }
                Rc::new(Expr::Bad {
                    from: pos,
                    to: self.pos,
                })
            }
        }
    }

    fn parse_func_type_or_lit(&mut self) -> ExprRef {
        let func_pos = self.expect(Token::Func);
        self.open_scope();
        let params = self.parse_parameters();
        let results = self.parse_results();
        let ty = Rc::new(FuncType {
            func_pos,
            type_params: None,
            params,
            results,
        });
        if self.tok != Token::LBrace {
            self.close_scope();
            return Rc::new(Expr::FuncType(ty));
        }
        self.expr_lev += 1;
        let body = self.parse_body();
        self.expr_lev -= 1;
        self.close_scope();
        Rc::new(Expr::FuncLit {
            ty,
            body: Rc::new(body),
        })
    }

    fn parse_index_or_slice(&mut self, x: ExprRef) -> ExprRef {
        let lbrack = self.expect(Token::LBrack);
        if self.tok == Token::RBrack {
            let pos = self.pos;
            self.error_expected(pos, "operand");
            let rbrack = self.expect(Token::RBrack);
            let bad = Rc::new(Expr::Bad { from: pos, to: pos });
            return Rc::new(Expr::Index {
                x,
                lbrack,
                indices: vec![bad],
                rbrack,
            });
        }

        self.expr_lev += 1;
        let mut index: [Option<ExprRef>; 3] = [None, None, None];
        if self.tok != Token::Colon {
            index[0] = Some(self.parse_expr());
        }

        if self.tok == Token::Comma {
            // Instantiation with several type arguments.
            let mut indices: Vec<ExprRef> = index[0].take().into_iter().collect();
            while self.tok == Token::Comma {
                self.next();
                if self.tok == Token::RBrack {
                    break;
                }
                indices.push(self.parse_expr());
            }
            self.expr_lev -= 1;
            let rbrack = self.expect(Token::RBrack);
            return Rc::new(Expr::Index {
                x,
                lbrack,
                indices,
                rbrack,
            });
        }

        let mut ncolons = 0;
        while self.tok == Token::Colon && ncolons < 2 {
            ncolons += 1;
            self.next();
            if !matches!(self.tok, Token::Colon | Token::RBrack | Token::Eof) {
                index[ncolons] = Some(self.parse_expr());
            }
        }
        self.expr_lev -= 1;
        let rbrack = self.expect(Token::RBrack);

        let [low, high, max] = index;
        if ncolons > 0 {
            let slice3 = ncolons == 2;
            if slice3 && (high.is_none() || max.is_none()) {
                self.error(rbrack, "middle and final index required in 3-index slice");
            }
            return Rc::new(Expr::Slice {
                x,
                lbrack,
                low,
                high,
                max,
                slice3,
                rbrack,
            });
        }
        let index = low.unwrap_or_else(|| Rc::new(Expr::Bad { from: lbrack, to: rbrack }));
        Rc::new(Expr::Index {
            x,
            lbrack,
            indices: vec![index],
            rbrack,
        })
    }

    fn parse_call(&mut self, fun: ExprRef) -> ExprRef {
        let lparen = self.expect(Token::LParen);
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut ellipsis = Pos::NONE;
        while self.tok != Token::RParen && self.tok != Token::Eof && !ellipsis.is_valid() {
            args.push(self.parse_expr());
            if self.tok == Token::Ellipsis {
                ellipsis = self.pos;
                self.next();
            }
            if !self.at_comma("argument list", Token::RParen) {
                break;
            }
            self.next();
        }
        self.expr_lev -= 1;
        let rparen = self.expect_closing(Token::RParen, "argument list");
        Rc::new(Expr::Call {
            fun,
            lparen,
            args,
            ellipsis,
            rparen,
        })
    }

    pub(super) fn parse_composite_lit(&mut self, ty: Option<ExprRef>) -> ExprRef {
        let lbrace = self.expect(Token::LBrace);
        self.expr_lev += 1;
        let mut elts = Vec::new();
        while self.tok != Token::RBrace && self.tok != Token::Eof {
            elts.push(self.parse_element());
            if !self.at_comma("composite literal", Token::RBrace) {
                break;
            }
            self.next();
        }
        self.expr_lev -= 1;
        let rbrace = self.expect_closing(Token::RBrace, "composite literal");
        Rc::new(Expr::CompositeLit {
            ty,
            lbrace,
            elts,
            rbrace,
        })
    }

    fn parse_element(&mut self) -> ExprRef {
        let key = self.parse_element_value();
        if self.tok != Token::Colon {
            return key;
        }
        let colon = self.pos;
        self.next();
        let value = self.parse_element_value();
        Rc::new(Expr::KeyValue { key, colon, value })
    }

    fn parse_element_value(&mut self) -> ExprRef {
        if self.tok == Token::LBrace {
            return self.parse_composite_lit(None);
        }
        self.parse_expr()
    }

    /// Whether `{` after `x` opens a composite literal rather than a block.
    fn starts_composite_lit(&self, x: &Expr) -> bool {
        match x.unparen() {
            Expr::Bad { .. } | Expr::Ident(_) | Expr::Selector { .. } | Expr::Index { .. } => {
                self.expr_lev >= 0
            }
            Expr::ArrayType { .. } | Expr::StructType { .. } | Expr::MapType { .. } => true,
            _ => false,
        }
    }
}
