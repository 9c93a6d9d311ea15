use super::Parser;
use crate::ast::{BinOp, RawExpr, RawLiteral, UnaryOp};
use crate::error::ElabError;
use crate::lexer::Token;
use std::rc::Rc;

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------

    /// expr := lambda | conditional
    pub(super) fn parse_expr(&mut self) -> Result<RawExpr, ElabError> {
        self.descend()?;
        let e = if self.is_word("lambda") {
            self.parse_lambda()
        } else {
            self.parse_conditional()
        };
        self.ascend(1);
        e
    }

    fn parse_lambda(&mut self) -> Result<RawExpr, ElabError> {
        let line = self.cur_line();
        self.advance();
        let mut params = Vec::new();
        if self.peek() != &Token::Colon {
            loop {
                let p = self.take_name()?;
                if params.contains(&p) {
                    return Err(self.err(format!("duplicate parameter '{}' in lambda", p)));
                }
                params.push(p);
                if self.peek() == &Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::Colon, ":")?;
        let body = self.parse_expr()?;
        Ok(RawExpr::Lambda {
            params,
            body: Rc::new(body),
            line,
        })
    }

    /// conditional := or_expr ['if' or_expr 'else' expr]
    fn parse_conditional(&mut self) -> Result<RawExpr, ElabError> {
        let then = self.parse_or_expr()?;
        if !self.is_word("if") {
            return Ok(then);
        }
        self.advance();
        let cond = self.parse_or_expr()?;
        if !self.is_word("else") {
            return Err(self.err(format!(
                "expected 'else' in conditional expression, got {:?}",
                self.peek()
            )));
        }
        self.advance();
        let otherwise = self.parse_expr()?;
        Ok(RawExpr::IfElse {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or_expr(&mut self) -> Result<RawExpr, ElabError> {
        let mut left = self.parse_and_expr()?;
        let mut chained = 0;
        while self.is_word("or") {
            self.descend()?;
            chained += 1;
            self.advance();
            let right = self.parse_and_expr()?;
            left = RawExpr::Or(Box::new(left), Box::new(right));
        }
        self.ascend(chained);
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<RawExpr, ElabError> {
        let mut left = self.parse_not_expr()?;
        let mut chained = 0;
        while self.is_word("and") {
            self.descend()?;
            chained += 1;
            self.advance();
            let right = self.parse_not_expr()?;
            left = RawExpr::And(Box::new(left), Box::new(right));
        }
        self.ascend(chained);
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<RawExpr, ElabError> {
        if self.is_word("not") {
            self.descend()?;
            self.advance();
            let e = self.parse_not_expr()?;
            self.ascend(1);
            return Ok(RawExpr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(e),
            });
        }
        self.parse_comparison()
    }

    fn comparison_op(&self) -> Option<BinOp> {
        match self.peek() {
            Token::Eq => Some(BinOp::Eq),
            Token::Neq => Some(BinOp::Neq),
            Token::Lt => Some(BinOp::Lt),
            Token::Lte => Some(BinOp::Lte),
            Token::Gt => Some(BinOp::Gt),
            Token::Gte => Some(BinOp::Gte),
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> Result<RawExpr, ElabError> {
        let left = self.parse_arith()?;
        let Some(op) = self.comparison_op() else {
            return Ok(left);
        };
        let line = self.cur_line();
        self.advance();
        let right = self.parse_arith()?;
        if self.comparison_op().is_some() {
            return Err(self.err("chained comparisons are not supported"));
        }
        Ok(RawExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        })
    }

    fn parse_arith(&mut self) -> Result<RawExpr, ElabError> {
        let mut left = self.parse_term()?;
        let mut chained = 0;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.descend()?;
            chained += 1;
            let line = self.cur_line();
            self.advance();
            let right = self.parse_term()?;
            left = RawExpr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        self.ascend(chained);
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<RawExpr, ElabError> {
        let mut left = self.parse_factor()?;
        let mut chained = 0;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::SlashSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.descend()?;
            chained += 1;
            let line = self.cur_line();
            self.advance();
            let right = self.parse_factor()?;
            left = RawExpr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        self.ascend(chained);
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<RawExpr, ElabError> {
        let op = match self.peek() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Plus => Some(UnaryOp::Pos),
            _ => None,
        };
        if let Some(op) = op {
            self.descend()?;
            self.advance();
            let operand = self.parse_factor()?;
            self.ascend(1);
            return Ok(RawExpr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_power()
    }

    /// power := postfix ['**' factor], so `2 ** -1` and `2 ** 3 ** 2` parse
    /// the way Python reads them.
    fn parse_power(&mut self) -> Result<RawExpr, ElabError> {
        let base = self.parse_postfix()?;
        if self.peek() != &Token::StarStar {
            return Ok(base);
        }
        self.descend()?;
        let line = self.cur_line();
        self.advance();
        let exp = self.parse_factor()?;
        self.ascend(1);
        Ok(RawExpr::Binary {
            op: BinOp::Pow,
            left: Box::new(base),
            right: Box::new(exp),
            line,
        })
    }

    fn parse_postfix(&mut self) -> Result<RawExpr, ElabError> {
        let mut e = self.parse_atom()?;
        let mut chained = 0;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.descend()?;
                    chained += 1;
                    let line = self.cur_line();
                    self.advance();
                    let args = self.parse_expr_list(Token::RParen, ")")?;
                    e = RawExpr::Call {
                        callee: Box::new(e),
                        args,
                        line,
                    };
                }
                Token::LBracket => {
                    self.descend()?;
                    chained += 1;
                    let line = self.cur_line();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket, "]")?;
                    e = RawExpr::Index {
                        target: Box::new(e),
                        index: Box::new(index),
                        line,
                    };
                }
                _ => break,
            }
        }
        self.ascend(chained);
        Ok(e)
    }

    /// Comma-separated expressions up to (and consuming) `close`.
    /// A trailing comma is accepted.
    fn parse_expr_list(&mut self, close: Token, shown: &str) -> Result<Vec<RawExpr>, ElabError> {
        let mut items = Vec::new();
        while self.peek() != &close {
            items.push(self.parse_expr()?);
            if self.peek() == &Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(close, shown)?;
        Ok(items)
    }

    fn parse_atom(&mut self) -> Result<RawExpr, ElabError> {
        let line = self.cur_line();
        match self.peek().clone() {
            Token::Int(n) => {
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::Int(n)))
            }
            Token::Float(s) => {
                let f: f64 = s
                    .parse()
                    .map_err(|_| self.err(format!("invalid float literal '{}'", s)))?;
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::Float(f)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::Str(s)))
            }
            Token::Word(w) if w == "True" => {
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::Bool(true)))
            }
            Token::Word(w) if w == "False" => {
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::Bool(false)))
            }
            Token::Word(w) if w == "None" => {
                self.advance();
                Ok(RawExpr::Literal(RawLiteral::None))
            }
            Token::Word(_) => {
                let name = self.take_name()?;
                Ok(RawExpr::Name { name, line })
            }
            Token::LBracket => {
                self.advance();
                let items = self.parse_expr_list(Token::RBracket, "]")?;
                Ok(RawExpr::List(items))
            }
            Token::LParen => {
                self.advance();
                if self.peek() == &Token::RParen {
                    self.advance();
                    return Ok(RawExpr::Tuple(Vec::new()));
                }
                let first = self.parse_expr()?;
                if self.peek() == &Token::RParen {
                    self.advance();
                    return Ok(first);
                }
                self.expect(Token::Comma, ",")?;
                let mut items = vec![first];
                items.extend(self.parse_expr_list(Token::RParen, ")")?);
                Ok(RawExpr::Tuple(items))
            }
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }
}
