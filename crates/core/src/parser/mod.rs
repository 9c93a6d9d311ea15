//! Block parser.
//!
//! A block is a comma-separated sequence of `name: expression` pairs, the
//! body of a dictionary literal without its braces. The parser produces
//! raw entries only; classification and every other check is elaboration's
//! job.

use crate::error::ElabError;
use crate::lexer::{Spanned, Token};

mod expressions;

pub use crate::ast::{BinOp, RawEntry, RawExpr, RawLiteral, UnaryOp};

/// Words that can never be used as names.
pub const KEYWORDS: &[&str] = &[
    "lambda", "if", "else", "and", "or", "not", "True", "False", "None",
];

/// Deepest expression tree the parser builds. Every nested
/// subexpression and every operator of a chain like `a + b + c` counts
/// one level; later passes and the evaluator recurse over the same tree.
pub const MAX_NESTING: usize = 100;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Go one level deeper into the expression tree.
    fn descend(&mut self) -> Result<(), ElabError> {
        if self.depth >= MAX_NESTING {
            return Err(self.err(format!(
                "expression nested too deeply (more than {} levels)",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: Token, shown: &str) -> Result<(), ElabError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", shown, self.peek())))
        }
    }

    fn err(&self, msg: impl Into<String>) -> ElabError {
        ElabError::parse(self.cur_line(), msg)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    /// Take an identifier that is not a keyword.
    fn take_name(&mut self) -> Result<String, ElabError> {
        if let Token::Word(w) = self.peek().clone() {
            if KEYWORDS.contains(&w.as_str()) {
                return Err(self.err(format!("keyword '{}' cannot be used as a name", w)));
            }
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {:?}", self.peek())))
        }
    }

    // -- Block ---------------------------------------------------

    fn parse_block(&mut self) -> Result<Vec<RawEntry>, ElabError> {
        let mut entries = Vec::new();
        while self.peek() != &Token::Eof {
            let line = self.cur_line();
            let name = self.take_name()?;
            self.expect(Token::Colon, ":")?;
            let expr = self.parse_expr()?;
            entries.push(RawEntry { name, expr, line });
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::Eof => {}
                other => {
                    return Err(self.err(format!(
                        "expected ',' between bindings, got {:?}",
                        other
                    )))
                }
            }
        }
        Ok(entries)
    }
}

/// Parse the entries of one block.
pub fn parse(tokens: &[Spanned]) -> Result<Vec<RawEntry>, ElabError> {
    let mut p = Parser::new(tokens);
    p.parse_block()
}

/// Parse a standalone expression, requiring the whole token stream to be
/// consumed.
pub fn parse_expression(tokens: &[Spanned]) -> Result<RawExpr, ElabError> {
    let mut p = Parser::new(tokens);
    let e = p.parse_expr()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!("unexpected trailing token {:?}", p.peek())));
    }
    Ok(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn block(src: &str) -> Vec<RawEntry> {
        parse(&lex(src).unwrap()).unwrap()
    }

    fn expr(src: &str) -> RawExpr {
        parse_expression(&lex(src).unwrap()).unwrap()
    }

    fn name(n: &str) -> RawExpr {
        RawExpr::Name {
            name: n.to_owned(),
            line: 1,
        }
    }

    #[test]
    fn block_entries_keep_order_and_lines() {
        let entries = block("f: lambda n: 2*n + b,\n  a: f(3),\n  b: 5,\n");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["f", "a", "b"]);
        assert_eq!(entries[1].line, 2);
        assert_eq!(entries[0].expr.lambda_arity(), Some(1));
    }

    #[test]
    fn lambda_body_stops_at_entry_comma() {
        let entries = block("f: lambda x, y: x if y else 0, g: 1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].expr.lambda_arity(), Some(2));
    }

    #[test]
    fn empty_block_has_no_entries() {
        assert!(block("  \n # nothing here\n").is_empty());
    }

    #[test]
    fn missing_colon_is_syntax_error() {
        let err = parse(&lex("a 1").unwrap()).unwrap_err();
        assert!(err.message.contains("expected ':'"));
    }

    #[test]
    fn missing_comma_is_syntax_error() {
        let err = parse(&lex("a: 1 b: 2").unwrap()).unwrap_err();
        assert!(err.message.contains("expected ','"));
    }

    #[test]
    fn keyword_as_name_is_rejected() {
        assert!(parse(&lex("lambda: 1").unwrap()).is_err());
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match expr("1 + 2 * 3") {
            RawExpr::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, RawExpr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative_and_beats_unary_minus() {
        // -2 ** 2 == -(2 ** 2)
        match expr("-2 ** 2") {
            RawExpr::Unary { op: UnaryOp::Neg, operand } => {
                assert!(matches!(*operand, RawExpr::Binary { op: BinOp::Pow, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn conditional_expression_shape() {
        match expr("a if c else b") {
            RawExpr::IfElse {
                cond,
                then,
                otherwise,
            } => {
                assert_eq!(*cond, name("c"));
                assert_eq!(*then, name("a"));
                assert_eq!(*otherwise, name("b"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn chained_calls_and_subscripts() {
        match expr("f(1)(2)[0]") {
            RawExpr::Index { target, .. } => match *target {
                RawExpr::Call { callee, args, .. } => {
                    assert_eq!(args.len(), 1);
                    assert!(matches!(*callee, RawExpr::Call { .. }));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parenthesised_forms() {
        assert_eq!(expr("(x)"), name("x"));
        assert_eq!(expr("()"), RawExpr::Tuple(vec![]));
        assert_eq!(expr("(x,)"), RawExpr::Tuple(vec![name("x")]));
        assert_eq!(
            expr("[x, 1]"),
            RawExpr::List(vec![name("x"), RawExpr::Literal(RawLiteral::Int(1))])
        );
    }

    #[test]
    fn chained_comparison_is_rejected() {
        assert!(parse_expression(&lex("a < b < c").unwrap()).is_err());
    }

    fn nested_parens(levels: usize) -> String {
        format!("{}1{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        assert_eq!(
            expr(&nested_parens(MAX_NESTING - 1)),
            RawExpr::Literal(RawLiteral::Int(1))
        );
        let chain = format!("1{}", " + 1".repeat(MAX_NESTING - 1));
        assert!(parse_expression(&lex(&chain).unwrap()).is_ok());
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        for src in [
            nested_parens(MAX_NESTING),
            nested_parens(20_000),
            format!("{}1{}", "[".repeat(5_000), "]".repeat(5_000)),
            format!("{}1", "-".repeat(5_000)),
            format!("1{}", " + 1".repeat(20_000)),
            format!("f{}", "(1)".repeat(MAX_NESTING)),
        ] {
            let err = parse_expression(&lex(&src).unwrap()).unwrap_err();
            assert!(err.message.contains("nested too deeply"), "{}", err.message);
        }
        let err = parse(&lex(&format!("x: {}", nested_parens(500))).unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
        assert_eq!(err.pass, 0);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(parse_expression(&lex("a b").unwrap()).is_err());
    }
}
