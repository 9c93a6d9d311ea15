//! Shared AST types for the LambdaScript elaborator.
//!
//! These types are produced by the parser and consumed throughout all
//! elaboration passes and by the evaluator. They live here so that pass
//! modules can import them without depending on the parser.

use std::rc::Rc;

// ──────────────────────────────────────────────
// Block entries
// ──────────────────────────────────────────────

/// One `name: expression` pair of a block, in source order.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub name: String,
    pub expr: RawExpr,
    /// Line of the name token, relative to the block text
    pub line: u32,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RawLiteral {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
        }
    }
}

/// A parsed expression.
///
/// Lambda bodies are reference counted so that closures created at run
/// time share the tree instead of copying it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpr {
    Literal(RawLiteral),
    Name {
        name: String,
        line: u32,
    },
    List(Vec<RawExpr>),
    Tuple(Vec<RawExpr>),
    Lambda {
        params: Vec<String>,
        body: Rc<RawExpr>,
        line: u32,
    },
    Call {
        callee: Box<RawExpr>,
        args: Vec<RawExpr>,
        line: u32,
    },
    Index {
        target: Box<RawExpr>,
        index: Box<RawExpr>,
        line: u32,
    },
    Unary {
        op: UnaryOp,
        operand: Box<RawExpr>,
    },
    Binary {
        op: BinOp,
        left: Box<RawExpr>,
        right: Box<RawExpr>,
        line: u32,
    },
    And(Box<RawExpr>, Box<RawExpr>),
    Or(Box<RawExpr>, Box<RawExpr>),
    /// `then if cond else otherwise`
    IfElse {
        cond: Box<RawExpr>,
        then: Box<RawExpr>,
        otherwise: Box<RawExpr>,
    },
}

impl RawExpr {
    /// Parameter count when this expression is syntactically a lambda.
    pub fn lambda_arity(&self) -> Option<usize> {
        match self {
            RawExpr::Lambda { params, .. } => Some(params.len()),
            _ => None,
        }
    }
}
