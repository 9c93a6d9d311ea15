//! Special symbols (`__print__`, `__config__`), run once the block's slots
//! are filled.

use std::rc::Rc;

use lambdascript_core::{BinOp, Directive, DirectiveKind, RawExpr, RawLiteral, UnaryOp};

use crate::error::BlockError;
use crate::eval::eval;
use crate::frame::Scope;
use crate::types::Value;

/// What a directive asks the session to do.
#[derive(Debug)]
pub enum Effect {
    /// Deliver a value to the block's output.
    Emit(Value),
    /// Record configuration options, in order.
    Configure(Vec<(String, serde_json::Value)>),
}

pub fn run_directive(directive: &Directive, frame: &Rc<Scope>) -> Result<Effect, BlockError> {
    let malformed = |message: String| BlockError::MalformedDirective {
        directive: directive.name.clone(),
        line: directive.line,
        message,
    };
    match directive.kind {
        DirectiveKind::Print => eval(&directive.expr, frame)
            .map(Effect::Emit)
            .map_err(|source| BlockError::EvaluationFailure {
                binding: directive.name.clone(),
                line: directive.line,
                source,
            }),
        DirectiveKind::Config => config_entries(&directive.expr)
            .map(Effect::Configure)
            .map_err(malformed),
    }
}

/// `option == literal`, `option != bool`, or a tuple of those.
pub fn config_entries(expr: &RawExpr) -> Result<Vec<(String, serde_json::Value)>, String> {
    match expr {
        RawExpr::Tuple(items) if !items.is_empty() => items.iter().map(config_entry).collect(),
        other => config_entry(other).map(|e| vec![e]),
    }
}

fn config_entry(expr: &RawExpr) -> Result<(String, serde_json::Value), String> {
    let RawExpr::Binary {
        op, left, right, ..
    } = expr
    else {
        return Err("expected 'option == value' or 'option != value'".into());
    };
    let RawExpr::Name { name, .. } = &**left else {
        return Err("the left side of a configuration entry must be an option name".into());
    };
    let value = literal(right)?;
    match op {
        BinOp::Eq => Ok((name.clone(), value)),
        BinOp::Neq => match value {
            serde_json::Value::Bool(b) => Ok((name.clone(), serde_json::Value::Bool(!b))),
            _ => Err(format!("'{} != ...' needs True or False", name)),
        },
        _ => Err(format!(
            "unsupported operator '{}' in configuration entry",
            op.symbol()
        )),
    }
}

fn literal(expr: &RawExpr) -> Result<serde_json::Value, String> {
    use serde_json::Value as J;
    match expr {
        RawExpr::Literal(lit) => Ok(match lit {
            RawLiteral::None => J::Null,
            RawLiteral::Bool(b) => J::Bool(*b),
            RawLiteral::Int(i) => J::from(*i),
            RawLiteral::Float(f) => J::from(*f),
            RawLiteral::Str(s) => J::from(s.as_str()),
        }),
        RawExpr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match &**operand {
            RawExpr::Literal(RawLiteral::Int(i)) => Ok(J::from(-i)),
            RawExpr::Literal(RawLiteral::Float(f)) => Ok(J::from(-f)),
            _ => Err("configuration values must be literals".into()),
        },
        _ => Err("configuration values must be literals".into()),
    }
}
