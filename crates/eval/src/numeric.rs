//! Operator semantics for the host evaluator.
//!
//! Integers are 64-bit with checked arithmetic: an overflow is an error,
//! never a wrap. Mixing int and float promotes to float. `/` always yields
//! a float; `//` and `%` round toward negative infinity.

use std::cmp::Ordering;

use lambdascript_core::{BinOp, UnaryOp};

use crate::types::{EvalError, Value};

/// Longest string (in bytes) or list an operator or builtin may build.
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

/// `len` if a result of that size may be built, an error naming `op`
/// otherwise. `None` stands for a size that does not even fit a `usize`.
pub fn sequence_len(op: &str, len: Option<usize>) -> Result<usize, EvalError> {
    match len {
        Some(n) if n <= MAX_SEQUENCE_LEN => Ok(n),
        _ => Err(EvalError::TooLarge { op: op.to_owned() }),
    }
}

enum Num {
    Int(i64),
    Float(f64),
}

fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Bool(b) => Some(Num::Int(i64::from(*b))),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

fn to_f64(n: &Num) -> f64 {
    match n {
        Num::Int(i) => *i as f64,
        Num::Float(f) => *f,
    }
}

fn overflow(op: BinOp) -> EvalError {
    EvalError::Overflow {
        op: op.symbol().to_owned(),
    }
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> EvalError {
    EvalError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

/// Evaluate a non-short-circuit binary operator.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Neq => Ok(Value::Bool(left != right)),
        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
            let ord = compare(left, right)?;
            let result = match op {
                BinOp::Lt => ord == Ordering::Less,
                BinOp::Lte => ord != Ordering::Greater,
                BinOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinOp::Add => add(left, right),
        BinOp::Mul => mul(left, right),
        _ => arith(op, left, right),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let joined = |a: usize, b: usize| sequence_len("+", a.checked_add(b));
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            joined(a.len(), b.len())?;
            Ok(Value::str(format!("{}{}", a, b)))
        }
        (Value::List(a), Value::List(b)) => {
            joined(a.len(), b.len())?;
            Ok(Value::list(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Tuple(a), Value::Tuple(b)) => {
            joined(a.len(), b.len())?;
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        _ => arith(BinOp::Add, left, right),
    }
}

fn mul(left: &Value, right: &Value) -> Result<Value, EvalError> {
    // A negative count repeats zero times
    let repeat = |count: i64, len: usize| -> Result<usize, EvalError> {
        let count = usize::try_from(count).unwrap_or(0);
        sequence_len("*", len.checked_mul(count))?;
        Ok(count)
    };
    match (left, right) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            Ok(Value::str(s.repeat(repeat(*n, s.len())?)))
        }
        (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
            let n = repeat(*n, items.len())?;
            let mut out = Vec::with_capacity(items.len() * n);
            for _ in 0..n {
                out.extend(items.iter().cloned());
            }
            Ok(Value::list(out))
        }
        _ => arith(BinOp::Mul, left, right),
    }
}

fn arith(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (a, b) = match (num(left), num(right)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(unsupported(op, left, right)),
    };
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => int_arith(op, a, b),
        (a, b) => float_arith(op, to_f64(&a), to_f64(&b)),
    }
}

fn int_arith(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let checked = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div_euclid(b).map(|q| {
                // euclid rounds toward -inf only for positive divisors
                if b < 0 && a.rem_euclid(b) != 0 {
                    q - 1
                } else {
                    q
                }
            })
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem_euclid(b).map(|r| if b < 0 && r != 0 { r + b } else { r })
        }
        BinOp::Pow => {
            if b < 0 {
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|e| a.checked_pow(e))
        }
        _ => unreachable!("comparison operators are handled by binary()"),
    };
    checked.map(Value::Int).ok_or_else(|| overflow(op))
}

fn float_arith(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div | BinOp::FloorDiv | BinOp::Mod if b == 0.0 => {
            return Err(EvalError::DivisionByZero)
        }
        BinOp::Div => a / b,
        BinOp::FloorDiv => (a / b).floor(),
        BinOp::Mod => a - b * (a / b).floor(),
        BinOp::Pow => a.powf(b),
        _ => unreachable!("comparison operators are handled by binary()"),
    };
    Ok(Value::Float(result))
}

/// Ordering used by `< <= > >=`, `min` and `max`.
pub fn compare(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return compare(x, y);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => match (num(left), num(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(a.cmp(&b)),
            (Some(a), Some(b)) => to_f64(&a).partial_cmp(&to_f64(&b)).ok_or_else(|| {
                EvalError::type_error("comparison with nan")
            }),
            _ => Err(EvalError::type_error(format!(
                "'<' not supported between '{}' and '{}'",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match (op, num(operand)) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!operand.truthy())),
        (UnaryOp::Neg, Some(Num::Int(i))) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| EvalError::Overflow { op: "-".into() }),
        (UnaryOp::Neg, Some(Num::Float(f))) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Some(Num::Int(i))) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Some(Num::Float(f))) => Ok(Value::Float(f)),
        (_, None) => Err(EvalError::type_error(format!(
            "bad operand type for unary {}: '{}'",
            if op == UnaryOp::Neg { "-" } else { "+" },
            operand.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against `len`.
pub fn normalize_index(index: i64, len: usize) -> Result<usize, EvalError> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(EvalError::IndexOutOfRange { index, len })
    }
}

/// `target[index]` for lists, tuples and strings.
pub fn index(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let i = match index {
        Value::Int(_) | Value::Bool(_) => index.as_int()?,
        other => {
            return Err(EvalError::type_error(format!(
                "indices must be integers, not '{}'",
                other.type_name()
            )))
        }
    };
    match target {
        Value::List(items) | Value::Tuple(items) => {
            Ok(items[normalize_index(i, items.len())?].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let c = chars[normalize_index(i, chars.len())?];
            Ok(Value::str(c.to_string()))
        }
        other => Err(EvalError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Int(i)
    }

    #[test]
    fn floor_division_and_modulo_round_down() {
        assert_eq!(binary(BinOp::FloorDiv, &int(7), &int(2)), Ok(int(3)));
        assert_eq!(binary(BinOp::FloorDiv, &int(-7), &int(2)), Ok(int(-4)));
        assert_eq!(binary(BinOp::FloorDiv, &int(7), &int(-2)), Ok(int(-4)));
        assert_eq!(binary(BinOp::FloorDiv, &int(-7), &int(-2)), Ok(int(3)));
        assert_eq!(binary(BinOp::Mod, &int(-7), &int(2)), Ok(int(1)));
        assert_eq!(binary(BinOp::Mod, &int(7), &int(-2)), Ok(int(-1)));
        assert_eq!(binary(BinOp::Mod, &int(-7), &int(-2)), Ok(int(-1)));
        assert_eq!(binary(BinOp::Mod, &int(6), &int(-2)), Ok(int(0)));
    }

    #[test]
    fn true_division_yields_float() {
        assert_eq!(
            binary(BinOp::Div, &int(4), &int(2)),
            Ok(Value::Float(2.0))
        );
        assert_eq!(
            binary(BinOp::Div, &int(1), &int(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn integer_overflow_is_an_error() {
        assert_eq!(
            binary(BinOp::Add, &int(i64::MAX), &int(1)),
            Err(EvalError::Overflow { op: "+".into() })
        );
        assert!(binary(BinOp::Pow, &int(2), &int(64)).is_err());
        assert_eq!(binary(BinOp::Pow, &int(2), &int(10)), Ok(int(1024)));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(
            binary(BinOp::Add, &int(1), &Value::Float(0.5)),
            Ok(Value::Float(1.5))
        );
    }

    #[test]
    fn sequences_concatenate_and_repeat() {
        assert_eq!(
            binary(BinOp::Add, &Value::str("ab"), &Value::str("c")),
            Ok(Value::str("abc"))
        );
        assert_eq!(
            binary(BinOp::Mul, &Value::list(vec![int(1)]), &int(3)),
            Ok(Value::list(vec![int(1), int(1), int(1)]))
        );
        assert!(binary(BinOp::Add, &Value::str("a"), &int(1)).is_err());
    }

    #[test]
    fn oversized_repetition_is_an_error() {
        let too_large = Err(EvalError::TooLarge { op: "*".into() });
        assert_eq!(
            binary(BinOp::Mul, &Value::str("ab"), &int(9_000_000_000_000_000_000)),
            too_large
        );
        assert_eq!(
            binary(BinOp::Mul, &int(i64::MAX), &Value::list(vec![int(0)])),
            too_large
        );
        let half = i64::try_from(MAX_SEQUENCE_LEN / 2 + 1).unwrap();
        assert_eq!(binary(BinOp::Mul, &Value::str("ab"), &int(half)), too_large);
        // Empty sequences and negative counts stay empty
        assert_eq!(
            binary(BinOp::Mul, &Value::str(""), &int(i64::MAX)),
            Ok(Value::str(""))
        );
        assert_eq!(
            binary(BinOp::Mul, &Value::list(vec![int(1)]), &int(i64::MIN)),
            Ok(Value::list(vec![]))
        );
    }

    #[test]
    fn oversized_concatenation_is_an_error() {
        let big = Value::str("x".repeat(MAX_SEQUENCE_LEN));
        assert_eq!(
            binary(BinOp::Add, &big, &Value::str("y")),
            Err(EvalError::TooLarge { op: "+".into() })
        );
        assert!(binary(BinOp::Add, &big, &Value::str("")).is_ok());
    }

    #[test]
    fn comparisons() {
        assert_eq!(binary(BinOp::Lt, &int(1), &Value::Float(1.5)), Ok(Value::Bool(true)));
        assert_eq!(
            binary(BinOp::Gte, &Value::str("b"), &Value::str("a")),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            compare(
                &Value::list(vec![int(1), int(2)]),
                &Value::list(vec![int(1)])
            ),
            Ok(Ordering::Greater)
        );
        assert!(binary(BinOp::Lt, &int(1), &Value::str("a")).is_err());
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let xs = Value::list(vec![int(1), int(2), int(3)]);
        assert_eq!(index(&xs, &int(-1)), Ok(int(3)));
        assert_eq!(
            index(&xs, &int(3)),
            Err(EvalError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(index(&Value::str("abc"), &int(1)), Ok(Value::str("b")));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(unary(UnaryOp::Neg, &int(2)), Ok(int(-2)));
        assert_eq!(unary(UnaryOp::Not, &Value::list(vec![])), Ok(Value::Bool(true)));
        assert!(unary(UnaryOp::Neg, &Value::str("x")).is_err());
    }
}
