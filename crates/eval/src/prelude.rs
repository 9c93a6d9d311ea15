//! Host builtins available in every session.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::frame::Environment;
use crate::numeric;
use crate::types::{Arity, Builtin, BuiltinFn, EvalError, Procedure, Value};

const BUILTINS: &[(&str, Arity, BuiltinFn)] = &[
    ("len", Arity::Exact(1), len),
    ("abs", Arity::Exact(1), abs),
    ("min", Arity::AtLeast(1), min),
    ("max", Arity::AtLeast(1), max),
    ("str", Arity::Exact(1), to_str),
    ("int", Arity::Exact(1), to_int),
    ("float", Arity::Exact(1), to_float),
    ("range", Arity::Range(1, 3), range),
    ("sum", Arity::Range(1, 2), sum),
    ("head", Arity::Exact(1), head),
    ("tail", Arity::Exact(1), tail),
];

/// Look up a builtin by name.
pub fn builtin(name: &str) -> Option<Rc<Procedure>> {
    BUILTINS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(name, arity, func)| Rc::new(Procedure::Builtin(Builtin { name, arity, func })))
}

/// Define every builtin in `env`.
pub fn install(env: &Environment) {
    for &(name, arity, func) in BUILTINS {
        env.set(
            name,
            Value::Proc(Rc::new(Procedure::Builtin(Builtin { name, arity, func }))),
        );
    }
}

fn items(v: &Value, what: &str) -> Result<Vec<Value>, EvalError> {
    match v {
        Value::List(xs) | Value::Tuple(xs) => Ok(xs.to_vec()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
        other => Err(EvalError::type_error(format!(
            "{}() argument must be iterable, not '{}'",
            what,
            other.type_name()
        ))),
    }
}

fn len(args: &[Value]) -> Result<Value, EvalError> {
    let n = match &args[0] {
        Value::List(xs) | Value::Tuple(xs) => xs.len(),
        Value::Str(s) => s.chars().count(),
        other => {
            return Err(EvalError::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| EvalError::Overflow { op: "len".into() })
}

fn abs(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| EvalError::Overflow { op: "abs".into() }),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(EvalError::type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

fn extremum(args: &[Value], what: &str, keep: Ordering) -> Result<Value, EvalError> {
    let candidates = if args.len() == 1 {
        items(&args[0], what)?
    } else {
        args.to_vec()
    };
    let mut iter = candidates.into_iter();
    let mut best = iter.next().ok_or_else(|| EvalError::ValueError {
        message: format!("{}() arg is an empty sequence", what),
    })?;
    for v in iter {
        if numeric::compare(&v, &best)? == keep {
            best = v;
        }
    }
    Ok(best)
}

fn min(args: &[Value]) -> Result<Value, EvalError> {
    extremum(args, "min", Ordering::Less)
}

fn max(args: &[Value]) -> Result<Value, EvalError> {
    extremum(args, "max", Ordering::Greater)
}

fn to_str(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::str(args[0].to_string()))
}

fn to_int(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) if f.is_finite() && f.trunc().abs() < 9.2e18 => Ok(Value::Int(*f as i64)),
        Value::Float(f) => Err(EvalError::ValueError {
            message: format!("cannot convert float {} to integer", f),
        }),
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            EvalError::ValueError {
                message: format!("invalid literal for int(): '{}'", s),
            }
        }),
        other => Err(EvalError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            EvalError::ValueError {
                message: format!("could not convert string to float: '{}'", s),
            }
        }),
        other => Err(EvalError::type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn range(args: &[Value]) -> Result<Value, EvalError> {
    let ints = args
        .iter()
        .map(Value::as_int)
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => unreachable!("arity checked by the caller"),
    };
    if step == 0 {
        return Err(EvalError::ValueError {
            message: "range() arg 3 must not be zero".into(),
        });
    }
    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let step_abs = i128::from(step).abs();
    let count = if span <= 0 {
        0
    } else {
        (span + step_abs - 1) / step_abs
    };
    let count = numeric::sequence_len("range", usize::try_from(count).ok())?;
    let mut out = Vec::with_capacity(count);
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(Value::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::list(out))
}

fn sum(args: &[Value]) -> Result<Value, EvalError> {
    let start = args.get(1).cloned().unwrap_or(Value::Int(0));
    items(&args[0], "sum")?
        .iter()
        .try_fold(start, |acc, v| {
            numeric::binary(lambdascript_core::BinOp::Add, &acc, v)
        })
}

fn head(args: &[Value]) -> Result<Value, EvalError> {
    let xs = items(&args[0], "head")?;
    xs.into_iter().next().ok_or_else(|| EvalError::ValueError {
        message: "head() of an empty sequence".into(),
    })
}

fn tail(args: &[Value]) -> Result<Value, EvalError> {
    let rest = |xs: &[Value]| xs.get(1..).unwrap_or(&[]).to_vec();
    match &args[0] {
        Value::Tuple(xs) => Ok(Value::tuple(rest(xs))),
        Value::Str(s) => Ok(Value::str(s.chars().skip(1).collect::<String>())),
        other => Ok(Value::list(rest(&items(other, "tail")?))),
    }
}
