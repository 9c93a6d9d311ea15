//! Runtime value types and their Python-style rendering.

use lambdascript_core::RawExpr;
use std::fmt;
use std::rc::Rc;

use super::EvalError;
use crate::frame::Scope;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A runtime value. Cloning is cheap: aggregates and procedures are shared.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Tuple(Rc<Vec<Value>>),
    Proc(Rc<Procedure>),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Proc(_) => "procedure",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Proc(_) => true,
        }
    }

    /// Extracts an integer (booleans count as 0/1) or returns a type error.
    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(EvalError::type_error(format!(
                "expected int, got {}",
                other.type_name()
            ))),
        }
    }

    /// JSON rendering for machine-readable output. Procedures render as
    /// their display string.
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::None => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Float(f) => J::from(*f),
            Value::Str(s) => J::from(&**s),
            Value::List(items) | Value::Tuple(items) => {
                J::Array(items.iter().map(Value::to_json_value).collect())
            }
            Value::Proc(p) => J::String(p.to_string()),
        }
    }

    /// Quoted rendering used inside containers.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; numbers compare across int/float/bool,
    /// procedures by identity.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Proc(a), Value::Proc(b)) => Rc::ptr_eq(a, b),
            (Value::Float(a), b) => b.as_f64().is_some_and(|b| *a == b),
            (a, Value::Float(b)) => a.as_f64().is_some_and(|a| a == *b),
            (a, b) => match (a.as_int(), b.as_int()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Value {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }
}

fn fmt_float(f: f64, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.is_nan() {
        out.write_str("nan")
    } else if f.is_infinite() {
        out.write_str(if f > 0.0 { "inf" } else { "-inf" })
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        write!(out, "{:.1}", f)
    } else {
        write!(out, "{}", f)
    }
}

fn fmt_items(items: &[Value], out: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        out.write_str(&v.repr())?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => fmt_float(*x, f),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                fmt_items(items, f)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                fmt_items(items, f)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Proc(p) => write!(f, "{}", p),
        }
    }
}

// ──────────────────────────────────────────────
// Procedures
// ──────────────────────────────────────────────

/// A callable value.
#[derive(Debug)]
pub enum Procedure {
    Closure(Closure),
    Builtin(Builtin),
    /// Partial-application adapter around `target`.
    Curried {
        target: Rc<Procedure>,
        arity: usize,
        collected: Vec<Value>,
    },
}

impl Procedure {
    pub fn name(&self) -> Option<&str> {
        match self {
            Procedure::Closure(c) => c.name.as_deref(),
            Procedure::Builtin(b) => Some(b.name),
            Procedure::Curried { target, .. } => target.name(),
        }
    }

    /// Number of arguments still expected, when known.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Procedure::Closure(c) => Some(c.params.len()),
            Procedure::Builtin(b) => match b.arity {
                Arity::Exact(n) => Some(n),
                _ => None,
            },
            Procedure::Curried {
                arity, collected, ..
            } => Some(arity.saturating_sub(collected.len())),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Closure(c) => match &c.name {
                Some(n) => write!(f, "<procedure {}/{}>", n, c.params.len()),
                None => write!(f, "<lambda/{}>", c.params.len()),
            },
            Procedure::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Procedure::Curried {
                target, collected, ..
            } if collected.is_empty() => write!(f, "{}", target),
            Procedure::Curried {
                target,
                arity,
                collected,
            } => write!(
                f,
                "<partial {} {}/{}>",
                target.name().unwrap_or("lambda"),
                collected.len(),
                arity
            ),
        }
    }
}

/// A lambda closed over the scope it was created in.
///
/// The scope is held by reference: slots filled after the closure was
/// created are visible to it.
#[derive(Debug)]
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<RawExpr>,
    pub scope: Rc<Scope>,
    /// Run as a trampoline; calls to this name in tail position loop
    pub tail_self: Option<String>,
}

pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{}", k),
            Arity::Range(lo, hi) => write!(f, "{} to {}", lo, hi),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// A host function from the prelude.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_python_str() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::str("hi").to_string(), "hi");
        assert_eq!(
            Value::list(vec![Value::Int(1), Value::str("a")]).to_string(),
            "[1, 'a']"
        );
        assert_eq!(Value::tuple(vec![Value::Int(1)]).to_string(), "(1,)");
        assert_eq!(Value::tuple(vec![]).to_string(), "()");
    }

    #[test]
    fn numbers_compare_across_types() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Int(1), Value::str("1"));
        assert_ne!(Value::list(vec![]), Value::tuple(vec![]));
    }

    #[test]
    fn json_rendering() {
        let v = Value::tuple(vec![Value::Int(1), Value::None, Value::str("a")]);
        assert_eq!(v.to_json_value(), serde_json::json!([1, null, "a"]));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Int(0).truthy());
        assert!(!Value::str("").truthy());
        assert!(!Value::list(vec![]).truthy());
        assert!(Value::Float(0.1).truthy());
    }
}
