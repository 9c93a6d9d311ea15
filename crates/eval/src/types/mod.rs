//! Runtime types: values, procedures and evaluation errors.

mod values;

pub use values::{Arity, Builtin, BuiltinFn, Closure, Procedure, Value};

/// A runtime failure while evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// A name resolved neither in the scope chain nor the outer environment.
    #[error("name '{name}' is not defined")]
    UnboundName { name: String },
    /// A slot of the current block was read before the fill phase reached it.
    #[error("binding '{name}' was used before it was initialized")]
    UninitializedBinding { name: String },
    /// Operand types do not support the operation.
    #[error("type error: {message}")]
    TypeError { message: String },
    /// Wrong number of arguments.
    #[error("{callee} expects {expected} argument(s), got {got}")]
    Arity {
        callee: String,
        expected: String,
        got: usize,
    },
    /// Call of something that is not a procedure.
    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: String },
    #[error("division by zero")]
    DivisionByZero,
    /// Integer overflow; integers are 64-bit and never wrap.
    #[error("integer overflow in '{op}'")]
    Overflow { op: String },
    /// Too many procedure calls active at once.
    #[error("maximum recursion depth exceeded (limit {limit})")]
    RecursionLimit { limit: usize },
    /// A string or list would grow past the addressable size.
    #[error("result of '{op}' is too large")]
    TooLarge { op: String },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    /// Invalid argument to a builtin.
    #[error("{message}")]
    ValueError { message: String },
}

impl EvalError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        EvalError::TypeError {
            message: message.into(),
        }
    }
}
