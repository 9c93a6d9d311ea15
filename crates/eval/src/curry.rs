//! Automatic partial application.
//!
//! A curried procedure of arity `n` collects arguments across calls. While
//! fewer than `n` have been supplied it returns a new curried procedure;
//! once `n` or more are available it calls the target with all of them, so
//! surplus arguments surface as the target's own arity error.

use std::rc::Rc;

use crate::eval;
use crate::types::{EvalError, Procedure, Value};

/// Wrap `target` in a partial-application adapter of the given arity.
///
/// Zero-arity procedures are returned unchanged.
pub fn curry(target: Rc<Procedure>, arity: usize) -> Rc<Procedure> {
    if arity == 0 {
        return target;
    }
    Rc::new(Procedure::Curried {
        target,
        arity,
        collected: Vec::new(),
    })
}

pub(crate) fn feed(
    target: &Rc<Procedure>,
    arity: usize,
    collected: &[Value],
    args: Vec<Value>,
) -> Result<Value, EvalError> {
    let mut all = Vec::with_capacity(collected.len() + args.len());
    all.extend_from_slice(collected);
    all.extend(args);
    if all.len() >= arity {
        eval::call(target, all)
    } else {
        Ok(Value::Proc(Rc::new(Procedure::Curried {
            target: Rc::clone(target),
            arity,
            collected: all,
        })))
    }
}
