//! Mutual-binding environment builder.
//!
//! Three phases over an elaborated block:
//!
//! 1. declare: one empty slot per binding, in a fresh frame over the outer
//!    environment;
//! 2. fill: bindings in schedule order, each evaluated in that frame and
//!    stored into its slot;
//! 3. export: the filled non-private slots, for the session to merge.
//!
//! Procedures are closures over the frame itself, so a procedure filled
//! early can call one filled later.

use std::rc::Rc;

use lambdascript_core::{Binding, BindingKind, ElaboratedBlock, RawExpr};

use crate::config::SessionConfig;
use crate::curry::curry;
use crate::error::BlockError;
use crate::eval::eval;
use crate::frame::{Environment, Scope};
use crate::types::{Closure, Procedure, Value};

/// Declare and fill every binding of `block`. Returns the filled frame.
pub fn build(
    block: &ElaboratedBlock,
    globals: &Environment,
    config: &SessionConfig,
) -> Result<Rc<Scope>, BlockError> {
    let frame = Scope::declare(
        block.bindings.iter().map(|b| b.name.as_str()),
        None,
        globals,
    );
    for binding in block.scheduled() {
        let value = fill_value(binding, &frame, config)?;
        log::trace!("fill '{}' = {}", binding.name, value);
        frame.fill(&binding.name, value);
    }
    Ok(frame)
}

fn fill_value(
    binding: &Binding,
    frame: &Rc<Scope>,
    config: &SessionConfig,
) -> Result<Value, BlockError> {
    match (binding.kind, &binding.expr) {
        (BindingKind::Procedure, RawExpr::Lambda { params, body, .. }) => {
            let tail_self = (config.tail_recursion && binding.tail_recursive)
                .then(|| binding.name.clone());
            let closure = Rc::new(Procedure::Closure(Closure {
                name: Some(binding.name.clone()),
                params: params.clone(),
                body: Rc::clone(body),
                scope: Rc::clone(frame),
                tail_self,
            }));
            let proc = if config.curry {
                curry(closure, params.len())
            } else {
                closure
            };
            Ok(Value::Proc(proc))
        }
        _ => eval(&binding.expr, frame).map_err(|source| BlockError::EvaluationFailure {
            binding: binding.name.clone(),
            line: binding.line,
            source,
        }),
    }
}

/// Non-private bindings of a filled frame, in declaration order.
pub fn exports(block: &ElaboratedBlock, frame: &Scope) -> Vec<(String, Value)> {
    block
        .bindings
        .iter()
        .filter(|b| !b.is_private())
        .filter_map(|b| frame.filled(&b.name).map(|v| (b.name.clone(), v)))
        .collect()
}
