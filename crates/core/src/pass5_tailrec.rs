//! Pass 5: Tail-recursion analysis -- mark self-recursive procedures whose
//! every self reference is a call in tail position. The evaluator runs
//! marked procedures as a trampoline.
//!
//! Tail position is the body itself and, recursively, both branches of a
//! conditional in tail position. Only direct self calls by name count;
//! mutual tail recursion between procedures is not recognised.

use crate::ast::RawExpr;
use crate::pass1_classify::Binding;

pub fn mark_tail_recursion(bindings: &mut [Binding]) {
    for b in bindings.iter_mut() {
        if let RawExpr::Lambda { params, body, .. } = &b.expr {
            b.tail_recursive = is_tail_recursive(&b.name, params, body);
        }
    }
}

/// True when `body` references `name` at least once and only ever as the
/// callee of a tail call.
pub fn is_tail_recursive(name: &str, params: &[String], body: &RawExpr) -> bool {
    if params.iter().any(|p| p == name) {
        return false;
    }
    let total = count_free(body, name);
    total > 0 && total == count_tail_calls(body, name)
}

fn count_tail_calls(expr: &RawExpr, name: &str) -> usize {
    match expr {
        RawExpr::IfElse {
            then, otherwise, ..
        } => count_tail_calls(then, name) + count_tail_calls(otherwise, name),
        RawExpr::Call { callee, .. } => match callee.as_ref() {
            RawExpr::Name { name: n, .. } if n == name => 1,
            _ => 0,
        },
        _ => 0,
    }
}

/// Occurrences of `name` not shadowed by a nested lambda parameter.
fn count_free(expr: &RawExpr, name: &str) -> usize {
    match expr {
        RawExpr::Literal(_) => 0,
        RawExpr::Name { name: n, .. } => usize::from(n == name),
        RawExpr::List(items) | RawExpr::Tuple(items) => {
            items.iter().map(|e| count_free(e, name)).sum()
        }
        RawExpr::Lambda { params, body, .. } => {
            if params.iter().any(|p| p == name) {
                0
            } else {
                count_free(body, name)
            }
        }
        RawExpr::Call { callee, args, .. } => {
            count_free(callee, name) + args.iter().map(|a| count_free(a, name)).sum::<usize>()
        }
        RawExpr::Index { target, index, .. } => count_free(target, name) + count_free(index, name),
        RawExpr::Unary { operand, .. } => count_free(operand, name),
        RawExpr::Binary { left, right, .. } | RawExpr::And(left, right) | RawExpr::Or(left, right) => {
            count_free(left, name) + count_free(right, name)
        }
        RawExpr::IfElse {
            cond,
            then,
            otherwise,
        } => count_free(cond, name) + count_free(then, name) + count_free(otherwise, name),
    }
}
