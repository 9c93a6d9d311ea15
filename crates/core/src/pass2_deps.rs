//! Pass 2: Dependency analysis -- the free identifiers of each binding's
//! expression, restricted to the names declared in the same block.

use crate::ast::RawExpr;
use crate::pass1_classify::Binding;
use std::collections::{BTreeMap, BTreeSet};

/// Binding name -> names of the same block it references.
/// References to outer names are not edges.
pub type DependencyGraph = BTreeMap<String, BTreeSet<String>>;

/// Fill `deps` on every binding.
pub fn analyze_dependencies(bindings: &mut [Binding]) {
    let declared: BTreeSet<String> = bindings.iter().map(|b| b.name.clone()).collect();
    for b in bindings.iter_mut() {
        b.deps = free_names(&b.expr)
            .into_iter()
            .filter(|n| declared.contains(n))
            .collect();
    }
}

pub fn dependency_graph(bindings: &[Binding]) -> DependencyGraph {
    bindings
        .iter()
        .map(|b| (b.name.clone(), b.deps.clone()))
        .collect()
}

/// Names referenced by `expr` that are not bound by one of its own
/// lambda parameter lists.
pub fn free_names(expr: &RawExpr) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut bound: Vec<&str> = Vec::new();
    collect_free(expr, &mut bound, &mut out);
    out
}

fn collect_free<'e>(expr: &'e RawExpr, bound: &mut Vec<&'e str>, out: &mut BTreeSet<String>) {
    match expr {
        RawExpr::Literal(_) => {}
        RawExpr::Name { name, .. } => {
            if !bound.contains(&name.as_str()) {
                out.insert(name.clone());
            }
        }
        RawExpr::List(items) | RawExpr::Tuple(items) => {
            for e in items {
                collect_free(e, bound, out);
            }
        }
        RawExpr::Lambda { params, body, .. } => {
            let mark = bound.len();
            bound.extend(params.iter().map(String::as_str));
            collect_free(body, bound, out);
            bound.truncate(mark);
        }
        RawExpr::Call { callee, args, .. } => {
            collect_free(callee, bound, out);
            for a in args {
                collect_free(a, bound, out);
            }
        }
        RawExpr::Index { target, index, .. } => {
            collect_free(target, bound, out);
            collect_free(index, bound, out);
        }
        RawExpr::Unary { operand, .. } => collect_free(operand, bound, out),
        RawExpr::Binary { left, right, .. } | RawExpr::And(left, right) | RawExpr::Or(left, right) => {
            collect_free(left, bound, out);
            collect_free(right, bound, out);
        }
        RawExpr::IfElse {
            cond,
            then,
            otherwise,
        } => {
            collect_free(cond, bound, out);
            collect_free(then, bound, out);
            collect_free(otherwise, bound, out);
        }
    }
}
