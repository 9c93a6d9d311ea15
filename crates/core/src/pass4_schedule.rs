//! Pass 4: Scheduling -- order bindings so that every value is evaluated
//! after the bindings it needs.
//!
//! Readiness:
//! - a value waits for all of its dependencies, and for every binding it
//!   can reach through a chain of procedure references (the procedures it
//!   may end up calling while being evaluated);
//! - a procedure ignores other procedures, but waits for every value it can
//!   reach through a chain of procedure references, so that a value calling
//!   it never runs into an unfilled slot.
//!
//! Ties are broken by declaration order. This only decides the relative
//! order of independent bindings and has no observable effect on results.

use crate::pass1_classify::{Binding, BindingKind};
use crate::pass3_cycles::index_edges;
use std::collections::BTreeSet;

/// Returns binding names in evaluation order.
///
/// Must run after [`crate::pass3_cycles::validate_cycles`]; a stall means
/// that invariant was broken and panics.
pub fn schedule(bindings: &[Binding]) -> Vec<String> {
    let edges = index_edges(bindings);
    let blocking: Vec<BTreeSet<usize>> = (0..bindings.len())
        .map(|i| blocking_deps(i, bindings, &edges))
        .collect();

    let mut scheduled = vec![false; bindings.len()];
    let mut remaining: Vec<usize> = (0..bindings.len()).collect();
    let mut order = Vec::with_capacity(bindings.len());

    while !remaining.is_empty() {
        let pos = remaining
            .iter()
            .position(|&i| blocking[i].iter().all(|&d| scheduled[d]))
            .unwrap_or_else(|| {
                let stuck: Vec<&str> = remaining.iter().map(|&i| bindings[i].name.as_str()).collect();
                panic!(
                    "scheduler stalled on {:?}; cycle validation must reject this block first",
                    stuck
                )
            });
        let i = remaining.remove(pos);
        scheduled[i] = true;
        order.push(bindings[i].name.clone());
    }

    order
}

fn blocking_deps(i: usize, bindings: &[Binding], edges: &[Vec<usize>]) -> BTreeSet<usize> {
    let reached = reach_through_procedures(i, bindings, edges);
    match bindings[i].kind {
        BindingKind::Value => reached,
        BindingKind::Procedure => reached
            .into_iter()
            .filter(|&w| bindings[w].kind == BindingKind::Value)
            .collect(),
    }
}

/// Bindings reachable from `i` where every intermediate node is a
/// procedure. Values end a chain; `i` itself is never included.
fn reach_through_procedures(
    i: usize,
    bindings: &[Binding],
    edges: &[Vec<usize>],
) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    let mut seen = vec![false; bindings.len()];
    let mut stack = vec![i];
    seen[i] = true;
    while let Some(v) = stack.pop() {
        for &w in &edges[v] {
            if seen[w] {
                continue;
            }
            seen[w] = true;
            out.insert(w);
            if bindings[w].kind == BindingKind::Procedure {
                stack.push(w);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;
    use crate::pass1_classify::classify;
    use crate::pass2_deps::analyze_dependencies;
    use crate::pass3_cycles::validate_cycles;
    use pretty_assertions::assert_eq;

    fn order(src: &str) -> Vec<String> {
        let mut c = classify(parse(&lex(src).unwrap()).unwrap()).unwrap();
        analyze_dependencies(&mut c.bindings);
        validate_cycles(&c.bindings).unwrap();
        schedule(&c.bindings)
    }

    fn pos(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn values_follow_their_dependencies() {
        let o = order("f: lambda n: 2*n + b, g2: lambda n: f(n)+1, a: f(3), h: g2(4)+a, b: 5");
        assert_eq!(o, vec!["b", "f", "g2", "a", "h"]);
    }

    #[test]
    fn independent_bindings_keep_declaration_order() {
        assert_eq!(order("z: 1, y: 2, x: 3"), vec!["z", "y", "x"]);
    }

    #[test]
    fn mutual_procedures_do_not_block_each_other() {
        let o = order("odd: lambda n: n != 0 and even(n - 1), even: lambda n: n == 0 or odd(n - 1)");
        assert_eq!(o, vec!["odd", "even"]);
    }

    #[test]
    fn procedure_waits_for_values_reached_through_procedures() {
        // r calls p, p calls q, q reads w: w must be ready before p
        let o = order("r: p(1), p: lambda n: q(n), q: lambda n: n + w, w: 10");
        assert!(pos(&o, "w") < pos(&o, "q"));
        assert!(pos(&o, "w") < pos(&o, "p"));
        assert!(pos(&o, "p") < pos(&o, "r"));
    }

    #[test]
    fn value_waits_for_procedures_it_may_call() {
        // r reaches q only through p; q's slot must be filled before r runs
        let o = order("r: p(1), p: lambda n: q(n), q: lambda n: n + w, w: 10");
        assert_eq!(o, vec!["w", "p", "q", "r"]);
    }

    #[test]
    fn every_binding_is_scheduled_once() {
        let o = order("a: 1, b: a, c: lambda: d, d: b, e: c()");
        let mut sorted = o.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    #[should_panic(expected = "scheduler stalled")]
    fn stall_without_validation_panics() {
        let mut c = classify(parse(&lex("a: b, b: a").unwrap()).unwrap()).unwrap();
        analyze_dependencies(&mut c.bindings);
        schedule(&c.bindings);
    }
}
