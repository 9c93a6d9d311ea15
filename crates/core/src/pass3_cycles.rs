//! Pass 3: Cycle validation -- a value binding may not lie on any
//! dependency cycle. Cycles made only of procedures are mutual recursion
//! and are accepted.

use crate::error::ElabError;
use crate::pass1_classify::{Binding, BindingKind};
use std::collections::{HashMap, VecDeque};

/// Binding indices, edges following `deps`.
pub(crate) fn index_edges(bindings: &[Binding]) -> Vec<Vec<usize>> {
    let index: HashMap<&str, usize> = bindings
        .iter()
        .enumerate()
        .map(|(i, b)| (b.name.as_str(), i))
        .collect();
    bindings
        .iter()
        .map(|b| {
            b.deps
                .iter()
                .filter_map(|d| index.get(d.as_str()).copied())
                .collect()
        })
        .collect()
}

pub fn validate_cycles(bindings: &[Binding]) -> Result<(), ElabError> {
    let edges = index_edges(bindings);
    let comp = strongly_connected(&edges);

    let mut comp_size: HashMap<usize, usize> = HashMap::new();
    for c in &comp {
        *comp_size.entry(*c).or_insert(0) += 1;
    }

    // Report the first offending value in declaration order
    for (i, b) in bindings.iter().enumerate() {
        if b.kind != BindingKind::Value {
            continue;
        }
        let cyclic = comp_size[&comp[i]] > 1 || edges[i].contains(&i);
        if cyclic {
            let path: Vec<&str> = cycle_through(i, &edges, &comp)
                .into_iter()
                .map(|j| bindings[j].name.as_str())
                .collect();
            return Err(ElabError::circular(
                &b.name,
                b.line,
                format!(
                    "symbol '{}' is involved in a circular reference: {}",
                    b.name,
                    path.join(" \u{2192} ")
                ),
            ));
        }
    }
    Ok(())
}

/// Tarjan's algorithm. Returns the component id of every node; every node
/// is explored exactly once across the whole run.
fn strongly_connected(edges: &[Vec<usize>]) -> Vec<usize> {
    let mut t = Tarjan {
        edges,
        index: vec![None; edges.len()],
        low: vec![0; edges.len()],
        on_stack: vec![false; edges.len()],
        stack: Vec::new(),
        next: 0,
        comp: vec![0; edges.len()],
        comp_count: 0,
    };
    for v in 0..edges.len() {
        if t.index[v].is_none() {
            t.visit(v);
        }
    }
    t.comp
}

struct Tarjan<'a> {
    edges: &'a [Vec<usize>],
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next: usize,
    comp: Vec<usize>,
    comp_count: usize,
}

impl Tarjan<'_> {
    fn visit(&mut self, v: usize) {
        self.index[v] = Some(self.next);
        self.low[v] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        let edges = self.edges;
        for &w in &edges[v] {
            match self.index[w] {
                None => {
                    self.visit(w);
                    self.low[v] = self.low[v].min(self.low[w]);
                }
                Some(iw) if self.on_stack[w] => {
                    self.low[v] = self.low[v].min(iw);
                }
                Some(_) => {}
            }
        }

        if self.index[v] == Some(self.low[v]) {
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                self.comp[w] = self.comp_count;
                if w == v {
                    break;
                }
            }
            self.comp_count += 1;
        }
    }
}

/// Shortest cycle from `start` back to itself inside its component,
/// as a node list beginning and ending with `start`.
fn cycle_through(start: usize, edges: &[Vec<usize>], comp: &[usize]) -> Vec<usize> {
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for &w in &edges[v] {
            if comp[w] != comp[start] {
                continue;
            }
            if w == start {
                let mut middle = Vec::new();
                let mut cur = v;
                while cur != start {
                    middle.push(cur);
                    cur = parent[&cur];
                }
                middle.reverse();
                let mut path = vec![start];
                path.extend(middle);
                path.push(start);
                return path;
            }
            if let std::collections::hash_map::Entry::Vacant(e) = parent.entry(w) {
                e.insert(v);
                queue.push_back(w);
            }
        }
    }
    vec![start, start]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::lex;
    use crate::parser::parse;
    use crate::pass1_classify::classify;
    use crate::pass2_deps::analyze_dependencies;

    fn check(src: &str) -> Result<(), ElabError> {
        let mut c = classify(parse(&lex(src).unwrap()).unwrap()).unwrap();
        analyze_dependencies(&mut c.bindings);
        validate_cycles(&c.bindings)
    }

    #[test]
    fn value_cycle_is_rejected_with_path() {
        let err = check("a: b + 1, b: a + 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularReference);
        assert_eq!(err.binding.as_deref(), Some("a"));
        assert!(err.message.contains("a \u{2192} b \u{2192} a"), "{}", err.message);
    }

    #[test]
    fn value_self_reference_is_rejected() {
        let err = check("x: x + 1").unwrap_err();
        assert_eq!(err.binding.as_deref(), Some("x"));
        assert!(err.message.contains("x \u{2192} x"));
    }

    #[test]
    fn procedure_cycles_are_legal() {
        check(
            "even: lambda n: (n == 0) or odd(n - 1), odd: lambda n: (n != 0) and even(n - 1)",
        )
        .unwrap();
        check("loop: lambda n: loop(n)").unwrap();
    }

    #[test]
    fn value_behind_procedure_cycle_is_rejected() {
        // v -> p -> q -> v
        let err = check("p: lambda: q(), q: lambda: v, v: p()").unwrap_err();
        assert_eq!(err.binding.as_deref(), Some("v"));
        assert!(err.message.contains("v \u{2192} p \u{2192} q \u{2192} v"), "{}", err.message);
    }

    #[test]
    fn value_calling_into_procedure_cycle_is_fine() {
        check("even: lambda n: n == 0 or odd(n - 1), odd: lambda n: n != 0 and even(n - 1), r: even(10)")
            .unwrap();
    }

    #[test]
    fn first_offender_in_declaration_order_is_reported() {
        let err = check("ok: 1, z: y, y: z").unwrap_err();
        assert_eq!(err.binding.as_deref(), Some("z"));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        check("a: b + c, b: d, c: d, d: 1").unwrap();
    }
}
