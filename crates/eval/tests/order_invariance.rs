//! Permuting the declarations of a block never changes what it binds.

use lambdascript_eval::{Session, Value};
use proptest::prelude::*;

/// A block mixing forward references, mutual recursion, a tail-recursive
/// accumulator, curried partials and a private helper.
const ENTRIES: &[&str] = &[
    "even: lambda n: True if n == 0 else odd(n - 1)",
    "odd: lambda n: False if n == 0 else even(n - 1)",
    "sum_to: lambda n, acc: acc if n == 0 else sum_to(n - 1, acc + n)",
    "scale: lambda k, x: k * x + _offset",
    "_offset: base // 2",
    "base: 10",
    "triple: scale(3)",
    "total: sum_to(limit, 0)",
    "limit: base * 4",
    "flags: [even(limit), odd(base + 1)]",
    "scaled: triple(total)",
];

/// Names whose values are compared directly.
const OBSERVED: &[&str] = &["base", "limit", "total", "flags", "scaled"];

/// Calls whose results are compared, covering the procedures.
const CALLS: &[&str] = &["even(12)", "odd(5)", "sum_to(30, 0)", "scale(2, 7)", "triple(1)"];

fn run(entries: &[&str]) -> (Vec<Option<Value>>, Vec<Value>) {
    let src = entries.join(",\n");
    let mut s = Session::new();
    s.run_block(&src)
        .unwrap_or_else(|e| panic!("block failed: {}\n{}", e, src));
    let values = OBSERVED.iter().map(|n| s.get(n)).collect();
    let call_results = CALLS
        .iter()
        .map(|p| s.eval_expression(p).unwrap())
        .collect();
    (values, call_results)
}

#[test]
fn declaration_order_baseline() {
    let (values, call_results) = run(ENTRIES);
    assert_eq!(values[0], Some(Value::Int(10)));
    assert_eq!(values[2], Some(Value::Int(820)));
    assert_eq!(
        values[3],
        Some(Value::list(vec![Value::Bool(true), Value::Bool(true)]))
    );
    assert_eq!(values[4], Some(Value::Int(2465)));
    assert_eq!(call_results[3], Value::Int(19));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn permuted_declarations_bind_the_same_values(
        order in Just(ENTRIES.to_vec()).prop_shuffle()
    ) {
        let expected = run(ENTRIES);
        let actual = run(&order);
        prop_assert_eq!(actual, expected);
    }
}
