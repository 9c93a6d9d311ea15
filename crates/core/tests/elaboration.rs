//! Elaborates every conformance document without evaluating it.
//!
//! Documents under conformance/documents must elaborate cleanly. Fixtures
//! under conformance/errors whose expected kind is an elaboration failure
//! must fail in the expected block with the expected kind and binding.

use lambdascript_core::document::DEFAULT_LANG;
use lambdascript_core::{elaborate_block, fragments, BindingKind, ElabError, Fragment};
use std::path::{Path, PathBuf};

fn conformance_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance")
}

fn collect_documents(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "md"))
        .collect();
    paths.sort();
    paths
}

/// First elaboration failure of a document, with its fragment.
fn first_failure(text: &str) -> Option<(Fragment, ElabError)> {
    fragments(text)
        .filter(|f| f.lang == DEFAULT_LANG)
        .find_map(|f| elaborate_block(&f.text).err().map(|e| (f, e)))
}

#[test]
fn conformance_documents_elaborate() {
    let mut failures = Vec::new();
    let mut tested = 0usize;
    for path in collect_documents(&conformance_root().join("documents")) {
        let text = std::fs::read_to_string(&path).unwrap();
        if let Some((f, e)) = first_failure(&text) {
            failures.push(format!(
                "{} (lines {}-{}): {}",
                path.display(),
                f.start_line,
                f.end_line,
                e
            ));
        }
        tested += 1;
    }
    assert!(tested > 0, "no conformance documents found");
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn conformance_elaboration_errors() {
    let mut failures = Vec::new();
    let mut tested = 0usize;
    for path in collect_documents(&conformance_root().join("errors")) {
        let expected_path = path.with_extension("error.json");
        let expected: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&expected_path).unwrap())
                .unwrap_or_else(|e| panic!("{}: {}", expected_path.display(), e));
        // Runtime failures are covered by the evaluator's conformance suite
        if expected["kind"] == "evaluation_failure" {
            continue;
        }
        tested += 1;

        let text = std::fs::read_to_string(&path).unwrap();
        let Some((fragment, err)) = first_failure(&text) else {
            failures.push(format!("{}: elaborated without error", path.display()));
            continue;
        };
        let mut actual = err.to_json_value();
        actual["start_line"] = serde_json::json!(fragment.start_line);
        actual["end_line"] = serde_json::json!(fragment.end_line);
        for key in ["kind", "binding", "line", "start_line", "end_line"] {
            if let Some(want) = expected.get(key) {
                if &actual[key] != want {
                    failures.push(format!(
                        "{}: {} is {}, expected {}",
                        path.display(),
                        key,
                        actual[key],
                        want
                    ));
                }
            }
        }
    }
    assert!(tested > 0, "no elaboration error fixtures found");
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn mutual_recursion_plan() {
    let plan = elaborate_block(
        "is_even: lambda n: True if n == 0 else is_odd(n - 1),\n\
         is_odd: lambda n: False if n == 0 else is_even(n - 1),\n\
         answer: is_even(10)",
    )
    .unwrap();
    assert_eq!(plan.schedule.last().map(String::as_str), Some("answer"));
    let even = plan.binding("is_even").unwrap();
    assert_eq!(even.kind, BindingKind::Procedure);
    assert!(even.deps.contains("is_odd"));
    // Mutual recursion is not direct self recursion
    assert!(!even.tail_recursive);
}

#[test]
fn directives_stay_out_of_the_graph() {
    let plan = elaborate_block("__print__: x, x: 1, __config__: curry == False").unwrap();
    assert_eq!(plan.schedule, vec!["x"]);
    assert_eq!(plan.bindings.len(), 1);
    let names: Vec<_> = plan.directives.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["__print__", "__config__"]);
}

#[test]
fn empty_block_has_empty_plan() {
    let plan = elaborate_block("").unwrap();
    assert!(plan.bindings.is_empty());
    assert!(plan.schedule.is_empty());
}
