use std::path::Path;
use std::process;

use lambdascript_core::document::DEFAULT_LANG;
use lambdascript_core::{elaborate_block, fragments, BindingKind, ElaboratedBlock, Fragment};

use crate::{report_error, report_json_error, OutputFormat};

pub(crate) fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            report_error(
                &format!("cannot read '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    // A markdown document holds many blocks; any other file is one block
    let is_markdown = file
        .extension()
        .is_some_and(|ext| ext == "md" || ext == "markdown");
    let blocks: Vec<Fragment> = if is_markdown {
        fragments(&text).filter(|f| f.lang == DEFAULT_LANG).collect()
    } else {
        let end_line = u32::try_from(text.lines().count()).unwrap_or(u32::MAX);
        vec![Fragment {
            text,
            lang: DEFAULT_LANG.to_owned(),
            start_line: 1,
            end_line,
        }]
    };

    let mut plans = Vec::new();
    for fragment in &blocks {
        match elaborate_block(&fragment.text) {
            Ok(plan) => plans.push((fragment, plan)),
            Err(e) => {
                let mut report = e.to_json_value();
                report["start_line"] = serde_json::json!(fragment.start_line);
                report["end_line"] = serde_json::json!(fragment.end_line);
                let text = format!(
                    "block at lines {}-{}: {}",
                    fragment.start_line, fragment.end_line, e
                );
                report_json_error(&report, &text, output, quiet);
                process::exit(1);
            }
        }
    }

    match output {
        OutputFormat::Json => {
            let report: Vec<serde_json::Value> = plans
                .iter()
                .map(|(fragment, plan)| {
                    serde_json::json!({
                        "start_line": fragment.start_line,
                        "end_line": fragment.end_line,
                        "plan": plan.to_json_value(),
                    })
                })
                .collect();
            let report = serde_json::Value::Array(report);
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
            );
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            for (fragment, plan) in &plans {
                println!("block at lines {}-{}", fragment.start_line, fragment.end_line);
                print_plan(plan);
            }
            println!("{} block(s) ok", plans.len());
        }
    }
}

fn print_plan(plan: &ElaboratedBlock) {
    println!("  schedule: {}", plan.schedule.join(", "));
    for b in plan.scheduled() {
        let kind = match (b.kind, b.arity) {
            (BindingKind::Procedure, Some(n)) => format!("procedure/{}", n),
            _ => "value".to_owned(),
        };
        let mut line = format!("  {} : {}", b.name, kind);
        if b.tail_recursive {
            line.push_str(", tail-recursive");
        }
        if b.is_private() {
            line.push_str(", private");
        }
        if !b.deps.is_empty() {
            let deps: Vec<&str> = b.deps.iter().map(String::as_str).collect();
            line.push_str(&format!(" <- {}", deps.join(", ")));
        }
        println!("{}", line);
    }
    for d in &plan.directives {
        println!("  {} (line {})", d.name, d.line);
    }
}
