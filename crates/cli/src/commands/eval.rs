use std::process;

use lambdascript_eval::{Session, SessionConfig};

use crate::{report_json_error, OutputFormat};

pub(crate) fn cmd_eval(source: &str, config: SessionConfig, output: OutputFormat, quiet: bool) {
    let mut session = Session::with_config(config);
    match session.run_block(source) {
        Ok(outcome) => match output {
            OutputFormat::Text => {
                for value in &outcome.emitted {
                    println!("{}", value);
                }
                if !quiet && outcome.emitted.is_empty() {
                    for name in &outcome.bound {
                        if let Some(value) = session.get(name) {
                            println!("{} = {}", name, value.repr());
                        }
                    }
                }
            }
            OutputFormat::Json => {
                let bound: serde_json::Map<String, serde_json::Value> = outcome
                    .bound
                    .iter()
                    .filter_map(|name| Some((name.clone(), session.get(name)?.to_json_value())))
                    .collect();
                let emitted: Vec<_> = outcome.emitted.iter().map(|v| v.to_json_value()).collect();
                let report = serde_json::json!({
                    "bound": bound,
                    "emitted": emitted,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
                );
            }
        },
        Err(e) => {
            report_json_error(&e.to_json_value(), &e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
