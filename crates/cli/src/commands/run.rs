use std::path::Path;
use std::process;

use lambdascript_eval::{Session, SessionConfig};

use crate::{report_json_error, OutputFormat};

pub(crate) fn cmd_run(file: &Path, config: SessionConfig, output: OutputFormat, quiet: bool) {
    let mut session = Session::with_config(config);
    let mut emitted = Vec::new();

    let result = session.run_file(file, |value| match output {
        // Text output streams: each block prints as soon as it is merged
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => emitted.push(value.to_json_value()),
    });

    match result {
        Ok(blocks) => {
            log::info!("{} block(s) run from {}", blocks, file.display());
            if output == OutputFormat::Json {
                let report = serde_json::json!({
                    "blocks": blocks,
                    "emitted": emitted,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
                );
            }
        }
        Err(e) => {
            report_json_error(&e.to_json_value(), &e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
