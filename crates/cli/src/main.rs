mod commands;

use std::path::PathBuf;
use std::process;
use std::thread;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use lambdascript_eval::{SessionConfig, DEFAULT_RECURSION_LIMIT};

/// Native stack reserved for each level of procedure call nesting.
const STACK_PER_CALL: usize = 64 * 1024;
/// Smallest stack the worker thread gets.
const MIN_STACK: usize = 16 * 1024 * 1024;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// LambdaScript: literate functional blocks with mutual recursion.
#[derive(Parser)]
#[command(
    name = "lambdascript",
    version,
    about = "LambdaScript literate programming toolchain"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Do not curry procedures
    #[arg(long, global = true)]
    no_curry: bool,

    /// Do not trampoline tail-recursive procedures
    #[arg(long, global = true)]
    no_tail_recursion: bool,

    /// Deepest nesting of procedure calls before evaluation fails
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_RECURSION_LIMIT,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    recursion_limit: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every LambdaScript block of a markdown document
    Run {
        /// Path to the markdown document
        file: PathBuf,
    },

    /// Elaborate without evaluating and print each block's plan
    Check {
        /// Markdown document, or a file holding a single block
        file: PathBuf,
    },

    /// Run one block given on the command line
    Eval {
        /// Block source, e.g. "x: 1, __print__: x + 1"
        source: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("LAMBDASCRIPT_LOG", default_filter),
    )
    .init();

    let config = SessionConfig {
        curry: !cli.no_curry,
        tail_recursion: !cli.no_tail_recursion,
        recursion_limit: cli.recursion_limit,
        ..SessionConfig::default()
    };

    // Evaluation recurses on the native stack; size it for the call limit
    let stack = cli
        .recursion_limit
        .saturating_mul(STACK_PER_CALL)
        .max(MIN_STACK);
    let (output, quiet) = (cli.output, cli.quiet);
    let worker = thread::Builder::new()
        .name("lambdascript".to_owned())
        .stack_size(stack)
        .spawn(move || dispatch(cli.command, config, output, quiet));
    match worker {
        Ok(handle) => {
            if handle.join().is_err() {
                process::exit(101);
            }
        }
        Err(e) => {
            report_error(
                &format!("cannot start evaluator thread with a {} byte stack: {}", stack, e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

fn dispatch(command: Commands, config: SessionConfig, output: OutputFormat, quiet: bool) {
    match command {
        Commands::Run { file } => {
            commands::run::cmd_run(&file, config, output, quiet);
        }
        Commands::Check { file } => {
            commands::check::cmd_check(&file, output, quiet);
        }
        Commands::Eval { source } => {
            commands::eval::cmd_eval(&source, config, output, quiet);
        }
    }
}

/// Print an error message to stderr (as text or JSON).
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Print a structured error report to stderr. JSON reports are printed
/// even in quiet mode, as they are the command's output.
pub(crate) fn report_json_error(
    report: &serde_json::Value,
    text: &str,
    output: OutputFormat,
    quiet: bool,
) {
    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(report)
                .unwrap_or_else(|_| report.to_string());
            eprintln!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", text);
            }
        }
    }
}
