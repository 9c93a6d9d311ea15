//! Sessions: the outer environment shared by successive blocks.
//!
//! A block is elaborated, built in its own frame, its directives are run,
//! and only then are its public bindings merged and its configuration
//! changes committed. Any failure before that point leaves the session
//! exactly as it was.

use std::path::Path;
use std::rc::Rc;

use lambdascript_core::{elaborate_block, fragments, parse_expression, ElaboratedBlock};

use crate::builder;
use crate::config::SessionConfig;
use crate::directive::{run_directive, Effect};
use crate::error::{BlockError, DocumentError};
use crate::eval::{eval, with_recursion_limit};
use crate::frame::{Environment, Scope};
use crate::prelude;
use crate::types::Value;

/// Host-language blocks; executing them is not supported, they are skipped
/// with a warning.
const HOST_LANG: &str = "python";

/// Result of a block that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    /// Names merged into the outer environment, in declaration order
    pub bound: Vec<String>,
    /// Values produced by `__print__`
    pub emitted: Vec<Value>,
}

#[derive(Debug)]
pub struct Session {
    globals: Environment,
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with the prelude and the default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let globals = Environment::new();
        prelude::install(&globals);
        Session { globals, config }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    /// Seed the outer environment.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.globals.set(name, value);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Elaborate and run one block of source.
    pub fn run_block(&mut self, src: &str) -> Result<BlockOutcome, BlockError> {
        let block = elaborate_block(src)?;
        self.run_elaborated(&block)
    }

    /// Run an already elaborated block.
    pub fn run_elaborated(&mut self, block: &ElaboratedBlock) -> Result<BlockOutcome, BlockError> {
        let (frame, emitted, config) =
            with_recursion_limit(self.config.recursion_limit, || self.evaluate(block))?;

        let exports = builder::exports(block, &frame);
        let bound: Vec<String> = exports.iter().map(|(name, _)| name.clone()).collect();
        self.globals.merge(exports);
        if config != self.config {
            log::debug!("configuration now {:?}", config);
            self.config = config;
        }
        log::info!("merged {} binding(s): {}", bound.len(), bound.join(", "));

        Ok(BlockOutcome { bound, emitted })
    }

    /// Build the block's frame and run its directives without touching
    /// the session. Returns the frame, the emitted values and the
    /// configuration the block asks for.
    fn evaluate(
        &self,
        block: &ElaboratedBlock,
    ) -> Result<(Rc<Scope>, Vec<Value>, SessionConfig), BlockError> {
        let frame = builder::build(block, &self.globals, &self.config)?;

        let mut emitted = Vec::new();
        let mut config = self.config.clone();
        for directive in &block.directives {
            match run_directive(directive, &frame)? {
                Effect::Emit(value) => emitted.push(value),
                Effect::Configure(entries) => {
                    for (option, value) in entries {
                        config.set(&option, value).map_err(|message| {
                            BlockError::MalformedDirective {
                                directive: directive.name.clone(),
                                line: directive.line,
                                message,
                            }
                        })?;
                    }
                }
            }
        }
        Ok((frame, emitted, config))
    }

    /// Evaluate a single expression against the outer environment.
    pub fn eval_expression(&self, src: &str) -> Result<Value, BlockError> {
        let expr = parse_expression(src)?;
        let scope = Scope::declare(std::iter::empty(), None, &self.globals);
        with_recursion_limit(self.config.recursion_limit, || eval(&expr, &scope)).map_err(
            |source| BlockError::EvaluationFailure {
                binding: "<expression>".to_owned(),
                line: 1,
                source,
            },
        )
    }

    /// Run every LambdaScript block of a markdown document, in order.
    ///
    /// `on_emit` receives each `__print__` value as soon as its block has
    /// been merged. Returns the number of blocks run. Stops at the first
    /// failing block; blocks before it stay merged.
    pub fn run_document(
        &mut self,
        text: &str,
        mut on_emit: impl FnMut(&Value),
    ) -> Result<usize, DocumentError> {
        let mut ran = 0;
        for fragment in fragments(text) {
            if fragment.lang == HOST_LANG {
                log::warn!(
                    "skipping '{}' block at lines {}-{}: host code is not executed",
                    fragment.lang,
                    fragment.start_line,
                    fragment.end_line
                );
                continue;
            }
            if fragment.lang != lambdascript_core::document::DEFAULT_LANG {
                log::debug!(
                    "ignoring '{}' block at lines {}-{}",
                    fragment.lang,
                    fragment.start_line,
                    fragment.end_line
                );
                continue;
            }
            let outcome =
                self.run_block(&fragment.text)
                    .map_err(|source| DocumentError::Block {
                        start_line: fragment.start_line,
                        end_line: fragment.end_line,
                        source,
                    })?;
            outcome.emitted.iter().for_each(&mut on_emit);
            ran += 1;
        }
        Ok(ran)
    }

    /// Read and run a markdown file.
    pub fn run_file(
        &mut self,
        path: &Path,
        on_emit: impl FnMut(&Value),
    ) -> Result<usize, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.run_document(&text, on_emit)
    }
}
