//! Block and document level errors.
//!
//! Every error here is block scoped: the block that raised it merged
//! nothing into the outer environment.

use lambdascript_core::ElabError;
use serde_json::json;

use crate::types::EvalError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlockError {
    /// The block was rejected before evaluation (syntax, duplicate
    /// declaration, circular reference, unknown special symbol).
    #[error(transparent)]
    Elaboration(#[from] ElabError),

    /// Evaluating one binding failed.
    #[error("evaluation of '{binding}' (line {line}) failed: {source}")]
    EvaluationFailure {
        binding: String,
        line: u32,
        #[source]
        source: EvalError,
    },

    /// A special symbol was used with the wrong shape.
    #[error("malformed directive '{directive}' (line {line}): {message}")]
    MalformedDirective {
        directive: String,
        line: u32,
        message: String,
    },
}

impl BlockError {
    /// Line of the offending entry, relative to the block text.
    pub fn line(&self) -> u32 {
        match self {
            BlockError::Elaboration(e) => e.line,
            BlockError::EvaluationFailure { line, .. }
            | BlockError::MalformedDirective { line, .. } => *line,
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            BlockError::Elaboration(e) => e.to_json_value(),
            BlockError::EvaluationFailure {
                binding,
                line,
                source,
            } => json!({
                "kind": "evaluation_failure",
                "binding": binding,
                "line": line,
                "message": source.to_string(),
            }),
            BlockError::MalformedDirective {
                directive,
                line,
                message,
            } => json!({
                "kind": "malformed_directive",
                "binding": directive,
                "line": line,
                "message": message,
            }),
        }
    }
}

/// A failure while running a markdown document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A block failed; lines are 1-based document lines.
    #[error("block at lines {start_line}-{end_line}: {source}")]
    Block {
        start_line: u32,
        end_line: u32,
        #[source]
        source: BlockError,
    },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DocumentError::Block {
                start_line,
                end_line,
                source,
            } => {
                let mut v = source.to_json_value();
                v["start_line"] = json!(start_line);
                v["end_line"] = json!(end_line);
                v
            }
            DocumentError::Io { path, source } => json!({
                "kind": "io",
                "path": path,
                "message": source.to_string(),
            }),
        }
    }
}
