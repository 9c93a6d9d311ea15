use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure category of an elaboration error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Lexing or parsing failure.
    Syntax,
    /// Same ordinary name, or same reserved name, declared twice in one block.
    DuplicateDeclaration,
    /// A value binding participates in a dependency cycle.
    CircularReference,
    /// A reserved entry does not match any known directive shape.
    MalformedDirective,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::DuplicateDeclaration => "duplicate declaration",
            ErrorKind::CircularReference => "circular reference",
            ErrorKind::MalformedDirective => "malformed directive",
        };
        f.write_str(s)
    }
}

/// An elaboration error, scoped to a single block.
///
/// `line` is relative to the start of the block text handed to the
/// elaborator; document drivers add the fragment offset when reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{kind} (pass {pass}, line {line}): {message}")]
pub struct ElabError {
    pub pass: u8,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    pub line: u32,
    pub message: String,
}

impl ElabError {
    pub fn new(
        pass: u8,
        kind: ErrorKind,
        binding: Option<&str>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        ElabError {
            pass,
            kind,
            binding: binding.map(str::to_owned),
            line,
            message: message.into(),
        }
    }

    pub fn lex(line: u32, message: impl Into<String>) -> Self {
        ElabError::new(0, ErrorKind::Syntax, None, line, message)
    }

    pub fn parse(line: u32, message: impl Into<String>) -> Self {
        ElabError::new(0, ErrorKind::Syntax, None, line, message)
    }

    pub fn duplicate(name: &str, line: u32, message: impl Into<String>) -> Self {
        ElabError::new(1, ErrorKind::DuplicateDeclaration, Some(name), line, message)
    }

    pub fn malformed_directive(name: &str, line: u32, message: impl Into<String>) -> Self {
        ElabError::new(1, ErrorKind::MalformedDirective, Some(name), line, message)
    }

    pub fn circular(name: &str, line: u32, message: impl Into<String>) -> Self {
        ElabError::new(3, ErrorKind::CircularReference, Some(name), line, message)
    }

    /// Serialize to the JSON error report shape.
    /// All fields are always present (null for missing).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "binding": self.binding,
            "kind":    self.kind,
            "line":    self.line,
            "message": self.message,
            "pass":    self.pass,
        })
    }
}
