#![allow(clippy::result_large_err)]
//! lambdascript-core: LambdaScript binding elaborator core library.
//!
//! Turns the text of one block (`name: expression` pairs) into an
//! [`ElaboratedBlock`]: classified bindings with their dependencies, an
//! evaluation order, and tail-recursion marks. Evaluation itself lives in
//! `lambdascript-eval`.
//!
//! # Public API
//!
//! - [`elaborate_block()`] -- run every pass over one block
//! - [`fragments()`] -- extract code blocks from a markdown document
//! - [`ElabError`] -- elaboration error type
//! - AST types: [`RawEntry`], [`RawExpr`], [`RawLiteral`], [`BinOp`], [`UnaryOp`]
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

pub mod ast;
pub mod document;
pub mod elaborate;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pass1_classify;
pub mod pass2_deps;
pub mod pass3_cycles;
pub mod pass4_schedule;
pub mod pass5_tailrec;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{BinOp, RawEntry, RawExpr, RawLiteral, UnaryOp};
pub use document::{fragments, Fragment, Fragments};
pub use elaborate::ElaboratedBlock;
pub use error::{ElabError, ErrorKind};
pub use pass1_classify::{
    Binding, BindingKind, Directive, DirectiveKind, PRIVATE_PREFIX, RESERVED_PREFIX,
};
pub use pass2_deps::{free_names, DependencyGraph};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use elaborate::elaborate_block;
pub use pass1_classify::classify;
pub use pass2_deps::analyze_dependencies;
pub use pass3_cycles::validate_cycles;
pub use pass4_schedule::schedule;
pub use pass5_tailrec::mark_tail_recursion;

/// Parse a standalone expression (used for REPL-style evaluation).
pub fn parse_expression(src: &str) -> Result<RawExpr, ElabError> {
    let tokens = lexer::lex(src)?;
    parser::parse_expression(&tokens)
}
