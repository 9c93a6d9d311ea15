//! LambdaScript block evaluator -- runs elaborated blocks against a
//! session's outer environment.
//!
//! Every binding of a block gets a slot before anything is evaluated;
//! values are then evaluated in schedule order, procedures become closures
//! over the block's frame (trampolined when tail-recursive, curried when
//! the session says so), and the public names are merged atomically.
//!
//! # Public API
//!
//! - [`Session`] -- outer environment, configuration, block and document
//!   drivers
//! - [`Value`], [`Procedure`] -- runtime values
//! - [`BlockError`], [`DocumentError`], [`EvalError`] -- failures

pub mod builder;
pub mod config;
pub mod curry;
pub mod directive;
pub mod error;
pub mod eval;
pub mod frame;
pub mod numeric;
pub mod prelude;
pub mod session;
pub mod types;

pub use config::{SessionConfig, DEFAULT_RECURSION_LIMIT};
pub use error::{BlockError, DocumentError};
pub use frame::{Environment, Scope, Slot};
pub use session::{BlockOutcome, Session};
pub use types::{Arity, Builtin, Closure, EvalError, Procedure, Value};

/// Run one block in a fresh session and return that session.
///
/// Convenience for tests and one-off evaluation.
pub fn run_block(src: &str) -> Result<(Session, BlockOutcome), BlockError> {
    let mut session = Session::new();
    let outcome = session.run_block(src)?;
    Ok((session, outcome))
}
