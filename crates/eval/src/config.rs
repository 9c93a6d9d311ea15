//! Session configuration.
//!
//! Seeded by the embedder (the CLI maps `--no-curry`,
//! `--no-tail-recursion` and `--recursion-limit` onto it) and updated by
//! `__config__` directives.

use std::collections::BTreeMap;

use serde::Serialize;

/// Procedure calls that may be active at once before evaluation fails.
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// Policies applied when building procedure bindings, plus every option
/// recorded by `__config__`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    /// Wrap procedures in a partial-application adapter.
    pub curry: bool,
    /// Run qualifying self-recursive procedures as trampolines.
    pub tail_recursion: bool,
    /// Deepest nesting of procedure calls; a trampolined tail call does
    /// not nest.
    pub recursion_limit: usize,
    /// Options set by `__config__` directives, known or not
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            curry: true,
            tail_recursion: true,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            options: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Record `option = value`. The known policies accept booleans only;
    /// `recursion_limit` takes a positive integer.
    pub fn set(&mut self, option: &str, value: serde_json::Value) -> Result<(), String> {
        if option == "recursion_limit" {
            self.recursion_limit = value
                .as_u64()
                .filter(|n| *n > 0)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    format!("option '{}' takes a positive integer, got {}", option, value)
                })?;
            self.options.insert(option.to_owned(), value);
            return Ok(());
        }
        let policy = match option {
            "curry" => Some(&mut self.curry),
            "tail_recursion" => Some(&mut self.tail_recursion),
            _ => None,
        };
        if let Some(flag) = policy {
            *flag = value
                .as_bool()
                .ok_or_else(|| format!("option '{}' takes True or False, got {}", option, value))?;
        }
        self.options.insert(option.to_owned(), value);
        Ok(())
    }
}
