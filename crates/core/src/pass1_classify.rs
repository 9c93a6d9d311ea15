//! Pass 1: Binding classification -- split a block into directives and
//! ordinary bindings, tag each binding as a value or a procedure, and
//! reject duplicate declarations.

use crate::ast::{RawEntry, RawExpr};
use crate::error::ElabError;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Names starting with this prefix are directives, never bindings.
pub const RESERVED_PREFIX: &str = "__";
/// Bindings starting with this prefix are not mirrored into the outer
/// environment.
pub const PRIVATE_PREFIX: char = '_';

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Evaluated eagerly, exactly once, after its dependencies.
    Value,
    /// A lambda; may reference any binding of its block, including itself.
    Procedure,
}

/// An ordinary `name: expression` binding of a block.
#[derive(Debug, Clone, Serialize)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    #[serde(skip)]
    pub expr: RawExpr,
    pub line: u32,
    /// Declared parameter count; `None` for values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
    /// Names of this block referenced freely by `expr` (filled in Pass 2)
    pub deps: BTreeSet<String>,
    /// Set in Pass 5 for self-recursive procedures whose self calls are
    /// all in tail position
    pub tail_recursive: bool,
}

impl Binding {
    pub fn is_procedure(&self) -> bool {
        self.kind == BindingKind::Procedure
    }

    /// Private bindings stay visible inside their block only.
    pub fn is_private(&self) -> bool {
        self.name.starts_with(PRIVATE_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// `__print__`: evaluate and emit a value once the block is bound.
    Print,
    /// `__config__`: record session configuration options.
    Config,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "__print__" => Some(DirectiveKind::Print),
            "__config__" => Some(DirectiveKind::Config),
            _ => None,
        }
    }
}

/// A reserved entry. Never part of the dependency graph.
#[derive(Debug, Clone, Serialize)]
pub struct Directive {
    pub name: String,
    pub kind: DirectiveKind,
    #[serde(skip)]
    pub expr: RawExpr,
    pub line: u32,
}

/// Output of Pass 1, both lists in declaration order.
#[derive(Debug, Clone)]
pub struct Classified {
    pub bindings: Vec<Binding>,
    pub directives: Vec<Directive>,
}

pub fn classify(entries: Vec<RawEntry>) -> Result<Classified, ElabError> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut bindings = Vec::new();
    let mut directives = Vec::new();

    for RawEntry { name, expr, line } in entries {
        let reserved = name.starts_with(RESERVED_PREFIX);
        if let Some(first) = seen.get(&name) {
            let what = if reserved {
                "several uses of the special symbol"
            } else {
                "several declarations for the symbol"
            };
            return Err(ElabError::duplicate(
                &name,
                line,
                format!(
                    "{} '{}' in the same block: first declared at line {}",
                    what, name, first
                ),
            ));
        }
        seen.insert(name.clone(), line);

        if reserved {
            let kind = DirectiveKind::from_name(&name).ok_or_else(|| {
                ElabError::malformed_directive(
                    &name,
                    line,
                    format!("unknown special symbol '{}'", name),
                )
            })?;
            directives.push(Directive {
                name,
                kind,
                expr,
                line,
            });
            continue;
        }

        let arity = expr.lambda_arity();
        let kind = if arity.is_some() {
            BindingKind::Procedure
        } else {
            BindingKind::Value
        };
        bindings.push(Binding {
            name,
            kind,
            expr,
            line,
            arity,
            deps: BTreeSet::new(),
            tail_recursive: false,
        });
    }

    Ok(Classified {
        bindings,
        directives,
    })
}
