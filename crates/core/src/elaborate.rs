//! Block elaborator: LambdaScript block text -> evaluation plan.
//!
//! This is a thin orchestrator that calls each pass module in order.
//! Nothing here evaluates an expression; the plan says what to evaluate,
//! in which order, and how procedures must be represented.

use crate::error::ElabError;
use crate::lexer;
use crate::parser;
use crate::pass1_classify::{self, Binding, Directive};
use crate::pass2_deps;
use crate::pass3_cycles;
use crate::pass4_schedule;
use crate::pass5_tailrec;
use serde::Serialize;

/// The elaborated form of one block.
#[derive(Debug, Clone, Serialize)]
pub struct ElaboratedBlock {
    /// Ordinary bindings, in declaration order
    pub bindings: Vec<Binding>,
    /// Reserved entries, in declaration order
    pub directives: Vec<Directive>,
    /// Binding names in evaluation order
    pub schedule: Vec<String>,
}

impl ElaboratedBlock {
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Bindings in evaluation order.
    pub fn scheduled(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.schedule
            .iter()
            .filter_map(move |name| self.binding(name))
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Elaborate the text of one block, or return the first elaboration error.
pub fn elaborate_block(src: &str) -> Result<ElaboratedBlock, ElabError> {
    // Pass 0: lex + parse
    let tokens = lexer::lex(src)?;
    let entries = parser::parse(&tokens)?;

    // Pass 1: classification
    let pass1_classify::Classified {
        mut bindings,
        directives,
    } = pass1_classify::classify(entries)?;

    // Pass 2: dependencies
    pass2_deps::analyze_dependencies(&mut bindings);

    // Pass 3: cycles through values
    pass3_cycles::validate_cycles(&bindings)?;

    // Pass 4: evaluation order
    let schedule = pass4_schedule::schedule(&bindings);
    log::debug!("schedule: {}", schedule.join(", "));

    // Pass 5: tail recursion
    pass5_tailrec::mark_tail_recursion(&mut bindings);
    for b in bindings.iter().filter(|b| b.tail_recursive) {
        log::debug!("'{}' is tail-recursive", b.name);
    }

    Ok(ElaboratedBlock {
        bindings,
        directives,
        schedule,
    })
}
