//! The trigger script language.
//!
//! A trigger body is a list of command lines. This module holds everything
//! that works on the text of those lines; running them against the world is
//! the engine's job.
//!
//! ## Key Components
//!
//! - [`Script`]: a body compiled to one [`Op`] per line, jump targets resolved
//! - [`VarTable`]: case-insensitive local and global variables
//! - [`eval_expr`]: the operator-precedence expression evaluator
//! - [`SubstContext`]: `%var.field[value]%` expansion against live entities
//! - [`WaitQueue`]: continuations parked by `wait`
//!
//! ## Error Reporting
//!
//! Authoring mistakes are not errors in the Rust sense. They are reported
//! through `tracing` under the `scripts` target, tagged with the trigger's
//! vnum and name, and the offending construct evaluates to nothing.

pub mod compile;
pub mod expr;
mod fields;
pub mod scheduler;
pub mod subst;
pub mod vars;

pub use compile::{Line, Op, Script};
pub use expr::{eval_expr, eval_op, OPERATORS};
pub use scheduler::{Continuation, WaitId, WaitKind, WaitQueue};
pub use subst::SubstContext;
pub use vars::{VarTable, Variable};

use tracing::warn;

use crate::triggers::TriggerPrototype;

/// Report a script authoring error.
pub(crate) fn script_log(trigger: &TriggerPrototype, message: impl std::fmt::Display) {
    warn!(
        target: "scripts",
        vnum = trigger.vnum,
        name = %trigger.name,
        "{}",
        message
    );
}
