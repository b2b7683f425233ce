//! Built-in rule catalog.
//!
//! Each rule lives in its own file and implements [`Rule`] plus a per-run
//! [`RuleVisitor`](crate::rule::RuleVisitor). The order of `builtin_rules` is
//! the invocation order during evaluation.

use crate::rule::Rule;
use std::sync::Arc;

mod camelcase;
mod eqeqeq;
mod no_console;
mod no_debugger;
mod no_global_assign;
mod no_undef;
mod no_unused_vars;
mod no_var;
mod prefer_const;
mod prefer_template;
mod quote_style;
mod scope;
mod statement_terminator;


pub use camelcase::CamelcaseRule;
pub use eqeqeq::EqeqeqRule;
pub use no_console::NoConsoleRule;
pub use no_debugger::NoDebuggerRule;
pub use no_global_assign::NoGlobalAssignRule;
pub use no_undef::NoUndefRule;
pub use no_unused_vars::NoUnusedVarsRule;
pub use no_var::NoVarRule;
pub use prefer_const::PreferConstRule;
pub use prefer_template::PreferTemplateRule;
pub use quote_style::QuoteStyleRule;
pub use statement_terminator::StatementTerminatorRule;

pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(StatementTerminatorRule),
        Arc::new(QuoteStyleRule),
        Arc::new(NoConsoleRule),
        Arc::new(NoDebuggerRule),
        Arc::new(NoUndefRule),
        Arc::new(NoGlobalAssignRule),
        Arc::new(NoUnusedVarsRule),
        Arc::new(NoVarRule),
        Arc::new(PreferConstRule),
        Arc::new(PreferTemplateRule),
        Arc::new(CamelcaseRule),
        Arc::new(EqeqeqRule),
    ]
}
