//! Pure rule evaluation (no IO).
//!
//! Input: a syntax tree produced elsewhere plus a merged [`Policy`].
//! Output: ordered diagnostics + status per file.

#![forbid(unsafe_code)]

pub mod env;
pub mod model;
pub mod options;
pub mod policy;
pub mod registry;
pub mod report;
pub mod rule;
pub mod rules;

mod engine;
mod fingerprint;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod properties;

pub use engine::{evaluate, evaluate_all};
pub use env::{AccessMode, Environment, EnvironmentTable, ResolvedScope, resolve_scope};
pub use fingerprint::fingerprint_for_diagnostic;
pub use model::{Node, NodeKind, SyntaxTree};
pub use policy::{ParserCapabilities, Policy, RuleBinding, SourceType, SyntaxVersion};
pub use registry::{RegisteredRule, RuleRegistry, RulePlugin};
pub use rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
