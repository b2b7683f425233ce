//! The contract every rule implements.
//!
//! A [`Rule`] is a stateless catalog entry: it names itself, declares which
//! node kinds it is interested in, validates its options and creates a fresh
//! [`RuleVisitor`] per evaluation run. Visitor state lives for one run only and
//! is never shared with other rules.

use crate::env::AccessMode;
use crate::model::{Node, NodeKind};
use crate::options::OptionsError;
use crate::policy::{ParserCapabilities, Policy};
use serde_json::Value;
use stylepolicy_types::{Diagnostic, Position, Severity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleFailure {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    #[error("{0}")]
    Internal(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

pub trait Rule: Send + Sync {
    /// Identifier used in policies (namespaced by the registry for plugins).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Part of the recommended base catalog.
    fn recommended(&self) -> bool {
        false
    }

    /// Alternative spellings accepted in policies.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Node kinds dispatched to this rule's visitor.
    fn interests(&self) -> &'static [NodeKind];

    fn validate_options(&self, options: &[Value]) -> Result<(), OptionsError>;

    fn create(&self, options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure>;
}

pub trait RuleVisitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure>;

    fn exit(&mut self, _node: &Node, _cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        Ok(())
    }

    /// Called once after the traversal completes.
    fn finish(&mut self, _cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        Ok(())
    }
}

/// What a visitor may see and do while handling one node.
pub struct RuleContext<'a> {
    rule_id: &'a str,
    severity: Severity,
    policy: &'a Policy,
    ancestors: &'a [&'a Node],
    out: &'a mut Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule_id: &'a str,
        severity: Severity,
        policy: &'a Policy,
        ancestors: &'a [&'a Node],
        out: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            policy,
            ancestors,
            out,
        }
    }

    pub fn rule_id(&self) -> &str {
        self.rule_id
    }

    pub fn report(&mut self, code: &str, message: impl Into<String>, position: Position) {
        self.out.push(Diagnostic::new(
            self.rule_id,
            code,
            self.severity,
            message,
            position,
        ));
    }

    /// Access mode of a pre-declared global, if any.
    pub fn global(&self, name: &str) -> Option<AccessMode> {
        self.policy.global(name)
    }

    pub fn capabilities(&self) -> ParserCapabilities {
        self.policy.parser_capabilities
    }

    /// Enclosing nodes, outermost first. Excludes the current node.
    pub fn ancestors(&self) -> &'a [&'a Node] {
        self.ancestors
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    pub fn grandparent(&self) -> Option<&'a Node> {
        let len = self.ancestors.len();
        if len < 2 {
            return None;
        }
        self.ancestors.get(len - 2).copied()
    }

    /// Whether any enclosing node is a function.
    pub fn inside_function(&self) -> bool {
        self.ancestors
            .iter()
            .any(|n| n.kind == NodeKind::FunctionDeclaration)
    }
}
