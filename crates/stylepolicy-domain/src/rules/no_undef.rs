use super::scope::{SCOPE_INTERESTS, ScopeTracker};
use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde_json::Value;
use stylepolicy_types::ids;

/// Flags references that resolve neither to a local binding nor to a
/// pre-declared global.
pub struct NoUndefRule;

impl Rule for NoUndefRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_UNDEF
    }

    fn description(&self) -> &'static str {
        "Disallow the use of undeclared variables"
    }

    fn recommended(&self) -> bool {
        true
    }

    fn interests(&self) -> &'static [NodeKind] {
        SCOPE_INTERESTS
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        options::at_most(opts, 0)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        options::at_most(opts, 0)?;
        Ok(Box::new(Visitor::default()))
    }
}

#[derive(Default)]
struct Visitor {
    scopes: ScopeTracker,
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        self.scopes.enter(node, cx);
        Ok(())
    }

    fn exit(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        self.scopes.exit(node, cx);
        Ok(())
    }

    fn finish(&mut self, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        for reference in self.scopes.resolve() {
            if cx.global(&reference.name).is_some() {
                continue;
            }
            cx.report(
                ids::CODE_UNDEFINED_IDENTIFIER,
                format!("'{}' is not defined.", reference.name),
                reference.position,
            );
        }
        Ok(())
    }
}
