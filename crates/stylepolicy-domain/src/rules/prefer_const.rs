use super::scope::{BindingKind, SCOPE_INTERESTS, ScopeTracker};
use crate::model::{DeclarationKind, Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde_json::Value;
use stylepolicy_types::ids;

/// Flags initialized `let` bindings that are never written again.
pub struct PreferConstRule;

impl Rule for PreferConstRule {
    fn name(&self) -> &'static str {
        ids::RULE_PREFER_CONST
    }

    fn description(&self) -> &'static str {
        "Require const for bindings that are never reassigned"
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
        if !cx.capabilities().syntax_version.supports_block_bindings() {
            return Ok(());
        }
        self.scopes.resolve();
        for binding in self.scopes.bindings() {
            if binding.kind == BindingKind::Declared(DeclarationKind::Let)
                && binding.initialized
                && binding.writes == 0
            {
                cx.report(
                    ids::CODE_NEVER_REASSIGNED,
                    format!(
                        "'{}' is never reassigned. Use 'const' instead.",
                        binding.name
                    ),
                    binding.position,
                );
            }
        }
        Ok(())
    }
}
