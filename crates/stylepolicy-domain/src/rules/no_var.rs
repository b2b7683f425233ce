use crate::model::{DeclarationKind, Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde_json::Value;
use stylepolicy_types::ids;

pub struct NoVarRule;

impl Rule for NoVarRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_VAR
    }

    fn description(&self) -> &'static str {
        "Require let or const instead of var"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::VariableDeclaration]
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        options::at_most(opts, 0)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        options::at_most(opts, 0)?;
        Ok(Box::new(Visitor))
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        if !cx.capabilities().syntax_version.supports_block_bindings() {
            return Ok(());
        }
        if node.attrs.declaration == Some(DeclarationKind::Var) {
            cx.report(
                ids::CODE_VAR_DECLARATION,
                "Unexpected var, use let or const instead.",
                node.start_position(),
            );
        }
        Ok(())
    }
}
