use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde_json::Value;
use stylepolicy_types::ids;

pub struct NoDebuggerRule;

impl Rule for NoDebuggerRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_DEBUGGER
    }

    fn description(&self) -> &'static str {
        "Disallow the use of debugger"
    }

    fn recommended(&self) -> bool {
        true
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::DebuggerStatement]
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
        cx.report(
            ids::CODE_DEBUGGER_STATEMENT,
            "Unexpected 'debugger' statement.",
            node.start_position(),
        );
        Ok(())
    }
}
