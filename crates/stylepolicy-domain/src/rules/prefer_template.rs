use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde_json::Value;
use stylepolicy_types::ids;

/// Flags `+` chains that mix string literals with non-string operands.
///
/// Only the outermost `+` of a chain is reported.
pub struct PreferTemplateRule;

impl Rule for PreferTemplateRule {
    fn name(&self) -> &'static str {
        ids::RULE_PREFER_TEMPLATE
    }

    fn description(&self) -> &'static str {
        "Require template literals instead of string concatenation"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::BinaryExpression]
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        options::at_most(opts, 0)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        options::at_most(opts, 0)?;
        Ok(Box::new(Visitor))
    }
}

fn is_concat(node: &Node) -> bool {
    node.kind == NodeKind::BinaryExpression && node.operator() == Some("+")
}

fn collect_operands<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if is_concat(node) {
        for child in &node.children {
            collect_operands(child, out);
        }
    } else {
        out.push(node);
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        if !is_concat(node) || cx.parent().is_some_and(is_concat) {
            return Ok(());
        }
        if !cx.capabilities().syntax_version.supports_block_bindings() {
            return Ok(());
        }

        let mut operands = Vec::new();
        collect_operands(node, &mut operands);

        let has_string = operands.iter().any(|n| n.kind == NodeKind::StringLiteral);
        let has_other = operands
            .iter()
            .any(|n| !matches!(n.kind, NodeKind::StringLiteral | NodeKind::TemplateLiteral));
        if has_string && has_other {
            cx.report(
                ids::CODE_STRING_CONCATENATION,
                "Unexpected string concatenation.",
                node.start_position(),
            );
        }
        Ok(())
    }
}
