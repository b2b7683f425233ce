use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde::Deserialize;
use serde_json::Value;
use stylepolicy_types::ids;

/// Requires (or forbids) an explicit terminator at the end of statements.
///
/// Options: `["always" | "never"]`, default `"always"`.
pub struct StatementTerminatorRule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    #[default]
    Always,
    Never,
}

fn parse(opts: &[Value]) -> Result<Mode, OptionsError> {
    options::at_most(opts, 1)?;
    Ok(options::slot(opts, 0)?.unwrap_or_default())
}

impl Rule for StatementTerminatorRule {
    fn name(&self) -> &'static str {
        ids::RULE_STATEMENT_TERMINATOR
    }

    fn description(&self) -> &'static str {
        "Require or disallow statement terminators"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["semi"]
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::VariableDeclaration,
            NodeKind::ExpressionStatement,
            NodeKind::ReturnStatement,
            NodeKind::DebuggerStatement,
        ]
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        parse(opts).map(drop)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        Ok(Box::new(Visitor { mode: parse(opts)? }))
    }
}

struct Visitor {
    mode: Mode,
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let Some(terminated) = node.attrs.terminated else {
            return Ok(());
        };

        match (self.mode, terminated) {
            (Mode::Always, false) => cx.report(
                ids::CODE_MISSING_TERMINATOR,
                "Missing semicolon.",
                node.end_position(),
            ),
            (Mode::Never, true) => cx.report(
                ids::CODE_EXTRA_TERMINATOR,
                "Extra semicolon.",
                node.end_position(),
            ),
            _ => {}
        }
        Ok(())
    }
}
