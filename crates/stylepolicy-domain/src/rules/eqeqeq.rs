use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde::Deserialize;
use serde_json::Value;
use stylepolicy_types::ids;

/// Requires strict equality operators.
///
/// Options: `["always" | "smart", { null: "always" | "never" | "ignore" }]`.
pub struct EqeqeqRule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    #[default]
    Always,
    Smart,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NullMode {
    #[default]
    Always,
    Never,
    Ignore,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Extra {
    #[serde(default)]
    null: NullMode,
}

#[derive(Clone, Copy, Debug, Default)]
struct Settings {
    mode: Mode,
    null: NullMode,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 2)?;
    let extra: Extra = options::slot(opts, 1)?.unwrap_or_default();
    Ok(Settings {
        mode: options::slot(opts, 0)?.unwrap_or_default(),
        null: extra.null,
    })
}

impl Rule for EqeqeqRule {
    fn name(&self) -> &'static str {
        ids::RULE_EQEQEQ
    }

    fn description(&self) -> &'static str {
        "Require === and !=="
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::BinaryExpression]
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        parse(opts).map(drop)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        Ok(Box::new(Visitor {
            settings: parse(opts)?,
        }))
    }
}

struct Visitor {
    settings: Settings,
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let Some(operator) = node.operator() else {
            return Ok(());
        };
        let (Some(left), Some(right)) = (node.child(0), node.child(1)) else {
            return Ok(());
        };
        let null_operand =
            left.kind == NodeKind::NullLiteral || right.kind == NodeKind::NullLiteral;

        let expected = match operator {
            "==" => "===",
            "!=" => "!==",
            "===" | "!==" => {
                if self.settings.mode == Mode::Always
                    && self.settings.null == NullMode::Never
                    && null_operand
                {
                    let loose = &operator[..2];
                    cx.report(
                        ids::CODE_LOOSE_EQUALITY,
                        format!("Expected '{loose}' and instead saw '{operator}'."),
                        node.start_position(),
                    );
                }
                return Ok(());
            }
            _ => return Ok(()),
        };

        let allowed = match self.settings.mode {
            Mode::Smart => null_operand || (left.kind.is_literal() && right.kind.is_literal()),
            Mode::Always => null_operand && self.settings.null != NullMode::Always,
        };
        if !allowed {
            cx.report(
                ids::CODE_LOOSE_EQUALITY,
                format!("Expected '{expected}' and instead saw '{operator}'."),
                node.start_position(),
            );
        }
        Ok(())
    }
}
