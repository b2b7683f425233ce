use super::scope::ScopeTracker;
use crate::model::{IdentifierRole, Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use stylepolicy_types::{Position, ids};

/// Flags member access on the global `console`.
pub struct NoConsoleRule;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    #[serde(default)]
    allow: BTreeSet<String>,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 1)?;
    Ok(options::slot(opts, 0)?.unwrap_or_default())
}

impl Rule for NoConsoleRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_CONSOLE
    }

    fn description(&self) -> &'static str {
        "Disallow the use of console"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Program,
            NodeKind::FunctionDeclaration,
            NodeKind::BlockStatement,
            NodeKind::Identifier,
            NodeKind::MemberExpression,
        ]
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        parse(opts).map(drop)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        Ok(Box::new(Visitor {
            settings: parse(opts)?,
            scopes: ScopeTracker::default(),
            candidates: Vec::new(),
        }))
    }
}

struct Visitor {
    settings: Settings,
    scopes: ScopeTracker,
    /// Reference index of each `console` object paired with its member position.
    candidates: Vec<(usize, Position)>,
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        if node.kind != NodeKind::MemberExpression {
            self.scopes.enter(node, cx);
            return Ok(());
        }

        let object = node
            .child(0)
            .and_then(|n| n.identifier_with_role(IdentifierRole::Reference));
        if object != Some("console") {
            return Ok(());
        }

        let method = node.child(1).and_then(Node::name).unwrap_or_default();
        if self.settings.allow.contains(method) {
            return Ok(());
        }

        // The object identifier is the next reference the tracker records.
        self.candidates
            .push((self.scopes.next_reference(), node.start_position()));
        Ok(())
    }

    fn exit(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        self.scopes.exit(node, cx);
        Ok(())
    }

    /// Only the global `console` is reported; a local binding shadows it.
    fn finish(&mut self, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let unresolved: BTreeSet<usize> = self
            .scopes
            .resolve()
            .into_iter()
            .filter(|r| r.name == "console")
            .map(|r| r.index)
            .collect();

        for (index, position) in &self.candidates {
            if unresolved.contains(index) {
                cx.report(
                    ids::CODE_CONSOLE_CALL,
                    "Unexpected console statement.",
                    *position,
                );
            }
        }
        Ok(())
    }
}
