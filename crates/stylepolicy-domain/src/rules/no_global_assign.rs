use super::scope::{SCOPE_INTERESTS, ScopeTracker};
use crate::env::AccessMode;
use crate::model::{IdentifierRole, Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use stylepolicy_types::ids;

/// Flags writes to read-only globals that are not shadowed locally.
pub struct NoGlobalAssignRule;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    #[serde(default)]
    exceptions: BTreeSet<String>,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 1)?;
    Ok(options::slot(opts, 0)?.unwrap_or_default())
}

impl Rule for NoGlobalAssignRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_GLOBAL_ASSIGN
    }

    fn description(&self) -> &'static str {
        "Disallow assignments to read-only globals"
    }

    fn recommended(&self) -> bool {
        true
    }

    fn interests(&self) -> &'static [NodeKind] {
        SCOPE_INTERESTS
    }

    fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
        parse(opts).map(drop)
    }

    fn create(&self, opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
        Ok(Box::new(Visitor {
            settings: parse(opts)?,
            scopes: ScopeTracker::default(),
        }))
    }
}

struct Visitor {
    settings: Settings,
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
            if reference.role != IdentifierRole::Assignment
                || self.settings.exceptions.contains(&reference.name)
                || cx.global(&reference.name) != Some(AccessMode::ReadOnly)
            {
                continue;
            }
            cx.report(
                ids::CODE_READONLY_GLOBAL,
                format!("Read-only global '{}' should not be modified.", reference.name),
                reference.position,
            );
        }
        Ok(())
    }
}
