use super::scope::{Binding, BindingKind, SCOPE_INTERESTS, ScopeTracker};
use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::policy::SourceType;
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use stylepolicy_types::ids;

/// Flags bindings that are never read.
///
/// Options: `[{ vars, args, varsIgnorePattern, argsIgnorePattern }]`.
pub struct NoUnusedVarsRule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VarsMode {
    #[default]
    All,
    Local,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ArgsMode {
    #[default]
    AfterUsed,
    All,
    None,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawSettings {
    #[serde(default)]
    vars: VarsMode,
    #[serde(default)]
    args: ArgsMode,
    vars_ignore_pattern: Option<String>,
    args_ignore_pattern: Option<String>,
}

struct Settings {
    vars: VarsMode,
    args: ArgsMode,
    vars_ignore: Option<Regex>,
    args_ignore: Option<Regex>,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 1)?;
    let raw: RawSettings = options::slot(opts, 0)?.unwrap_or_default();
    Ok(Settings {
        vars: raw.vars,
        args: raw.args,
        vars_ignore: raw
            .vars_ignore_pattern
            .as_deref()
            .map(|p| options::pattern(0, p))
            .transpose()?,
        args_ignore: raw
            .args_ignore_pattern
            .as_deref()
            .map(|p| options::pattern(0, p))
            .transpose()?,
    })
}

impl Rule for NoUnusedVarsRule {
    fn name(&self) -> &'static str {
        ids::RULE_NO_UNUSED_VARS
    }

    fn description(&self) -> &'static str {
        "Disallow unused variables"
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

impl Visitor {
    fn skip_parameter(&self, binding: &Binding, index: usize) -> bool {
        if self
            .settings
            .args_ignore
            .as_ref()
            .is_some_and(|re| re.is_match(&binding.name))
        {
            return true;
        }
        match self.settings.args {
            ArgsMode::None => true,
            ArgsMode::All => false,
            // Only the parameters after the last used one are reported.
            ArgsMode::AfterUsed => self.scopes.bindings().iter().any(|other| {
                other.scope == binding.scope
                    && other.reads > 0
                    && matches!(other.kind, BindingKind::Parameter { index: i } if i > index)
            }),
        }
    }

    fn skip_variable(&self, binding: &Binding, source_type: SourceType) -> bool {
        if self
            .settings
            .vars_ignore
            .as_ref()
            .is_some_and(|re| re.is_match(&binding.name))
        {
            return true;
        }
        // Top-level script bindings may be used by other scripts.
        self.settings.vars == VarsMode::Local
            && self.scopes.is_top_level(binding)
            && !source_type.is_module_scoped()
    }
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
        self.scopes.resolve();
        let source_type = cx.capabilities().source_type;

        let mut unused = Vec::new();
        for binding in self.scopes.bindings() {
            if binding.reads > 0 {
                continue;
            }
            let (skip, code) = match binding.kind {
                BindingKind::Parameter { index } => (
                    self.skip_parameter(binding, index),
                    ids::CODE_UNUSED_PARAMETER,
                ),
                _ => (
                    self.skip_variable(binding, source_type),
                    ids::CODE_UNUSED_VARIABLE,
                ),
            };
            if !skip {
                unused.push((binding, code));
            }
        }

        for (binding, code) in unused {
            let message = if binding.writes > 0
                || (binding.initialized && matches!(binding.kind, BindingKind::Declared(_)))
            {
                format!("'{}' is assigned a value but never used.", binding.name)
            } else {
                format!("'{}' is defined but never used.", binding.name)
            };
            cx.report(code, message, binding.position);
        }
        Ok(())
    }
}
