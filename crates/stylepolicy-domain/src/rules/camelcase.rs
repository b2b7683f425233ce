use crate::model::{IdentifierRole, Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use stylepolicy_types::ids;

/// Enforces camelCase for declared names and assigned properties.
///
/// Leading and trailing underscores are ignored, ALL_CAPS constants pass.
pub struct CamelcaseRule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Properties {
    #[default]
    Always,
    Never,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    allow: Vec<String>,
}

struct Settings {
    properties: Properties,
    allow: Vec<Regex>,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 1)?;
    let raw: RawSettings = options::slot(opts, 0)?.unwrap_or_default();
    let allow = raw
        .allow
        .iter()
        .map(|p| options::pattern(0, p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Settings {
        properties: raw.properties,
        allow,
    })
}

pub(crate) fn is_camel_case(name: &str) -> bool {
    let core = name.trim_matches('_');
    if !core.contains('_') {
        return true;
    }
    !core.chars().any(|c| c.is_lowercase())
}

impl Rule for CamelcaseRule {
    fn name(&self) -> &'static str {
        ids::RULE_CAMELCASE
    }

    fn description(&self) -> &'static str {
        "Enforce camelcase naming"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Identifier]
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

impl Visitor {
    fn checked(&self, node: &Node, cx: &RuleContext<'_>) -> bool {
        match node.attrs.role {
            Some(IdentifierRole::Declaration) => true,
            Some(IdentifierRole::Property) => {
                if self.settings.properties == Properties::Never {
                    return false;
                }
                // `obj.some_prop = value`
                let (Some(member), Some(assignment)) = (cx.parent(), cx.grandparent()) else {
                    return false;
                };
                member.kind == NodeKind::MemberExpression
                    && assignment.kind == NodeKind::AssignmentExpression
                    && assignment
                        .child(0)
                        .is_some_and(|target| std::ptr::eq(target, member))
            }
            _ => false,
        }
    }
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let Some(name) = node.name() else {
            return Ok(());
        };
        if !self.checked(node, cx) || is_camel_case(name) {
            return Ok(());
        }
        if self.settings.allow.iter().any(|re| re.is_match(name)) {
            return Ok(());
        }
        cx.report(
            ids::CODE_NOT_CAMEL_CASE,
            format!("Identifier '{name}' is not in camel case."),
            node.start_position(),
        );
        Ok(())
    }
}
