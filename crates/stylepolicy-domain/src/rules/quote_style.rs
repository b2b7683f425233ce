use crate::model::{Node, NodeKind};
use crate::options::{self, OptionsError};
use crate::rule::{Rule, RuleContext, RuleFailure, RuleVisitor};
use serde::Deserialize;
use serde_json::Value;
use stylepolicy_types::ids;

/// Enforces one quote character for string literals.
///
/// Options: `["single" | "double" | "backtick", { avoidEscape, allowTemplateLiterals }]`.
/// Template literals that embed expressions or span lines are always allowed.
pub struct QuoteStyleRule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Quote {
    Single,
    #[default]
    Double,
    Backtick,
}

impl Quote {
    fn char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Quote::Single => "singlequote",
            Quote::Double => "doublequote",
            Quote::Backtick => "backtick",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Exceptions {
    #[serde(default)]
    avoid_escape: bool,
    #[serde(default)]
    allow_template_literals: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct Settings {
    quote: Quote,
    exceptions: Exceptions,
}

fn parse(opts: &[Value]) -> Result<Settings, OptionsError> {
    options::at_most(opts, 2)?;
    Ok(Settings {
        quote: options::slot(opts, 0)?.unwrap_or_default(),
        exceptions: options::slot(opts, 1)?.unwrap_or_default(),
    })
}

impl Rule for QuoteStyleRule {
    fn name(&self) -> &'static str {
        ids::RULE_QUOTE_STYLE
    }

    fn description(&self) -> &'static str {
        "Enforce a consistent quote character for strings"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["quotes"]
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::StringLiteral, NodeKind::TemplateLiteral]
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
    fn string_ok(&self, raw: &str) -> Result<bool, RuleFailure> {
        let mut chars = raw.chars();
        let Some(open) = chars.next() else {
            return Err(RuleFailure::Internal("string literal without raw text".to_string()));
        };
        let preferred = self.settings.quote.char();
        if open == preferred {
            return Ok(true);
        }
        if self.settings.exceptions.avoid_escape && self.settings.quote != Quote::Backtick {
            let body = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
            return Ok(body.contains(preferred));
        }
        Ok(false)
    }

    fn template_ok(&self, node: &Node) -> bool {
        self.settings.quote == Quote::Backtick
            || self.settings.exceptions.allow_template_literals
            || !node.children.is_empty()
            || node.raw().is_some_and(|raw| raw.contains('\n'))
    }
}

impl RuleVisitor for Visitor {
    fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let ok = match node.kind {
            NodeKind::StringLiteral => self.string_ok(node.raw().unwrap_or_default())?,
            NodeKind::TemplateLiteral => self.template_ok(node),
            _ => true,
        };
        if !ok {
            cx.report(
                ids::CODE_WRONG_QUOTES,
                format!("Strings must use {}.", self.settings.quote.describe()),
                node.start_position(),
            );
        }
        Ok(())
    }
}
