//! The `explain` use case: describe a rule from the registry.

use stylepolicy_domain::RuleRegistry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleExplanation {
    pub id: String,
    pub description: String,
    pub recommended: bool,
    pub plugin: Option<String>,
    pub aliases: Vec<String>,
}

/// Output from the explain use case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplainOutput {
    Found(RuleExplanation),
    /// Unknown identifier; includes every registered rule id.
    NotFound {
        identifier: String,
        available: Vec<String>,
    },
}

/// Look up a rule by id or alias.
pub fn run_explain(registry: &RuleRegistry, identifier: &str) -> ExplainOutput {
    match registry.get(identifier) {
        Some(registered) => ExplainOutput::Found(RuleExplanation {
            id: registered.id.clone(),
            description: registered.rule.description().to_string(),
            recommended: registered.rule.recommended(),
            plugin: registered.plugin.clone(),
            aliases: registered
                .rule
                .aliases()
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available: registry.rules().iter().map(|r| r.id.clone()).collect(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &RuleExplanation) -> String {
    let mut out = String::new();

    out.push_str(&exp.id);
    out.push('\n');
    out.push_str(&"=".repeat(exp.id.len()));
    out.push_str("\n\n");
    out.push_str(&exp.description);
    out.push_str("\n\n");
    if exp.recommended {
        out.push_str("Enabled by stylepolicy:recommended.\n");
    }
    if let Some(plugin) = &exp.plugin {
        out.push_str(&format!("Provided by plugin '{plugin}'.\n"));
    }
    if !exp.aliases.is_empty() {
        out.push_str(&format!("Aliases: {}\n", exp.aliases.join(", ")));
    }

    out
}

/// Format the "not found" message for terminal display.
pub fn format_not_found(identifier: &str, available: &[String]) -> String {
    let mut out = format!("Unknown rule: {identifier}\n\nAvailable rules:\n");
    for id in available {
        out.push_str(&format!("  - {id}\n"));
    }
    out
}
