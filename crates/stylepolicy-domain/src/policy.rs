use crate::env::AccessMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use stylepolicy_types::Severity;

/// Target syntax version, expressed as the edition year (ES5 = 2009).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyntaxVersion(u16);

impl SyntaxVersion {
    pub const ES3: SyntaxVersion = SyntaxVersion(1999);
    pub const ES5: SyntaxVersion = SyntaxVersion(2009);
    pub const ES2015: SyntaxVersion = SyntaxVersion(2015);
    pub const LATEST: SyntaxVersion = SyntaxVersion(2024);

    /// Accepts edition numbers (`3`, `5`, `6`..) and years (`2015`..).
    pub fn from_number(n: u16) -> Option<Self> {
        match n {
            3 => Some(Self::ES3),
            5 => Some(Self::ES5),
            6..=15 => Some(SyntaxVersion(2009 + n)),
            2015..=2024 => Some(SyntaxVersion(n)),
            _ => None,
        }
    }

    pub fn year(self) -> u16 {
        self.0
    }

    pub fn supports_block_bindings(self) -> bool {
        self >= Self::ES2015
    }
}

impl Default for SyntaxVersion {
    fn default() -> Self {
        Self::ES5
    }
}

/// How top-level declarations are scoped.
///
/// Ordered from least to most module-like.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    CommonJs,
    Module,
}

impl SourceType {
    /// Top-level declarations stay local to the file.
    pub fn is_module_scoped(self) -> bool {
        !matches!(self, SourceType::Script)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserCapabilities {
    pub syntax_version: SyntaxVersion,
    pub source_type: SourceType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleBinding {
    pub severity: Severity,
    /// Positional options following the severity; empty means rule defaults.
    #[serde(default)]
    pub options: Vec<Value>,
}

impl RuleBinding {
    pub fn new(severity: Severity, options: Vec<Value>) -> Self {
        Self { severity, options }
    }

    pub fn enabled(severity: Severity) -> Self {
        Self::new(severity, Vec::new())
    }

    pub fn disabled() -> Self {
        Self::new(Severity::Off, Vec::new())
    }
}

/// Fully merged and validated configuration driving evaluation runs.
///
/// Built by the configuration cascade; read-only afterwards and safe to share
/// between concurrent runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub environments: BTreeSet<String>,
    pub parser_capabilities: ParserCapabilities,
    pub globals: BTreeMap<String, AccessMode>,
    pub rules: BTreeMap<String, RuleBinding>,
}

impl Policy {
    /// Binding for an active rule (severity != off).
    pub fn active_binding(&self, rule_id: &str) -> Option<&RuleBinding> {
        self.rules.get(rule_id).filter(|b| b.severity.is_enabled())
    }

    pub fn severity_of(&self, rule_id: &str) -> Severity {
        self.rules
            .get(rule_id)
            .map(|b| b.severity)
            .unwrap_or(Severity::Off)
    }

    pub fn global(&self, name: &str) -> Option<AccessMode> {
        self.globals.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_version_accepts_editions_and_years() {
        assert_eq!(SyntaxVersion::from_number(6), Some(SyntaxVersion::ES2015));
        assert_eq!(SyntaxVersion::from_number(12).map(SyntaxVersion::year), Some(2021));
        assert_eq!(SyntaxVersion::from_number(2021).map(SyntaxVersion::year), Some(2021));
        assert_eq!(SyntaxVersion::from_number(4), None);
        assert_eq!(SyntaxVersion::from_number(2031), None);
        assert!(!SyntaxVersion::ES5.supports_block_bindings());
    }

    #[test]
    fn off_bindings_are_not_active() {
        let mut policy = Policy::default();
        policy
            .rules
            .insert("no-var".to_string(), RuleBinding::disabled());
        policy
            .rules
            .insert("eqeqeq".to_string(), RuleBinding::enabled(Severity::Advisory));

        assert!(policy.active_binding("no-var").is_none());
        assert!(policy.active_binding("eqeqeq").is_some());
        assert_eq!(policy.severity_of("missing"), Severity::Off);
    }
}
