//! Static catalog of rules, plugins and environments.
//!
//! Populated at startup, before any policy is merged, then shared read-only.
//! Declaration order is the rule invocation order during evaluation.

use crate::env::{Environment, EnvironmentTable};
use crate::rule::Rule;
use crate::rules;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("rule already registered: {0}")]
    DuplicateRule(String),
    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),
}

#[derive(Clone)]
pub struct RegisteredRule {
    pub id: String,
    /// Owning plugin, `None` for built-in rules.
    pub plugin: Option<String>,
    pub rule: Arc<dyn Rule>,
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("id", &self.id)
            .field("plugin", &self.plugin)
            .finish()
    }
}

/// A rule catalog contributed by a third party.
///
/// Rule and environment names are namespaced as `<plugin>/<name>`; named
/// configs are referenced from `extends` as `plugin:<plugin>/<config>`.
pub struct RulePlugin {
    name: String,
    rules: Vec<Arc<dyn Rule>>,
    configs: BTreeMap<String, Value>,
    environments: BTreeMap<String, Environment>,
}

impl RulePlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            configs: BTreeMap::new(),
            environments: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// A named layer document, in the same shape as a policy file.
    pub fn with_config(mut self, name: impl Into<String>, document: Value) -> Self {
        self.configs.insert(name.into(), document);
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>, env: Environment) -> Self {
        self.environments.insert(name.into(), env);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct PluginInfo {
    pub configs: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
    index: BTreeMap<String, usize>,
    aliases: BTreeMap<String, String>,
    plugins: BTreeMap<String, PluginInfo>,
    environments: EnvironmentTable,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in rules and environments.
    pub fn builtin() -> Self {
        let mut registry = Self {
            environments: EnvironmentTable::builtin(),
            ..Self::default()
        };
        for rule in rules::builtin_rules() {
            let id = rule.name().to_string();
            registry.insert(id, None, rule);
        }
        registry
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let id = rule.name().to_string();
        let mut pending = BTreeSet::new();
        self.check_available(&id, None, rule.as_ref(), &mut pending)?;
        self.insert(id, None, rule);
        Ok(())
    }

    pub fn register_plugin(&mut self, plugin: RulePlugin) -> Result<(), RegistryError> {
        if self.plugins.contains_key(&plugin.name) {
            return Err(RegistryError::DuplicatePlugin(plugin.name));
        }

        let mut pending = BTreeSet::new();
        for rule in &plugin.rules {
            let id = format!("{}/{}", plugin.name, rule.name());
            self.check_available(&id, Some(plugin.name.as_str()), rule.as_ref(), &mut pending)?;
        }

        for rule in plugin.rules {
            let id = format!("{}/{}", plugin.name, rule.name());
            self.insert(id, Some(plugin.name.clone()), rule);
        }
        for (name, env) in plugin.environments {
            self.environments
                .register(&format!("{}/{}", plugin.name, name), env);
        }
        self.plugins.insert(
            plugin.name,
            PluginInfo {
                configs: plugin.configs,
            },
        );
        Ok(())
    }

    /// Ids and aliases share one namespace. `pending` collects the names of a
    /// batch that is not inserted yet.
    fn check_available(
        &self,
        id: &str,
        plugin: Option<&str>,
        rule: &dyn Rule,
        pending: &mut BTreeSet<String>,
    ) -> Result<(), RegistryError> {
        let aliases = rule.aliases().iter().map(|alias| match plugin {
            Some(p) => format!("{p}/{alias}"),
            None => (*alias).to_string(),
        });
        for name in std::iter::once(id.to_string()).chain(aliases) {
            let taken = self.index.contains_key(&name) || self.aliases.contains_key(&name);
            if taken || !pending.insert(name.clone()) {
                return Err(RegistryError::DuplicateRule(name));
            }
        }
        Ok(())
    }

    pub fn with_plugin(mut self, plugin: RulePlugin) -> Result<Self, RegistryError> {
        self.register_plugin(plugin)?;
        Ok(self)
    }

    fn insert(&mut self, id: String, plugin: Option<String>, rule: Arc<dyn Rule>) {
        for alias in rule.aliases() {
            let alias = match &plugin {
                Some(p) => format!("{p}/{alias}"),
                None => (*alias).to_string(),
            };
            self.aliases.insert(alias, id.clone());
        }
        self.index.insert(id.clone(), self.rules.len());
        self.rules.push(RegisteredRule { id, plugin, rule });
    }

    /// Canonical id for an id or alias.
    pub fn canonical_id<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        if self.index.contains_key(id) {
            return Some(id);
        }
        self.aliases.get(id).map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredRule> {
        let canonical = self.canonical_id(id)?;
        self.index.get(canonical).map(|&i| &self.rules[i])
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[RegisteredRule] {
        &self.rules
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginInfo> {
        self.plugins.get(name)
    }

    pub fn environments(&self) -> &EnvironmentTable {
        &self.environments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};
    use crate::options::{self, OptionsError};
    use crate::rule::{RuleContext, RuleFailure, RuleVisitor};
    use stylepolicy_types::ids;

    struct Noop;

    impl RuleVisitor for Noop {
        fn enter(&mut self, _node: &Node, _cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
            Ok(())
        }
    }

    struct NoLabels;

    impl Rule for NoLabels {
        fn name(&self) -> &'static str {
            "no-labels"
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn aliases(&self) -> &'static [&'static str] {
            &["labels"]
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Program]
        }

        fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
            options::at_most(opts, 0)
        }

        fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
            Ok(Box::new(Noop))
        }
    }

    #[test]
    fn builtin_rules_keep_declaration_order() {
        let registry = RuleRegistry::builtin();
        let declared: Vec<&str> = registry.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(declared.first(), Some(&ids::RULE_STATEMENT_TERMINATOR));
        assert_eq!(declared.last(), Some(&ids::RULE_EQEQEQ));
        assert_eq!(declared.len(), 12);
    }

    #[test]
    fn aliases_resolve_to_canonical_ids() {
        let registry = RuleRegistry::builtin();
        assert_eq!(
            registry.canonical_id("semi"),
            Some(ids::RULE_STATEMENT_TERMINATOR)
        );
        assert_eq!(registry.canonical_id("quotes"), Some(ids::RULE_QUOTE_STYLE));
        assert_eq!(registry.canonical_id("no-such-rule"), None);
    }

    #[test]
    fn plugin_rules_and_environments_are_namespaced() {
        let registry = RuleRegistry::builtin()
            .with_plugin(
                RulePlugin::new("house")
                    .with_rule(Arc::new(NoLabels))
                    .with_environment("embedded", Environment::new().readonly(&["host"])),
            )
            .expect("register plugin");

        let rule = registry.get("house/no-labels").expect("namespaced rule");
        assert_eq!(rule.plugin.as_deref(), Some("house"));
        assert_eq!(
            registry.canonical_id("house/labels"),
            Some("house/no-labels")
        );
        assert!(registry.get("no-labels").is_none());
        assert!(registry.environments().contains("house/embedded"));
        assert!(registry.plugin("house").is_some());
    }

    #[test]
    fn duplicate_registrations_are_rejected() {
        let mut registry = RuleRegistry::builtin();
        registry.register(Arc::new(NoLabels)).expect("first");
        assert_eq!(
            registry.register(Arc::new(NoLabels)),
            Err(RegistryError::DuplicateRule("no-labels".to_string()))
        );

        registry
            .register_plugin(RulePlugin::new("house"))
            .expect("first plugin");
        assert_eq!(
            registry.register_plugin(RulePlugin::new("house")),
            Err(RegistryError::DuplicatePlugin("house".to_string()))
        );
    }

    struct Named {
        name: &'static str,
        aliases: &'static [&'static str],
    }

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn aliases(&self) -> &'static [&'static str] {
            self.aliases
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Program]
        }

        fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
            options::at_most(opts, 0)
        }

        fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
            Ok(Box::new(Noop))
        }
    }

    #[test]
    fn aliases_cannot_shadow_existing_names() {
        let mut registry = RuleRegistry::builtin();

        let alias_of_alias = Named {
            name: "no-extra-semi",
            aliases: &["semi"],
        };
        assert_eq!(
            registry.register(Arc::new(alias_of_alias)),
            Err(RegistryError::DuplicateRule("semi".to_string()))
        );

        let alias_of_id = Named {
            name: "strict-equality",
            aliases: &["eqeqeq"],
        };
        assert_eq!(
            registry.register(Arc::new(alias_of_id)),
            Err(RegistryError::DuplicateRule("eqeqeq".to_string()))
        );

        assert!(registry.get("no-extra-semi").is_none());
        assert_eq!(
            registry.canonical_id("semi"),
            Some(ids::RULE_STATEMENT_TERMINATOR)
        );
    }

    #[test]
    fn plugin_aliases_collide_within_the_plugin() {
        let mut registry = RuleRegistry::builtin();
        let plugin = RulePlugin::new("house")
            .with_rule(Arc::new(NoLabels))
            .with_rule(Arc::new(Named {
                name: "labels",
                aliases: &[],
            }));

        assert_eq!(
            registry.register_plugin(plugin),
            Err(RegistryError::DuplicateRule("house/labels".to_string()))
        );
        assert!(registry.plugin("house").is_none());
        assert!(registry.get("house/no-labels").is_none());
    }
}
