//! `extends` expansion and policy resolution.

use crate::cascade;
use crate::error::ConfigError;
use crate::layer::{LayerKind, PolicyLayer};
use crate::model::{EnvironmentsDecl, GlobalDecl, PolicyDocument};
use crate::presets;
use serde_json::Value;
use std::collections::BTreeMap;
use stylepolicy_domain::policy::Policy;
use stylepolicy_domain::registry::RuleRegistry;

const PLUGIN_PREFIX: &str = "plugin:";

/// Name of the layer built from [`Overrides`].
pub const OVERRIDES_LAYER: &str = "<overrides>";

/// Loads documents referenced from `extends` that are neither presets nor
/// plugin configs. Finding and reading files is the caller's business.
pub trait LayerSource {
    /// `Ok(None)` when the reference is unknown to this source.
    fn load(&self, reference: &str) -> Result<Option<PolicyDocument>, ConfigError>;
}

/// Source that resolves nothing; only presets and plugin configs work.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSource;

impl LayerSource for NoSource {
    fn load(&self, _reference: &str) -> Result<Option<PolicyDocument>, ConfigError> {
        Ok(None)
    }
}

impl LayerSource for BTreeMap<String, PolicyDocument> {
    fn load(&self, reference: &str) -> Result<Option<PolicyDocument>, ConfigError> {
        Ok(self.get(reference).cloned())
    }
}

/// Final local-override layer supplied by the caller, e.g. from command-line
/// flags.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub environments: Vec<String>,
    pub globals: BTreeMap<String, GlobalDecl>,
    pub rules: BTreeMap<String, Value>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty() && self.globals.is_empty() && self.rules.is_empty()
    }

    pub fn rule(mut self, id: impl Into<String>, setting: Value) -> Self {
        self.rules.insert(id.into(), setting);
        self
    }

    fn to_document(&self) -> PolicyDocument {
        PolicyDocument {
            environments: (!self.environments.is_empty())
                .then(|| EnvironmentsDecl::List(self.environments.clone())),
            globals: self.globals.clone(),
            rules: self.rules.clone(),
            ..PolicyDocument::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedPolicy {
    pub policy: Policy,
    /// Layer names in merge order.
    pub layers: Vec<String>,
}

pub struct PolicyResolver<'a> {
    registry: &'a RuleRegistry,
    source: &'a dyn LayerSource,
}

impl<'a> PolicyResolver<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self {
            registry,
            source: &NoSource,
        }
    }

    pub fn with_source(mut self, source: &'a dyn LayerSource) -> Self {
        self.source = source;
        self
    }

    /// Expand a document and everything it extends into ordered layers.
    ///
    /// Extended layers come first (depth-first, in `extends` order), the
    /// document itself last.
    pub fn expand(&self, name: &str, doc: &PolicyDocument) -> Result<Vec<PolicyLayer>, ConfigError> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.expand_into(name, LayerKind::LocalOverride, doc, &mut stack, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        name: &str,
        kind: LayerKind,
        doc: &PolicyDocument,
        stack: &mut Vec<String>,
        out: &mut Vec<PolicyLayer>,
    ) -> Result<(), ConfigError> {
        if stack.iter().any(|s| s == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ConfigError::ExtendsCycle {
                layer: stack.last().cloned().unwrap_or_else(|| name.to_string()),
                chain,
            });
        }
        stack.push(name.to_string());

        let references = doc.extends.as_ref().map(|e| e.as_slice()).unwrap_or(&[]);
        for reference in references {
            tracing::debug!(layer = name, extends = %reference, "expanding");

            if let Some(layer) = presets::preset(reference, self.registry) {
                out.push(layer);
                continue;
            }

            if let Some(target) = reference.strip_prefix(PLUGIN_PREFIX) {
                let (plugin, extended) = self.plugin_config(name, reference, target)?;
                let before = out.len();
                self.expand_into(reference, LayerKind::PluginCatalog, &extended, stack, out)?;
                // Extending a plugin config declares the plugin.
                if let Some(last) = out.get_mut(before..).and_then(|l| l.last_mut()) {
                    last.plugins.insert(plugin.to_string());
                }
                continue;
            }

            let Some(extended) = self.source.load(reference)? else {
                return Err(ConfigError::UnresolvedExtends {
                    layer: name.to_string(),
                    reference: reference.clone(),
                });
            };
            self.expand_into(reference, LayerKind::Inherited, &extended, stack, out)?;
        }

        out.push(PolicyLayer::from_document(name, kind, doc, self.registry)?);
        stack.pop();
        Ok(())
    }

    fn plugin_config<'t>(
        &self,
        layer: &str,
        reference: &str,
        target: &'t str,
    ) -> Result<(&'t str, PolicyDocument), ConfigError> {
        let unresolved = || ConfigError::UnresolvedExtends {
            layer: layer.to_string(),
            reference: reference.to_string(),
        };

        let (plugin, config) = target.split_once('/').ok_or_else(unresolved)?;
        let document = self
            .registry
            .plugin(plugin)
            .and_then(|info| info.configs.get(config))
            .ok_or_else(unresolved)?;

        let parsed = crate::parse_layer_value(reference, document.clone())?;
        Ok((plugin, parsed))
    }

    /// Expand, append overrides, merge and finalize.
    pub fn resolve(
        &self,
        name: &str,
        doc: &PolicyDocument,
        overrides: &Overrides,
    ) -> Result<ResolvedPolicy, ConfigError> {
        let mut layers = self.expand(name, doc)?;
        if !overrides.is_empty() {
            layers.push(PolicyLayer::from_document(
                OVERRIDES_LAYER,
                LayerKind::LocalOverride,
                &overrides.to_document(),
                self.registry,
            )?);
        }

        let policy = cascade::resolve_policy(&layers, self.registry)?;
        Ok(ResolvedPolicy {
            policy,
            layers: layers.into_iter().map(|l| l.name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use stylepolicy_domain::registry::RulePlugin;
    use stylepolicy_domain::rules::NoDebuggerRule;
    use stylepolicy_types::{Severity, ids};

    fn doc(value: Value) -> PolicyDocument {
        serde_json::from_value(value).expect("document")
    }

    #[test]
    fn extends_expand_depth_first_before_the_document() {
        let registry = RuleRegistry::builtin();
        let mut source = BTreeMap::new();
        source.insert(
            "team".to_string(),
            doc(json!({"extends": ["eslint:recommended"], "rules": {"no-var": "error"}})),
        );
        let resolver = PolicyResolver::new(&registry).with_source(&source);

        let layers = resolver
            .expand(".stylepolicy.json", &doc(json!({"extends": "team"})))
            .expect("expand");
        let names: Vec<(&str, LayerKind)> =
            layers.iter().map(|l| (l.name.as_str(), l.kind)).collect();
        assert_eq!(
            names,
            vec![
                (presets::RECOMMENDED, LayerKind::BaseCatalog),
                ("team", LayerKind::Inherited),
                (".stylepolicy.json", LayerKind::LocalOverride),
            ]
        );
    }

    #[test]
    fn unresolved_extends_names_the_referencing_layer() {
        let registry = RuleRegistry::builtin();
        let err = PolicyResolver::new(&registry)
            .expand("root", &doc(json!({"extends": ["airbnb"]})))
            .expect_err("unresolved");
        assert_eq!(
            err,
            ConfigError::UnresolvedExtends {
                layer: "root".to_string(),
                reference: "airbnb".to_string(),
            }
        );
    }

    #[test]
    fn extends_cycles_are_detected() {
        let registry = RuleRegistry::builtin();
        let mut source = BTreeMap::new();
        source.insert("a".to_string(), doc(json!({"extends": "b"})));
        source.insert("b".to_string(), doc(json!({"extends": "a"})));

        let err = PolicyResolver::new(&registry)
            .with_source(&source)
            .expand("a", &doc(json!({"extends": "b"})))
            .expect_err("cycle");
        assert_eq!(
            err,
            ConfigError::ExtendsCycle {
                layer: "b".to_string(),
                chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            }
        );
    }

    #[test]
    fn plugin_configs_declare_their_plugin() {
        let registry = RuleRegistry::builtin()
            .with_plugin(
                RulePlugin::new("house")
                    .with_rule(Arc::new(NoDebuggerRule))
                    .with_config("strict", json!({"rules": {"house/no-debugger": "error"}})),
            )
            .expect("plugin");

        let resolved = PolicyResolver::new(&registry)
            .resolve(
                "root",
                &doc(json!({"extends": "plugin:house/strict"})),
                &Overrides::default(),
            )
            .expect("resolve");
        assert_eq!(
            resolved.policy.severity_of("house/no-debugger"),
            Severity::Blocking
        );
        assert_eq!(resolved.layers, vec!["plugin:house/strict", "root"]);
    }

    #[test]
    fn plugin_rules_without_declared_plugin_are_unknown() {
        let registry = RuleRegistry::builtin()
            .with_plugin(RulePlugin::new("house").with_rule(Arc::new(NoDebuggerRule)))
            .expect("plugin");
        let resolver = PolicyResolver::new(&registry);

        let err = resolver
            .resolve(
                "root",
                &doc(json!({"rules": {"house/no-debugger": "warn"}})),
                &Overrides::default(),
            )
            .expect_err("undeclared plugin");
        assert!(matches!(err, ConfigError::UnknownRule { .. }));

        let ok = resolver
            .resolve(
                "root",
                &doc(json!({"plugins": ["house"], "rules": {"house/no-debugger": "warn"}})),
                &Overrides::default(),
            )
            .expect("declared plugin");
        assert_eq!(ok.policy.severity_of("house/no-debugger"), Severity::Advisory);
    }

    #[test]
    fn missing_plugin_config_is_unresolved() {
        let registry = RuleRegistry::builtin();
        let err = PolicyResolver::new(&registry)
            .expand("root", &doc(json!({"extends": "plugin:ghost/recommended"})))
            .expect_err("unresolved");
        assert!(matches!(err, ConfigError::UnresolvedExtends { .. }));
    }

    #[test]
    fn overrides_form_the_last_layer() {
        let registry = RuleRegistry::builtin();
        let overrides = Overrides::default().rule("quotes", json!("off"));

        let resolved = PolicyResolver::new(&registry)
            .resolve(
                "root",
                &doc(json!({"rules": {"quotes": ["error", "single"]}})),
                &overrides,
            )
            .expect("resolve");
        assert_eq!(resolved.layers.last().map(String::as_str), Some(OVERRIDES_LAYER));
        let binding = &resolved.policy.rules[ids::RULE_QUOTE_STYLE];
        assert_eq!(binding.severity, Severity::Off);
        assert_eq!(binding.options, vec![json!("single")]);
    }
}
