//! Configuration cascade merger.
//!
//! Layers merge strictly left to right. Scalars overwrite, sets and globals
//! union, rules merge per key. [`merge_pair`] is associative and the empty
//! layer is its identity, so any grouping of the same layer sequence yields
//! the same result.

use crate::error::ConfigError;
use crate::layer::{LayerKind, PolicyLayer};
use crate::severity::RuleSetting;
use std::collections::BTreeSet;
use stylepolicy_domain::env::resolve_scope;
use stylepolicy_domain::policy::{ParserCapabilities, Policy, RuleBinding};
use stylepolicy_domain::registry::RuleRegistry;

/// Name of the identity layer used when folding.
pub const EMPTY_LAYER: &str = "<empty>";

pub fn empty_layer() -> PolicyLayer {
    PolicyLayer::new(EMPTY_LAYER, LayerKind::BaseCatalog)
}

/// Merge two adjacent layers; `later` wins on conflicts.
pub fn merge_pair(earlier: &PolicyLayer, later: &PolicyLayer) -> PolicyLayer {
    let mut merged = earlier.clone();
    merged.name = later.name.clone();
    merged.kind = later.kind;

    merged
        .environments
        .extend(later.environments.iter().cloned());
    merged.plugins.extend(later.plugins.iter().cloned());
    merged.syntax_version = later.syntax_version.or(earlier.syntax_version);
    merged.source_type = later.source_type.or(earlier.source_type);

    for (name, mode) in &later.globals {
        merged.globals.insert(name.clone(), *mode);
    }

    for (id, setting) in &later.rules {
        let options = setting
            .options
            .clone()
            .or_else(|| earlier.rules.get(id).and_then(|s| s.options.clone()));
        merged.rules.insert(
            id.clone(),
            RuleSetting {
                severity: setting.severity,
                options,
            },
        );
    }

    merged
}

/// Fold an ordered layer sequence into one layer.
pub fn merge(layers: &[PolicyLayer]) -> PolicyLayer {
    layers
        .iter()
        .fold(empty_layer(), |acc, layer| merge_pair(&acc, layer))
}

/// Merge and finalize into the policy used for evaluation.
pub fn resolve_policy(
    layers: &[PolicyLayer],
    registry: &RuleRegistry,
) -> Result<Policy, ConfigError> {
    check_plugin_rules(layers, registry)?;

    let merged = merge(layers);
    tracing::debug!(
        layers = layers.len(),
        rules = merged.rules.len(),
        environments = merged.environments.len(),
        "merged policy layers"
    );
    finalize(&merged, registry)
}

/// Plugin-namespaced rules are only known when the cascade declares their
/// plugin somewhere.
fn check_plugin_rules(layers: &[PolicyLayer], registry: &RuleRegistry) -> Result<(), ConfigError> {
    let declared: BTreeSet<&str> = layers
        .iter()
        .flat_map(|l| l.plugins.iter().map(String::as_str))
        .collect();

    for layer in layers {
        for id in layer.rules.keys() {
            let plugin = registry.get(id).and_then(|r| r.plugin.as_deref());
            if let Some(plugin) = plugin
                && !declared.contains(plugin)
            {
                return Err(ConfigError::UnknownRule {
                    layer: layer.name.clone(),
                    rule: id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn finalize(merged: &PolicyLayer, registry: &RuleRegistry) -> Result<Policy, ConfigError> {
    let scope = resolve_scope(&merged.environments, registry.environments()).map_err(|e| {
        ConfigError::UnknownEnvironment {
            layer: merged.name.clone(),
            environment: e.id,
        }
    })?;

    // Environment globals are the lowest-priority source.
    let mut globals = scope.globals;
    for (name, mode) in &merged.globals {
        globals.insert(name.clone(), *mode);
    }

    let defaults = ParserCapabilities::default();
    let parser_capabilities = ParserCapabilities {
        syntax_version: merged
            .syntax_version
            .or(scope.syntax_version)
            .unwrap_or(defaults.syntax_version),
        source_type: merged
            .source_type
            .or(scope.source_type)
            .unwrap_or(defaults.source_type),
    };

    let rules = merged
        .rules
        .iter()
        .map(|(id, setting)| {
            (
                id.clone(),
                RuleBinding::new(setting.severity, setting.options.clone().unwrap_or_default()),
            )
        })
        .collect();

    Ok(Policy {
        environments: merged.environments.clone(),
        parser_capabilities,
        globals,
        rules,
    })
}
