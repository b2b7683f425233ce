use crate::layer::{LayerKind, PolicyLayer};
use crate::severity::RuleSetting;
use stylepolicy_domain::registry::RuleRegistry;
use stylepolicy_types::Severity;

pub const RECOMMENDED: &str = "stylepolicy:recommended";
pub const ALL: &str = "stylepolicy:all";

/// Built-in base catalogs addressable from `extends`.
///
/// The eslintrc spellings are accepted for existing documents.
pub fn preset(reference: &str, registry: &RuleRegistry) -> Option<PolicyLayer> {
    match reference {
        RECOMMENDED | "eslint:recommended" => Some(catalog(RECOMMENDED, registry, true)),
        ALL | "eslint:all" => Some(catalog(ALL, registry, false)),
        _ => None,
    }
}

fn catalog(name: &str, registry: &RuleRegistry, recommended_only: bool) -> PolicyLayer {
    let mut layer = PolicyLayer::new(name, LayerKind::BaseCatalog);
    for registered in registry.rules() {
        if registered.plugin.is_some() {
            continue;
        }
        if recommended_only && !registered.rule.recommended() {
            continue;
        }
        layer
            .rules
            .insert(registered.id.clone(), RuleSetting::new(Severity::Blocking));
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylepolicy_types::ids;

    #[test]
    fn recommended_enables_only_flagged_rules() {
        let layer = preset("eslint:recommended", &RuleRegistry::builtin()).expect("preset");
        assert_eq!(layer.name, RECOMMENDED);
        assert_eq!(layer.kind, LayerKind::BaseCatalog);
        let ids: Vec<&str> = layer.rules.keys().map(String::as_str).collect();
        assert_eq!(
            ids,
            vec![
                ids::RULE_NO_DEBUGGER,
                ids::RULE_NO_GLOBAL_ASSIGN,
                ids::RULE_NO_UNDEF,
                ids::RULE_NO_UNUSED_VARS,
            ]
        );
        assert!(
            layer
                .rules
                .values()
                .all(|s| s.severity == Severity::Blocking && s.options.is_none())
        );
    }

    #[test]
    fn all_enables_every_builtin_rule() {
        let registry = RuleRegistry::builtin();
        let layer = preset(ALL, &registry).expect("preset");
        assert_eq!(layer.rules.len(), registry.rules().len());
    }

    #[test]
    fn unknown_reference_is_not_a_preset() {
        assert!(preset("airbnb", &RuleRegistry::builtin()).is_none());
    }
}
