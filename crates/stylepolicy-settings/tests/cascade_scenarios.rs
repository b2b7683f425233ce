//! End-to-end: documents -> resolved policy -> evaluated tree.

use serde_json::json;
use std::collections::BTreeMap;
use stylepolicy_domain::model::DeclarationKind;
use stylepolicy_domain::test_support::{
    assign, expr_stmt, number, program, single_decl, string, target,
};
use stylepolicy_domain::{RuleRegistry, SyntaxTree, evaluate};
use stylepolicy_settings::model::GlobalDecl;
use stylepolicy_settings::{
    ConfigError, Overrides, PolicyDocument, PolicyResolver, parse_layer_json, parse_layer_value,
};
use stylepolicy_types::{Severity, Status, ids};

fn doc(value: serde_json::Value) -> PolicyDocument {
    parse_layer_value("test", value).expect("document")
}

fn reassign_window() -> SyntaxTree {
    SyntaxTree::new(
        "app.js",
        program(vec![expr_stmt(assign(target("window"), number("1")), true)]),
    )
}

#[test]
fn environment_globals_are_read_only_until_overridden() {
    let registry = RuleRegistry::builtin();
    let resolver = PolicyResolver::new(&registry);
    let document = doc(json!({
        "env": ["browser"],
        "rules": {"no-global-assign": "error"}
    }));

    let resolved = resolver
        .resolve("app", &document, &Overrides::default())
        .expect("resolve");
    let report = evaluate(&reassign_window(), &resolved.policy, &registry);
    assert_eq!(report.status, Status::Blocking);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].message,
        "Read-only global 'window' should not be modified."
    );

    let mut overrides = Overrides::default();
    overrides
        .globals
        .insert("window".to_string(), GlobalDecl::Mode("writable".to_string()));
    let resolved = resolver
        .resolve("app", &document, &overrides)
        .expect("resolve");
    let report = evaluate(&reassign_window(), &resolved.policy, &registry);
    assert_eq!(report.status, Status::Clean);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn local_off_silences_an_inherited_rule_and_keeps_its_options() {
    let registry = RuleRegistry::builtin();
    let mut source = BTreeMap::new();
    source.insert(
        "shared".to_string(),
        doc(json!({"rules": {"quotes": ["error", "single"]}})),
    );
    let resolver = PolicyResolver::new(&registry).with_source(&source);

    let local = doc(json!({"extends": "shared", "rules": {"quotes": "off"}}));
    let resolved = resolver
        .resolve("local", &local, &Overrides::default())
        .expect("resolve");
    let tree = SyntaxTree::new(
        "a.js",
        program(vec![single_decl(DeclarationKind::Var, "a", Some(string("\"x\"")))]),
    );
    assert!(evaluate(&tree, &resolved.policy, &registry).diagnostics.is_empty());

    // Re-enabling with a bare severity brings the inherited options back.
    let resolved = resolver
        .resolve(
            "local",
            &local,
            &Overrides::default().rule("quotes", json!("warn")),
        )
        .expect("resolve");
    let report = evaluate(&tree, &resolved.policy, &registry);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Advisory);
    assert_eq!(report.diagnostics[0].message, "Strings must use singlequote.");
}

#[test]
fn eslintrc_style_document_resolves_and_evaluates() {
    let registry = RuleRegistry::builtin();
    let document = parse_layer_json(
        ".eslintrc.json",
        r#"{
            "env": {"browser": true, "es2021": true, "node": true},
            "extends": "eslint:recommended",
            "parserOptions": {"ecmaVersion": "latest", "sourceType": "module"},
            "rules": {
                "semi": ["error", "always"],
                "quotes": ["error", "single"],
                "no-console": "warn",
                "no-unused-vars": ["warn", {"argsIgnorePattern": "^_"}],
                "no-var": "error",
                "prefer-const": "error",
                "prefer-template": "error",
                "camelcase": ["error", {"properties": "always"}],
                "eqeqeq": "error"
            }
        }"#,
    )
    .expect("parse");

    let resolved = PolicyResolver::new(&registry)
        .resolve(".eslintrc.json", &document, &Overrides::default())
        .expect("resolve");
    assert_eq!(
        resolved.layers,
        vec!["stylepolicy:recommended", ".eslintrc.json"]
    );
    assert_eq!(
        resolved.policy.severity_of(ids::RULE_NO_UNUSED_VARS),
        Severity::Advisory
    );
    assert_eq!(
        resolved.policy.severity_of(ids::RULE_NO_DEBUGGER),
        Severity::Blocking
    );

    let mut unterminated = single_decl(DeclarationKind::Var, "foo_bar", Some(string("\"x\"")));
    unterminated.attrs.terminated = Some(false);
    let tree = SyntaxTree::new("src/index.js", program(vec![unterminated]));

    let report = evaluate(&tree, &resolved.policy, &registry);
    let mut rules: Vec<&str> = report
        .diagnostics
        .iter()
        .map(|d| d.rule_id.as_str())
        .collect();
    rules.sort_unstable();
    assert_eq!(
        rules,
        vec![
            ids::RULE_CAMELCASE,
            ids::RULE_NO_UNUSED_VARS,
            ids::RULE_NO_VAR,
            ids::RULE_QUOTE_STYLE,
            ids::RULE_STATEMENT_TERMINATOR,
        ]
    );
    assert_eq!(report.status, Status::Blocking);
    assert_eq!(report.counts.advisory, 1);
    assert_eq!(report.counts.blocking, 4);
}

#[test]
fn configuration_errors_stop_before_evaluation() {
    let registry = RuleRegistry::builtin();
    let err = PolicyResolver::new(&registry)
        .resolve(
            "local",
            &doc(json!({"extends": "eslint:recommended", "rules": {"no-such-rule": "off"}})),
            &Overrides::default(),
        )
        .expect_err("unknown rule");
    assert_eq!(
        err,
        ConfigError::UnknownRule {
            layer: "local".to_string(),
            rule: "no-such-rule".to_string(),
        }
    );
}
