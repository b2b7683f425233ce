//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Evaluation determinism over generated trees
//! - Diagnostic ordering and fingerprinting
//! - Status consistency with emitted severities

use crate::engine::{evaluate, evaluate_all};
use crate::model::{DeclarationKind, Node};
use crate::policy::{Policy, RuleBinding, SourceType, SyntaxVersion};
use crate::registry::RuleRegistry;
use crate::report::compare_diagnostics;
use crate::test_support::*;
use proptest::prelude::*;
use std::cmp::Ordering;
use stylepolicy_types::{Severity, Status};

// ============================================================================
// Strategies for generating arbitrary trees
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("console".to_string()),
        Just("some_value".to_string()),
        Just("window".to_string()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        arb_name().prop_map(|n| reference(&n)),
        Just(string("'x'")),
        Just(string("\"y\"")),
        Just(number("1")),
        Just(null()),
        Just(template("`t`", vec![])),
    ]
}

fn arb_expr() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                prop_oneof![Just("+"), Just("=="), Just("!="), Just("===")],
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| binary(op, l, r)),
            (inner.clone(), arb_name()).prop_map(|(obj, prop)| member(obj, &prop)),
            (arb_name(), prop::collection::vec(inner, 0..3))
                .prop_map(|(callee, args)| call(reference(&callee), args)),
        ]
    })
}

fn arb_kind() -> impl Strategy<Value = DeclarationKind> {
    prop_oneof![
        Just(DeclarationKind::Var),
        Just(DeclarationKind::Let),
        Just(DeclarationKind::Const),
    ]
}

fn arb_statement() -> impl Strategy<Value = Node> {
    prop_oneof![
        (arb_expr(), any::<bool>()).prop_map(|(e, t)| expr_stmt(e, t)),
        (arb_kind(), arb_name(), prop::option::of(arb_expr()))
            .prop_map(|(k, n, init)| single_decl(k, &n, init)),
        (arb_name(), arb_expr()).prop_map(|(n, e)| expr_stmt(assign(target(&n), e), true)),
        any::<bool>().prop_map(debugger_stmt),
        (arb_name(), prop::collection::vec(arb_expr(), 0..3)).prop_map(|(n, body)| {
            function(
                &n,
                &["p", "q"],
                body.into_iter().map(|e| expr_stmt(e, true)).collect(),
            )
        }),
    ]
}

fn arb_statements() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(arb_statement(), 0..8)
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Off),
        Just(Severity::Advisory),
        Just(Severity::Blocking),
    ]
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    let rule_count = RuleRegistry::builtin().rules().len();
    (
        prop::collection::vec(arb_severity(), rule_count),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(severities, modern, module)| {
            let registry = RuleRegistry::builtin();
            let mut policy = Policy::default();
            for (rule, severity) in registry.rules().iter().zip(severities) {
                policy
                    .rules
                    .insert(rule.id.clone(), RuleBinding::enabled(severity));
            }
            if modern {
                policy.parser_capabilities.syntax_version = SyntaxVersion::LATEST;
            }
            if module {
                policy.parser_capabilities.source_type = SourceType::Module;
            }
            policy
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn evaluation_is_deterministic(statements in arb_statements(), policy in arb_policy()) {
        let registry = RuleRegistry::builtin();
        let tree = tree(statements);
        let first = evaluate(&tree, &policy, &registry);
        let second = evaluate(&tree, &policy, &registry);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn diagnostics_are_sorted_and_fingerprinted(statements in arb_statements(), policy in arb_policy()) {
        let registry = RuleRegistry::builtin();
        let report = evaluate(&tree(statements), &policy, &registry);
        for pair in report.diagnostics.windows(2) {
            prop_assert_ne!(compare_diagnostics(&pair[0], &pair[1]), Ordering::Greater);
        }
        prop_assert!(report.diagnostics.iter().all(|d| d.fingerprint.is_some()));
        prop_assert!(report.diagnostics.iter().all(|d| d.severity.is_enabled()));
    }

    #[test]
    fn status_matches_worst_severity(statements in arb_statements(), policy in arb_policy()) {
        let registry = RuleRegistry::builtin();
        let report = evaluate(&tree(statements), &policy, &registry);
        let expected = if report.diagnostics.iter().any(|d| d.severity == Severity::Blocking) {
            Status::Blocking
        } else if report.diagnostics.is_empty() {
            Status::Clean
        } else {
            Status::Advisory
        };
        prop_assert_eq!(report.status, expected);
        prop_assert_eq!(
            (report.counts.advisory + report.counts.blocking) as usize,
            report.diagnostics.len()
        );
    }

    #[test]
    fn parallel_matches_sequential(
        batches in prop::collection::vec(arb_statements(), 0..4),
        policy in arb_policy(),
    ) {
        let registry = RuleRegistry::builtin();
        let trees: Vec<_> = batches
            .into_iter()
            .enumerate()
            .map(|(i, s)| tree_at(&format!("f{i}.js"), s))
            .collect();
        let parallel = evaluate_all(&trees, &policy, &registry);
        let sequential: Vec<_> = trees.iter().map(|t| evaluate(t, &policy, &registry)).collect();
        prop_assert_eq!(parallel, sequential);
    }
}
