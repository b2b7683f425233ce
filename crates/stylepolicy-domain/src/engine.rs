//! Single-pass rule evaluation over one syntax tree.

use crate::model::{Node, NodeKind, SyntaxTree};
use crate::policy::Policy;
use crate::registry::RuleRegistry;
use crate::report;
use crate::rule::{RuleContext, RuleFailure, RuleVisitor};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use stylepolicy_types::{Diagnostic, FileReport, Position, Severity, ids};

/// Evaluate one tree against a merged policy.
///
/// Rule failures never abort the run: each one becomes a
/// `rule_internal_error` diagnostic and the failing rule is skipped for the
/// remainder of the traversal.
pub fn evaluate(tree: &SyntaxTree, policy: &Policy, registry: &RuleRegistry) -> FileReport {
    let span = tracing::debug_span!("evaluate", path = %tree.path.as_str());
    let _guard = span.enter();

    let mut out: Vec<Diagnostic> = Vec::new();
    let root_position = tree.root.start_position();

    let mut active = instantiate(policy, registry, root_position, &mut out);
    tracing::debug!(rules = active.len(), nodes = tree.root.size(), "dispatching");

    traverse(&tree.root, policy, &mut active, &mut out);

    for rule in active.iter_mut() {
        rule.call(policy, &[], root_position, &mut out, |visitor, cx| {
            visitor.finish(cx)
        });
    }

    report::aggregate(tree.path.clone(), out)
}

/// Evaluate independent trees in parallel. Reports keep input order.
pub fn evaluate_all(
    trees: &[SyntaxTree],
    policy: &Policy,
    registry: &RuleRegistry,
) -> Vec<FileReport> {
    trees
        .par_iter()
        .map(|tree| evaluate(tree, policy, registry))
        .collect()
}

struct ActiveRule<'r> {
    id: &'r str,
    severity: Severity,
    interests: &'static [NodeKind],
    visitor: Option<Box<dyn RuleVisitor>>,
}

impl ActiveRule<'_> {
    fn wants(&self, kind: NodeKind) -> bool {
        self.visitor.is_some() && self.interests.contains(&kind)
    }

    /// Run one visitor hook with fault isolation.
    ///
    /// Diagnostics from a failing hook are discarded and replaced by a single
    /// internal error diagnostic.
    fn call<F>(
        &mut self,
        policy: &Policy,
        ancestors: &[&Node],
        position: Position,
        out: &mut Vec<Diagnostic>,
        hook: F,
    ) where
        F: FnOnce(&mut dyn RuleVisitor, &mut RuleContext<'_>) -> Result<(), RuleFailure>,
    {
        let Some(visitor) = self.visitor.as_mut() else {
            return;
        };

        let mut scratch = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut cx = RuleContext::new(self.id, self.severity, policy, ancestors, &mut scratch);
            hook(visitor.as_mut(), &mut cx)
        }));

        let failure = match outcome {
            Ok(Ok(())) => {
                out.append(&mut scratch);
                return;
            }
            Ok(Err(failure)) => failure,
            Err(payload) => RuleFailure::Panicked(panic_message(payload.as_ref())),
        };

        tracing::warn!(rule = self.id, error = %failure, "rule failed; disabled for the rest of the run");
        self.visitor = None;
        out.push(internal_error(self.id, &failure, position));
    }
}

fn instantiate<'r>(
    policy: &Policy,
    registry: &'r RuleRegistry,
    position: Position,
    out: &mut Vec<Diagnostic>,
) -> Vec<ActiveRule<'r>> {
    let mut active = Vec::new();
    for registered in registry.rules() {
        let Some(binding) = policy.active_binding(&registered.id) else {
            continue;
        };

        let created = panic::catch_unwind(AssertUnwindSafe(|| {
            registered.rule.create(&binding.options)
        }))
        .unwrap_or_else(|payload| Err(RuleFailure::Panicked(panic_message(payload.as_ref()))));

        match created {
            Ok(visitor) => active.push(ActiveRule {
                id: registered.id.as_str(),
                severity: binding.severity,
                interests: registered.rule.interests(),
                visitor: Some(visitor),
            }),
            Err(failure) => {
                tracing::warn!(rule = %registered.id, error = %failure, "rule could not be created");
                out.push(internal_error(&registered.id, &failure, position));
            }
        }
    }
    active
}

enum Step<'t> {
    Enter(&'t Node),
    Exit(&'t Node),
}

/// Pre-order traversal, children in source order. Iterative so deep trees
/// cannot overflow the stack.
fn traverse(root: &Node, policy: &Policy, active: &mut [ActiveRule<'_>], out: &mut Vec<Diagnostic>) {
    let mut work = vec![Step::Enter(root)];
    let mut ancestors: Vec<&Node> = Vec::new();

    while let Some(step) = work.pop() {
        match step {
            Step::Enter(node) => {
                for rule in active.iter_mut().filter(|r| r.wants(node.kind)) {
                    rule.call(policy, &ancestors, node.start_position(), out, |visitor, cx| {
                        visitor.enter(node, cx)
                    });
                }
                ancestors.push(node);
                work.push(Step::Exit(node));
                work.extend(node.children.iter().rev().map(Step::Enter));
            }
            Step::Exit(node) => {
                ancestors.pop();
                for rule in active.iter_mut().filter(|r| r.wants(node.kind)) {
                    rule.call(policy, &ancestors, node.start_position(), out, |visitor, cx| {
                        visitor.exit(node, cx)
                    });
                }
            }
        }
    }
}

fn internal_error(rule_id: &str, failure: &RuleFailure, position: Position) -> Diagnostic {
    Diagnostic::new(
        rule_id,
        ids::CODE_RULE_INTERNAL_ERROR,
        Severity::Blocking,
        format!("Rule '{rule_id}' failed: {failure}"),
        position,
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdentifierRole;
    use crate::options::{self, OptionsError};
    use crate::rule::Rule;
    use crate::test_support::*;
    use serde_json::Value;
    use std::sync::Arc;

    /// Fails on the first identifier it sees.
    struct Fragile {
        panic: bool,
    }

    struct FragileVisitor {
        panic: bool,
    }

    impl RuleVisitor for FragileVisitor {
        fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
            cx.report("seen", "seen before failing", node.start_position());
            if self.panic {
                panic!("boom");
            }
            Err(RuleFailure::Internal("cannot handle identifiers".to_string()))
        }
    }

    impl Rule for Fragile {
        fn name(&self) -> &'static str {
            if self.panic { "panicky" } else { "fragile" }
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }

        fn validate_options(&self, opts: &[Value]) -> Result<(), OptionsError> {
            options::at_most(opts, 0)
        }

        fn create(&self, _opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
            Ok(Box::new(FragileVisitor { panic: self.panic }))
        }
    }

    /// Records the traversal order it observes.
    struct Recorder;

    struct RecorderVisitor {
        depth: usize,
        seen: usize,
    }

    impl RuleVisitor for RecorderVisitor {
        fn enter(&mut self, node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
            assert_eq!(cx.ancestors().len(), self.depth);
            self.depth += 1;
            self.seen += 1;
            cx.report(
                "enter",
                format!("{:02} {:?}", self.seen, node.kind),
                node.start_position(),
            );
            Ok(())
        }

        fn exit(&mut self, _node: &Node, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
            self.depth -= 1;
            assert_eq!(cx.ancestors().len(), self.depth);
            Ok(())
        }

        fn finish(&mut self, cx: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
            assert_eq!(self.depth, 0);
            assert!(cx.parent().is_none());
            Ok(())
        }
    }

    impl Rule for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[
                NodeKind::Program,
                NodeKind::ExpressionStatement,
                NodeKind::CallExpression,
                NodeKind::Identifier,
            ]
        }

        fn validate_options(&self, _opts: &[Value]) -> Result<(), OptionsError> {
            Ok(())
        }

        fn create(&self, _opts: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleFailure> {
            Ok(Box::new(RecorderVisitor { depth: 0, seen: 0 }))
        }
    }

    fn registry_with(rule: Arc<dyn Rule>) -> RuleRegistry {
        let mut registry = RuleRegistry::builtin();
        registry.register(rule).expect("register test rule");
        registry
    }

    #[test]
    fn failing_rule_is_isolated_and_disabled() {
        let registry = registry_with(Arc::new(Fragile { panic: false }));
        let mut policy = policy_with_rule("fragile", Severity::Advisory);
        enable(&mut policy, ids::RULE_NO_UNDEF, Severity::Advisory);

        let tree = tree(vec![
            expr_stmt(reference("a"), true),
            expr_stmt(reference("b"), true),
        ]);
        let report = evaluate(&tree, &policy, &registry);

        let internal: Vec<&Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| d.code == ids::CODE_RULE_INTERNAL_ERROR)
            .collect();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].rule_id, "fragile");
        assert_eq!(internal[0].severity, Severity::Blocking);
        assert!(report.diagnostics.iter().all(|d| d.code != "seen"));

        let undefined = report
            .diagnostics
            .iter()
            .filter(|d| d.code == ids::CODE_UNDEFINED_IDENTIFIER)
            .count();
        assert_eq!(undefined, 2);
    }

    #[test]
    fn panicking_rule_becomes_internal_error() {
        let registry = registry_with(Arc::new(Fragile { panic: true }));
        let mut policy = policy_with_rule("panicky", Severity::Advisory);
        enable(&mut policy, ids::RULE_NO_DEBUGGER, Severity::Blocking);

        let tree = tree(vec![
            expr_stmt(reference("a"), true),
            debugger_stmt(true),
        ]);
        let report = evaluate(&tree, &policy, &registry);

        let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![ids::CODE_RULE_INTERNAL_ERROR, ids::CODE_DEBUGGER_STATEMENT]
        );
        assert!(report.diagnostics[0].message.contains("boom"));
    }

    #[test]
    fn traversal_is_pre_order_with_ancestors() {
        let registry = registry_with(Arc::new(Recorder));
        let policy = policy_with_rule("recorder", Severity::Advisory);

        let tree = tree(vec![expr_stmt(
            call(reference("f"), vec![reference("x")]),
            true,
        )]);
        let report = evaluate(&tree, &policy, &registry);

        let kinds: Vec<&str> = report.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "01 Program",
                "02 ExpressionStatement",
                "03 CallExpression",
                "04 Identifier",
                "05 Identifier",
            ]
        );
    }

    #[test]
    fn disabled_rules_are_not_dispatched() {
        let registry = RuleRegistry::builtin();
        let mut policy = policy_with_rule(ids::RULE_NO_DEBUGGER, Severity::Off);
        enable(&mut policy, ids::RULE_NO_UNDEF, Severity::Off);

        let report = evaluate(&tree(vec![debugger_stmt(true)]), &policy, &registry);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn evaluate_all_keeps_input_order() {
        let registry = RuleRegistry::builtin();
        let policy = policy_with_rule(ids::RULE_NO_DEBUGGER, Severity::Blocking);
        let trees = vec![
            tree_at("a.js", vec![debugger_stmt(true)]),
            tree_at("b.js", vec![expr_stmt(ident("x", IdentifierRole::Reference), true)]),
        ];

        let reports = evaluate_all(&trees, &policy, &registry);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].path.as_str(), "a.js");
        assert_eq!(reports[0].diagnostics.len(), 1);
        assert!(reports[1].diagnostics.is_empty());
    }
}
