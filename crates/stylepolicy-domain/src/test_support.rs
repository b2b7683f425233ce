//! Tree and policy builders for tests.
//!
//! Positions are synthesized by [`program`]: statement `n` sits on line `n`,
//! and within a line every node starts one column after the previous node in
//! pre-order, so source order and position order agree.

use crate::engine::evaluate;
use crate::model::{
    DeclarationKind, IdentifierRole, Node, NodeAttrs, NodeKind, SourceLocation, SyntaxTree,
};
use crate::policy::{Policy, RuleBinding};
use crate::registry::RuleRegistry;
use serde_json::Value;
use stylepolicy_types::{Diagnostic, LineCol, OffsetRange, Severity};

pub fn node(kind: NodeKind) -> Node {
    Node::new(kind, SourceLocation::default(), OffsetRange::default())
}

pub fn ident(name: &str, role: IdentifierRole) -> Node {
    node(NodeKind::Identifier).with_attrs(NodeAttrs {
        name: Some(name.to_string()),
        role: Some(role),
        ..NodeAttrs::default()
    })
}

pub fn reference(name: &str) -> Node {
    ident(name, IdentifierRole::Reference)
}

pub fn decl(name: &str) -> Node {
    ident(name, IdentifierRole::Declaration)
}

pub fn target(name: &str) -> Node {
    ident(name, IdentifierRole::Assignment)
}

pub fn property(name: &str) -> Node {
    ident(name, IdentifierRole::Property)
}

fn with_raw(kind: NodeKind, raw: &str) -> Node {
    node(kind).with_attrs(NodeAttrs {
        raw: Some(raw.to_string()),
        ..NodeAttrs::default()
    })
}

/// String literal; `raw` includes the quotes.
pub fn string(raw: &str) -> Node {
    with_raw(NodeKind::StringLiteral, raw)
}

pub fn template(raw: &str, expressions: Vec<Node>) -> Node {
    with_raw(NodeKind::TemplateLiteral, raw).with_children(expressions)
}

pub fn number(raw: &str) -> Node {
    with_raw(NodeKind::NumberLiteral, raw)
}

pub fn null() -> Node {
    with_raw(NodeKind::NullLiteral, "null")
}

fn with_operator(kind: NodeKind, operator: &str, children: Vec<Node>) -> Node {
    node(kind)
        .with_attrs(NodeAttrs {
            operator: Some(operator.to_string()),
            ..NodeAttrs::default()
        })
        .with_children(children)
}

pub fn binary(operator: &str, left: Node, right: Node) -> Node {
    with_operator(NodeKind::BinaryExpression, operator, vec![left, right])
}

pub fn assign(target: Node, value: Node) -> Node {
    with_operator(NodeKind::AssignmentExpression, "=", vec![target, value])
}

pub fn update(target: Node) -> Node {
    with_operator(NodeKind::UpdateExpression, "++", vec![target])
}

pub fn call(callee: Node, arguments: Vec<Node>) -> Node {
    let mut children = vec![callee];
    children.extend(arguments);
    node(NodeKind::CallExpression).with_children(children)
}

pub fn member(object: Node, prop: &str) -> Node {
    node(NodeKind::MemberExpression).with_children(vec![object, property(prop)])
}

pub fn declarator(name: &str, init: Option<Node>) -> Node {
    let mut children = vec![decl(name)];
    children.extend(init);
    node(NodeKind::VariableDeclarator).with_children(children)
}

pub fn var_decl(kind: DeclarationKind, declarators: Vec<Node>, terminated: bool) -> Node {
    node(NodeKind::VariableDeclaration)
        .with_attrs(NodeAttrs {
            declaration: Some(kind),
            terminated: Some(terminated),
            ..NodeAttrs::default()
        })
        .with_children(declarators)
}

/// `<kind> name = init;`
pub fn single_decl(kind: DeclarationKind, name: &str, init: Option<Node>) -> Node {
    var_decl(kind, vec![declarator(name, init)], true)
}

fn statement(kind: NodeKind, children: Vec<Node>, terminated: bool) -> Node {
    node(kind)
        .with_attrs(NodeAttrs {
            terminated: Some(terminated),
            ..NodeAttrs::default()
        })
        .with_children(children)
}

pub fn expr_stmt(expression: Node, terminated: bool) -> Node {
    statement(NodeKind::ExpressionStatement, vec![expression], terminated)
}

pub fn return_stmt(expression: Option<Node>, terminated: bool) -> Node {
    statement(
        NodeKind::ReturnStatement,
        expression.into_iter().collect(),
        terminated,
    )
}

pub fn debugger_stmt(terminated: bool) -> Node {
    statement(NodeKind::DebuggerStatement, Vec::new(), terminated)
}

pub fn block(statements: Vec<Node>) -> Node {
    node(NodeKind::BlockStatement).with_children(statements)
}

pub fn function(name: &str, params: &[&str], body: Vec<Node>) -> Node {
    let mut children = vec![decl(name)];
    children.extend(
        params
            .iter()
            .map(|p| node(NodeKind::Parameter).with_children(vec![decl(p)])),
    );
    children.push(block(body));
    node(NodeKind::FunctionDeclaration).with_children(children)
}

fn offset(line: u32, column: u32) -> usize {
    (line as usize - 1) * 1000 + (column as usize - 1)
}

/// Lay out `node` starting at `column`; returns the end column.
fn layout(node: &mut Node, line: u32, column: u32) -> u32 {
    let end = if node.children.is_empty() {
        let width = node
            .name()
            .or(node.raw())
            .map(|s| s.chars().count() as u32)
            .unwrap_or(1)
            .max(1);
        column + width
    } else {
        let mut cursor = column;
        for child in &mut node.children {
            cursor = layout(child, line, cursor + 1);
        }
        cursor + 1
    };

    node.loc = SourceLocation {
        start: LineCol::new(line, column),
        end: LineCol::new(line, end),
    };
    node.range = OffsetRange::new(offset(line, column), offset(line, end));
    end
}

/// Program root with synthesized positions.
pub fn program(statements: Vec<Node>) -> Node {
    let mut root = node(NodeKind::Program).with_children(statements);
    let mut last = LineCol::new(1, 1);
    for (i, statement) in root.children.iter_mut().enumerate() {
        let line = i as u32 + 1;
        let end = layout(statement, line, 1);
        last = LineCol::new(line, end);
    }
    root.loc = SourceLocation {
        start: LineCol::new(1, 1),
        end: last,
    };
    root.range = OffsetRange::new(0, offset(last.line, last.column));
    root
}

pub fn tree(statements: Vec<Node>) -> SyntaxTree {
    tree_at("test.js", statements)
}

pub fn tree_at(path: &str, statements: Vec<Node>) -> SyntaxTree {
    SyntaxTree::new(path, program(statements))
}

pub fn policy_with_rule(rule_id: &str, severity: Severity) -> Policy {
    policy_with_rule_options(rule_id, severity, Vec::new())
}

pub fn policy_with_rule_options(rule_id: &str, severity: Severity, options: Vec<Value>) -> Policy {
    let mut policy = Policy::default();
    policy
        .rules
        .insert(rule_id.to_string(), RuleBinding::new(severity, options));
    policy
}

pub fn enable(policy: &mut Policy, rule_id: &str, severity: Severity) {
    policy
        .rules
        .insert(rule_id.to_string(), RuleBinding::enabled(severity));
}

/// Evaluate statements with the built-in registry and return the sorted
/// diagnostics.
pub fn run(policy: &Policy, statements: Vec<Node>) -> Vec<Diagnostic> {
    let registry = RuleRegistry::builtin();
    evaluate(&tree(statements), policy, &registry).diagnostics
}
