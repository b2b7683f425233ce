//! Syntax tree handed over by an external parser.
//!
//! Child layout per kind:
//! - `Program`, `BlockStatement`: statements
//! - `VariableDeclaration`: declarators
//! - `VariableDeclarator`: `[Identifier(declaration), init?]`
//! - `FunctionDeclaration`: `[Identifier(declaration), Parameter*, BlockStatement]`
//! - `Parameter`: `[Identifier(declaration)]`
//! - `ExpressionStatement`: `[expression]`; `ReturnStatement`: `[expression?]`
//! - `BinaryExpression`: `[left, right]`
//! - `AssignmentExpression`: `[target, value]`; `UpdateExpression`: `[target]`
//! - `CallExpression`: `[callee, arguments..]`
//! - `MemberExpression`: `[object, Identifier(property)]`
//! - `TemplateLiteral`: embedded expressions

use serde::{Deserialize, Serialize};
use stylepolicy_types::{LineCol, OffsetRange, Position, RepoPath};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Program,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    Parameter,
    BlockStatement,
    ExpressionStatement,
    ReturnStatement,
    DebuggerStatement,
    Identifier,
    StringLiteral,
    TemplateLiteral,
    NumberLiteral,
    NullLiteral,
    BinaryExpression,
    AssignmentExpression,
    UpdateExpression,
    CallExpression,
    MemberExpression,
}

impl NodeKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            NodeKind::StringLiteral
                | NodeKind::TemplateLiteral
                | NodeKind::NumberLiteral
                | NodeKind::NullLiteral
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

/// How an identifier occurrence relates to its binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRole {
    Declaration,
    Reference,
    Assignment,
    Property,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: LineCol,
    pub end: LineCol,
}

/// Kind-specific payload. Absent fields are simply not meaningful for the kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<IdentifierRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<DeclarationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Literal source text, quotes included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Whether a statement ends with an explicit terminator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub range: OffsetRange,
    #[serde(default)]
    pub attrs: NodeAttrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, loc: SourceLocation, range: OffsetRange) -> Self {
        Self {
            kind,
            loc,
            range,
            attrs: NodeAttrs::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: NodeAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.attrs.name.as_deref()
    }

    pub fn operator(&self) -> Option<&str> {
        self.attrs.operator.as_deref()
    }

    pub fn raw(&self) -> Option<&str> {
        self.attrs.raw.as_deref()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Position of the first character of the node.
    pub fn start_position(&self) -> Position {
        Position::new(self.loc.start, self.range)
    }

    /// Zero-width position just past the last character of the node.
    pub fn end_position(&self) -> Position {
        Position::new(self.loc.end, OffsetRange::at(self.range.end))
    }

    /// Identifier with the given role, if this node is one.
    pub fn identifier_with_role(&self, role: IdentifierRole) -> Option<&str> {
        if self.kind == NodeKind::Identifier && self.attrs.role == Some(role) {
            self.name()
        } else {
            None
        }
    }

    /// Number of nodes in this subtree, root included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

/// One parsed source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    #[serde(default)]
    pub path: RepoPath,
    pub root: Node,
}

impl SyntaxTree {
    pub fn new(path: impl Into<RepoPath>, root: Node) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }
}
