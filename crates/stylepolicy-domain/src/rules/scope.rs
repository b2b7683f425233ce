//! Lexical scope bookkeeping for binding-aware rules.
//!
//! Each visitor owns its own tracker; nothing here is shared between rules.
//! Declarations are hoisted (resolution happens after traversal), `var` and
//! parameters bind to the nearest function scope, `let`/`const` to the
//! nearest block.

use crate::model::{DeclarationKind, IdentifierRole, Node, NodeKind};
use crate::rule::RuleContext;
use std::collections::BTreeMap;
use stylepolicy_types::Position;

/// Node kinds a visitor must forward to the tracker.
pub(crate) const SCOPE_INTERESTS: &[NodeKind] = &[
    NodeKind::Program,
    NodeKind::FunctionDeclaration,
    NodeKind::BlockStatement,
    NodeKind::Identifier,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BindingKind {
    Declared(DeclarationKind),
    Function,
    /// Positional parameter of the function owning `scope`.
    Parameter { index: usize },
}

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub scope: usize,
    pub position: Position,
    pub initialized: bool,
    pub reads: usize,
    pub writes: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Reference {
    /// Sequence number in traversal order.
    pub index: usize,
    pub name: String,
    pub role: IdentifierRole,
    pub scope: usize,
    pub position: Position,
}

#[derive(Clone, Debug, Default)]
struct Scope {
    parent: Option<usize>,
    function: bool,
    bindings: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
pub(crate) struct ScopeTracker {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
    bindings: Vec<Binding>,
    references: Vec<Reference>,
}

impl ScopeTracker {
    pub fn enter(&mut self, node: &Node, cx: &RuleContext<'_>) {
        match node.kind {
            NodeKind::Program => self.push(true),
            NodeKind::FunctionDeclaration => self.push(true),
            NodeKind::BlockStatement => {
                // A function body shares the function's scope.
                if cx.parent().map(|p| p.kind) != Some(NodeKind::FunctionDeclaration) {
                    self.push(false);
                }
            }
            NodeKind::Identifier => self.identifier(node, cx),
            _ => {}
        }
    }

    pub fn exit(&mut self, node: &Node, cx: &RuleContext<'_>) {
        match node.kind {
            NodeKind::Program | NodeKind::FunctionDeclaration => {
                self.stack.pop();
            }
            NodeKind::BlockStatement
                if cx.parent().map(|p| p.kind) != Some(NodeKind::FunctionDeclaration) =>
            {
                self.stack.pop();
            }
            _ => {}
        }
    }

    /// Index the next recorded reference will get.
    pub fn next_reference(&self) -> usize {
        self.references.len()
    }

    fn push(&mut self, function: bool) {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            parent: self.stack.last().copied(),
            function,
            bindings: BTreeMap::new(),
        });
        self.stack.push(id);
    }

    fn current(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    fn nearest_function(&self) -> Option<usize> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| self.scopes[id].function)
    }

    fn identifier(&mut self, node: &Node, cx: &RuleContext<'_>) {
        let (Some(name), Some(role), Some(current)) = (node.name(), node.attrs.role, self.current())
        else {
            return;
        };

        match role {
            IdentifierRole::Declaration => self.declare(name, node, current, cx),
            IdentifierRole::Reference | IdentifierRole::Assignment => {
                self.references.push(Reference {
                    index: self.references.len(),
                    name: name.to_string(),
                    role,
                    scope: current,
                    position: node.start_position(),
                });
            }
            IdentifierRole::Property => {}
        }
    }

    fn declare(&mut self, name: &str, node: &Node, current: usize, cx: &RuleContext<'_>) {
        let Some(parent) = cx.parent() else {
            return;
        };

        let (kind, scope, initialized) = match parent.kind {
            NodeKind::VariableDeclarator => {
                let declaration = cx
                    .grandparent()
                    .and_then(|g| g.attrs.declaration)
                    .unwrap_or(DeclarationKind::Var);
                let scope = match declaration {
                    DeclarationKind::Var => self.nearest_function(),
                    DeclarationKind::Let | DeclarationKind::Const => Some(current),
                };
                (
                    BindingKind::Declared(declaration),
                    scope,
                    parent.children.len() > 1,
                )
            }
            NodeKind::FunctionDeclaration => (
                BindingKind::Function,
                self.scopes[current].parent,
                true,
            ),
            NodeKind::Parameter => {
                let index = cx
                    .grandparent()
                    .map(|g| {
                        g.children
                            .iter()
                            .filter(|c| c.kind == NodeKind::Parameter)
                            .position(|c| std::ptr::eq(c, parent))
                            .unwrap_or(0)
                    })
                    .unwrap_or(0);
                (BindingKind::Parameter { index }, Some(current), true)
            }
            _ => return,
        };

        let Some(scope) = scope else {
            return;
        };
        if self.scopes[scope].bindings.contains_key(name) {
            return;
        }

        let id = self.bindings.len();
        self.bindings.push(Binding {
            name: name.to_string(),
            kind,
            scope,
            position: node.start_position(),
            initialized,
            reads: 0,
            writes: 0,
        });
        self.scopes[scope].bindings.insert(name.to_string(), id);
    }

    /// Resolve every reference against the hoisted bindings and count usages.
    ///
    /// Returns the references that resolve to no binding, in source order.
    pub fn resolve(&mut self) -> Vec<Reference> {
        let mut unresolved = Vec::new();
        let references = std::mem::take(&mut self.references);
        for reference in references {
            match self.lookup(reference.scope, &reference.name) {
                Some(id) => {
                    let binding = &mut self.bindings[id];
                    match reference.role {
                        IdentifierRole::Assignment => binding.writes += 1,
                        _ => binding.reads += 1,
                    }
                }
                None => unresolved.push(reference),
            }
        }
        unresolved
    }

    fn lookup(&self, mut scope: usize, name: &str) -> Option<usize> {
        loop {
            let s = &self.scopes[scope];
            if let Some(&id) = s.bindings.get(name) {
                return Some(id);
            }
            scope = s.parent?;
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Declared directly in the program scope.
    pub fn is_top_level(&self, binding: &Binding) -> bool {
        binding.scope == 0
    }
}
