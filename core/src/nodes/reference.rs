use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::{DefinitionReader, Scope};

/// A dotted path resolved against the scope at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    path: String,
}

impl Reference {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Node for Reference {
    fn scalar(&self) -> &str {
        &self.path
    }

    fn node_type(&self) -> NodeType {
        NodeType::Reference
    }

    fn shape(&self) -> Vec<KeyNode> {
        Vec::new()
    }

    /// Resolution failures are returned unwrapped; the owning node adds its scalar.
    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        scope.definition(&self.path)?.eval(scope)
    }
}

/// `exists("path")`: whether a definition resolves. Never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Exists {
    path: String,
}

impl Exists {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Node for Exists {
    fn scalar(&self) -> &str {
        "exists"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![KeyNode::positional(Expr::Literal(Literal::new(
            self.path.as_str(),
        )))]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        Ok(Literal::new(scope.exists(&self.path)))
    }
}

/// `coalesce("path", fallback)`: the definition at `path`, or `fallback` when it is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Coalesce {
    pub(super) path: String,
    pub(super) fallback: Expr,
}

impl Coalesce {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fallback(&self) -> &Expr {
        &self.fallback
    }
}

impl Node for Coalesce {
    fn scalar(&self) -> &str {
        "coalesce"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![
            KeyNode::positional(Expr::Literal(Literal::new(self.path.as_str()))),
            KeyNode::positional(self.fallback.clone()),
        ]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        match scope.definition(&self.path) {
            Ok(found) => found.eval(scope),
            Err(_) => self.fallback.eval(scope),
        }
        .map_err(wrap(self.scalar()))
    }
}
