//! The node model and the built-in catalog.
//!
//! Every node reports a scalar (the keyword it is written with), a
//! [`NodeType`] and an ordered shape of keyed children. Built-in nodes are
//! variants of [`Expr`]; host-defined nodes implement [`Node`] and travel as
//! [`Expr::Custom`].
//!
//! Trees are immutable once built and may be evaluated any number of times
//! against different scopes.

mod affix;
mod aggregate;
mod call;
mod compare;
mod is_empty;
mod literal;
mod logic;
mod reference;

use core::fmt;
use std::sync::Arc;

pub use affix::{Affix, AffixKind};
pub use aggregate::{Aggregate, AggregateKind};
pub use call::Call;
pub use compare::{Compare, Comparison};
pub use is_empty::IsEmpty;
pub use literal::{Callable, Literal};
pub use logic::{If, Not, Or};
pub use reference::{Coalesce, Exists, Reference};

use crate::error::{Error, NodeError};
use crate::scope::Scope;
use crate::values::Value;

#[cfg(test)]
mod nodes_test;

/// How a node is written in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// `scalar(child, key: child)`
    Expression,
    /// A bare dotted path such as `person.age`.
    Reference,
    /// A value written directly: `"text"`, `5`, `1.5`, `true`.
    Literal,
}

/// A child in a node's shape. Positional children have an empty key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyNode {
    pub key: String,
    pub node: Expr,
}

impl KeyNode {
    pub fn new(key: impl Into<String>, node: Expr) -> Self {
        Self {
            key: key.into(),
            node,
        }
    }

    pub fn positional(node: Expr) -> Self {
        Self::new("", node)
    }
}

/// Behaviour shared by every node, built-in or host-defined.
pub trait Node: fmt::Debug + Send + Sync {
    /// The keyword identifying this node; for references, the dotted path.
    fn scalar(&self) -> &str;

    fn node_type(&self) -> NodeType;

    /// Children in canonical argument order.
    fn shape(&self) -> Vec<KeyNode>;

    fn eval(&self, scope: &Scope) -> Result<Literal, Error>;
}

/// A node tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Reference(Reference),
    If(Arc<If>),
    Compare(Arc<Compare>),
    Not(Arc<Not>),
    Or(Arc<Or>),
    Aggregate(Arc<Aggregate>),
    Affix(Arc<Affix>),
    Call(Arc<Call>),
    Exists(Exists),
    Coalesce(Arc<Coalesce>),
    IsEmpty(Arc<IsEmpty>),
    Custom(Arc<dyn Node>),
    /// A node whose construction failed. Evaluating or encoding it fails.
    Invalid(NodeError),
}

impl Expr {
    /// Wrap a host-defined node.
    pub fn custom(node: impl Node + 'static) -> Self {
        Expr::Custom(Arc::new(node))
    }

    pub(crate) fn invalid(scalar: &str, cause: Error) -> Self {
        Expr::Invalid(NodeError::new(scalar, cause))
    }

    /// The raw value when this node is a literal.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Expr::Literal(literal) => Some(literal.value()),
            _ => None,
        }
    }

    /// The construction error carried by an invalid node.
    pub fn as_invalid(&self) -> Option<&NodeError> {
        match self {
            Expr::Invalid(err) => Some(err),
            _ => None,
        }
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            Expr::Literal(node) => node,
            Expr::Reference(node) => node,
            Expr::If(node) => node.as_ref(),
            Expr::Compare(node) => node.as_ref(),
            Expr::Not(node) => node.as_ref(),
            Expr::Or(node) => node.as_ref(),
            Expr::Aggregate(node) => node.as_ref(),
            Expr::Affix(node) => node.as_ref(),
            Expr::Call(node) => node.as_ref(),
            Expr::Exists(node) => node,
            Expr::Coalesce(node) => node.as_ref(),
            Expr::IsEmpty(node) => node.as_ref(),
            Expr::Custom(node) => node.as_ref(),
            Expr::Invalid(node) => node,
        }
    }

    /// Depth-first, pre-order traversal. Returning `false` from `visit` stops
    /// the whole walk. Returns whether the walk ran to completion.
    pub fn walk(&self, visit: &mut impl FnMut(&Expr) -> bool) -> bool {
        if !visit(self) {
            return false;
        }
        self.shape().iter().all(|child| child.node.walk(visit))
    }
}

impl Node for Expr {
    fn scalar(&self) -> &str {
        self.as_node().scalar()
    }

    fn node_type(&self) -> NodeType {
        self.as_node().node_type()
    }

    fn shape(&self) -> Vec<KeyNode> {
        self.as_node().shape()
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        self.as_node().eval(scope)
    }
}

impl Node for NodeError {
    fn scalar(&self) -> &str {
        &self.scalar
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        Vec::new()
    }

    fn eval(&self, _scope: &Scope) -> Result<Literal, Error> {
        Err(Error::Node(self.clone()))
    }
}

/// Structural equality: same node kind and equal children.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (Expr::Reference(a), Expr::Reference(b)) => a == b,
            (Expr::If(a), Expr::If(b)) => a == b,
            (Expr::Compare(a), Expr::Compare(b)) => a == b,
            (Expr::Not(a), Expr::Not(b)) => a == b,
            (Expr::Or(a), Expr::Or(b)) => a == b,
            (Expr::Aggregate(a), Expr::Aggregate(b)) => a == b,
            (Expr::Affix(a), Expr::Affix(b)) => a == b,
            (Expr::Call(a), Expr::Call(b)) => a == b,
            (Expr::Exists(a), Expr::Exists(b)) => a == b,
            (Expr::Coalesce(a), Expr::Coalesce(b)) => a == b,
            (Expr::IsEmpty(a), Expr::IsEmpty(b)) => a == b,
            (Expr::Custom(a), Expr::Custom(b)) => {
                a.scalar() == b.scalar() && a.node_type() == b.node_type() && a.shape() == b.shape()
            }
            (Expr::Invalid(a), Expr::Invalid(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// `if(condition, then)`: evaluates to `false` when the condition does not hold.
pub fn if_then(condition: Expr, then: Expr) -> Expr {
    If::build(condition, then, Vec::new())
}

pub fn if_then_else(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
    If::build(condition, then, vec![otherwise])
}

pub fn equal(first: Expr, second: Expr) -> Expr {
    Compare::build(Comparison::Equal, first, second)
}

pub fn greater(first: Expr, second: Expr) -> Expr {
    Compare::build(Comparison::Greater, first, second)
}

pub fn greater_or_equal(first: Expr, second: Expr) -> Expr {
    Compare::build(Comparison::GreaterOrEqual, first, second)
}

pub fn smaller(first: Expr, second: Expr) -> Expr {
    Compare::build(Comparison::Smaller, first, second)
}

pub fn smaller_or_equal(first: Expr, second: Expr) -> Expr {
    Compare::build(Comparison::SmallerOrEqual, first, second)
}

pub fn not(expression: Expr) -> Expr {
    Expr::Not(Arc::new(Not { expression }))
}

/// Returns the first `true` or non-boolean child value; `false` if every child is `false`.
pub fn or(nodes: Vec<Expr>) -> Expr {
    Or::build(nodes)
}

pub fn sum(nodes: Vec<Expr>) -> Expr {
    Aggregate::build(AggregateKind::Sum, nodes)
}

pub fn avg(nodes: Vec<Expr>) -> Expr {
    Aggregate::build(AggregateKind::Avg, nodes)
}

pub fn has_prefix(text: Expr, prefix: Expr) -> Expr {
    Expr::Affix(Arc::new(Affix {
        kind: AffixKind::Prefix,
        text,
        affix: prefix,
    }))
}

pub fn has_suffix(text: Expr, suffix: Expr) -> Expr {
    Expr::Affix(Arc::new(Affix {
        kind: AffixKind::Suffix,
        text,
        affix: suffix,
    }))
}

/// Calls the function defined at `name` with the evaluated `args`.
pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Call(Arc::new(Call {
        name: name.into(),
        args,
    }))
}

pub fn reference(path: impl Into<String>) -> Expr {
    Expr::Reference(Reference::new(path))
}

pub fn exists(path: impl Into<String>) -> Expr {
    Expr::Exists(Exists::new(path))
}

pub fn coalesce(path: impl Into<String>, fallback: Expr) -> Expr {
    Expr::Coalesce(Arc::new(Coalesce {
        path: path.into(),
        fallback,
    }))
}

pub fn is_empty(node: Expr) -> Expr {
    Expr::IsEmpty(Arc::new(IsEmpty { node }))
}

pub fn literal(value: impl Into<Value>) -> Expr {
    Expr::Literal(Literal::new(value))
}

/// A timestamp literal, written as `time("2024-01-01T00:00:00Z")`.
pub fn time(value: impl Into<Value>) -> Expr {
    match value.into() {
        value @ Value::Time(_) => Expr::Literal(Literal::new(value)),
        other => Expr::invalid(
            "time",
            Error::UnexpectedKind {
                expected: crate::values::Kind::Time,
                got: other.kind(),
            },
        ),
    }
}
