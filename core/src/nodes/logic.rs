use std::sync::Arc;

use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::Scope;
use crate::values::{Kind, Value};

fn expect_bool(value: Value) -> Result<bool, Error> {
    match value {
        Value::Bool(value) => Ok(value),
        other => Err(Error::UnexpectedKind {
            expected: Kind::Bool,
            got: other.kind(),
        }),
    }
}

// ============================================================================
// If
// ============================================================================

/// `if(condition, then, else?)`.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    condition: Expr,
    then: Expr,
    otherwise: Option<Expr>,
}

impl If {
    /// Builds the node, rejecting more than one else branch.
    pub fn build(condition: Expr, then: Expr, mut otherwise: Vec<Expr>) -> Expr {
        if otherwise.len() > 1 {
            return Expr::invalid("if", Error::ExtraElseBranch);
        }
        Expr::If(Arc::new(If {
            condition,
            then,
            otherwise: otherwise.pop(),
        }))
    }
}

impl Node for If {
    fn scalar(&self) -> &str {
        "if"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        let mut shape = vec![
            KeyNode::new("condition", self.condition.clone()),
            KeyNode::new("then", self.then.clone()),
        ];
        if let Some(otherwise) = &self.otherwise {
            shape.push(KeyNode::new("else", otherwise.clone()));
        }
        shape
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let fulfilled = scope
            .compute(&self.condition)
            .and_then(expect_bool)
            .map_err(wrap(self.scalar()))?;

        let branch = match (fulfilled, &self.otherwise) {
            (true, _) => &self.then,
            (false, Some(otherwise)) => otherwise,
            (false, None) => return Ok(Literal::new(false)),
        };
        scope
            .compute(branch)
            .map(Literal::new)
            .map_err(wrap(self.scalar()))
    }
}

// ============================================================================
// Not
// ============================================================================

/// `not(expression)`: boolean negation.
#[derive(Debug, Clone, PartialEq)]
pub struct Not {
    pub(super) expression: Expr,
}

impl Node for Not {
    fn scalar(&self) -> &str {
        "not"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![KeyNode::new("expression", self.expression.clone())]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        scope
            .compute(&self.expression)
            .and_then(expect_bool)
            .map(|value| Literal::new(!value))
            .map_err(wrap(self.scalar()))
    }
}

// ============================================================================
// Or
// ============================================================================

/// `or(n1, ..., nk)`: coalescing disjunction.
///
/// A `false` child is skipped. The first `true` or non-boolean value is
/// returned as is, and the first error stops evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Or {
    nodes: Vec<Expr>,
}

impl Or {
    pub fn build(nodes: Vec<Expr>) -> Expr {
        if nodes.is_empty() {
            return Expr::invalid("or", Error::MissingArguments);
        }
        Expr::Or(Arc::new(Or { nodes }))
    }
}

impl Node for Or {
    fn scalar(&self) -> &str {
        "or"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        self.nodes.iter().cloned().map(KeyNode::positional).collect()
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        for node in &self.nodes {
            match scope.compute(node).map_err(wrap(self.scalar()))? {
                Value::Bool(false) => continue,
                value => return Ok(Literal::new(value)),
            }
        }
        Ok(Literal::new(false))
    }
}
