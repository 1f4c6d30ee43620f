use std::sync::Arc;

use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::Scope;
use crate::values::{Value, avg_any, sum_any};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Sum,
    Avg,
}

impl AggregateKind {
    pub fn scalar(self) -> &'static str {
        match self {
            AggregateKind::Sum => "sum",
            AggregateKind::Avg => "avg",
        }
    }
}

/// `sum(...)` / `avg(...)` over children of one numeric kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    kind: AggregateKind,
    nodes: Vec<Expr>,
}

impl Aggregate {
    pub fn build(kind: AggregateKind, nodes: Vec<Expr>) -> Expr {
        if nodes.is_empty() {
            return Expr::invalid(kind.scalar(), Error::MissingArguments);
        }
        Expr::Aggregate(Arc::new(Aggregate { kind, nodes }))
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }
}

impl Node for Aggregate {
    fn scalar(&self) -> &str {
        self.kind.scalar()
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        self.nodes.iter().cloned().map(KeyNode::positional).collect()
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let values = self
            .nodes
            .iter()
            .map(|node| scope.compute(node))
            .collect::<Result<Vec<Value>, Error>>()
            .map_err(wrap(self.scalar()))?;

        let result = match self.kind {
            AggregateKind::Sum => sum_any(&values),
            AggregateKind::Avg => avg_any(&values),
        };
        result
            .map(Literal::new)
            .ok_or_else(|| wrap(self.scalar())(Error::KindMismatch))
    }
}
