use core::cmp::Ordering;
use std::sync::Arc;

use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::Scope;
use crate::values::cmp_any;

/// The relation a [`Compare`] node tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    Greater,
    GreaterOrEqual,
    Smaller,
    SmallerOrEqual,
}

impl Comparison {
    pub fn scalar(self) -> &'static str {
        match self {
            Comparison::Equal => "equal",
            Comparison::Greater => "gt",
            Comparison::GreaterOrEqual => "gte",
            Comparison::Smaller => "lt",
            Comparison::SmallerOrEqual => "lte",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equal => ordering.is_eq(),
            Comparison::Greater => ordering.is_gt(),
            Comparison::GreaterOrEqual => ordering.is_ge(),
            Comparison::Smaller => ordering.is_lt(),
            Comparison::SmallerOrEqual => ordering.is_le(),
        }
    }
}

/// A binary comparison over same-kind operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    comparison: Comparison,
    first: Expr,
    second: Expr,
}

impl Compare {
    pub fn build(comparison: Comparison, first: Expr, second: Expr) -> Expr {
        Expr::Compare(Arc::new(Compare {
            comparison,
            first,
            second,
        }))
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl Node for Compare {
    fn scalar(&self) -> &str {
        self.comparison.scalar()
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![
            KeyNode::new("first", self.first.clone()),
            KeyNode::new("second", self.second.clone()),
        ]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let first = scope.compute(&self.first).map_err(wrap(self.scalar()))?;
        let second = scope.compute(&self.second).map_err(wrap(self.scalar()))?;
        match cmp_any(&first, &second) {
            Some(ordering) => Ok(Literal::new(self.comparison.holds(ordering))),
            None => Err(wrap(self.scalar())(Error::IncompatiblePair { first, second })),
        }
    }
}
