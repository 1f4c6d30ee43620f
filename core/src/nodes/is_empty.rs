use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::Scope;
use crate::values::Value;

/// `isEmpty(node)`: length check for strings, lists and maps.
#[derive(Debug, Clone, PartialEq)]
pub struct IsEmpty {
    pub(super) node: Expr,
}

impl Node for IsEmpty {
    fn scalar(&self) -> &str {
        "isEmpty"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![KeyNode::positional(self.node.clone())]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let empty = match scope.compute(&self.node).map_err(wrap(self.scalar()))? {
            Value::Str(text) => text.is_empty(),
            Value::List(values) => values.is_empty(),
            Value::Map(map) => map.is_empty(),
            other => {
                return Err(wrap(self.scalar())(Error::NotEmptiable { kind: other.kind() }));
            }
        };
        Ok(Literal::new(empty))
    }
}
