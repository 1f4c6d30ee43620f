use super::{Callable, Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::{DefinitionReader, Scope};

/// `call("name", args...)`: invokes a host function defined in scope.
///
/// Every argument is evaluated before the function is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub(super) name: String,
    pub(super) args: Vec<Expr>,
}

impl Call {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }
}

impl Node for Call {
    fn scalar(&self) -> &str {
        "call"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        let mut shape = Vec::with_capacity(self.args.len() + 1);
        shape.push(KeyNode::positional(Expr::Literal(Literal::new(
            self.name.as_str(),
        ))));
        shape.extend(self.args.iter().cloned().map(KeyNode::positional));
        shape
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let results: Vec<_> = self.args.iter().map(|arg| scope.compute(arg)).collect();

        let wrapped = || wrap(self.scalar());
        let definition = scope.definition(&self.name).map_err(wrapped())?;
        if definition.value().as_function().is_none() {
            return Err(wrapped()(Error::DefinitionNotCallable {
                key: self.name.clone(),
            }));
        }

        let args = results
            .into_iter()
            .collect::<Result<Vec<_>, Error>>()
            .map_err(wrapped())?;
        definition
            .call(scope.context(), "", args)
            .map(Literal::new)
            .map_err(wrapped())
    }
}
