use super::{Expr, KeyNode, Node, NodeType};
use crate::error::Error;
use crate::scope::{Context, DefinitionReader, Scope};
use crate::values::{Value, format_time};

/// A node wrapping a host value.
///
/// A literal holding a function without positional parameters is lazy:
/// evaluating it invokes the function and yields its result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Literal {
    value: Value,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn is_lazy(&self) -> bool {
        self.value.as_function().is_some_and(|f| f.is_lazy())
    }

    /// Walks a dotted path through records and maps.
    ///
    /// Stops at the first segment that is missing or nil.
    pub fn lookup(&self, path: &str) -> Option<Literal> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.value.attribute(first)?;
        for segment in segments {
            current = current.attribute(segment)?;
        }
        Some(Literal::new(current))
    }

    /// Calls the function found at `path`, or this literal's own function
    /// when `path` is empty.
    pub fn invoke(&self, ctx: &Context, path: &str, args: Vec<Value>) -> Result<Value, Error> {
        let target = if path.is_empty() {
            self.clone()
        } else {
            self.definition(path)?
        };
        match target.value() {
            Value::Function(function) => function.call(ctx, args),
            _ => Err(Error::DefinitionNotCallable {
                key: path.to_string(),
            }),
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        literal.value
    }
}

impl DefinitionReader for Literal {
    fn definition(&self, key: &str) -> Result<Literal, Error> {
        self.lookup(key).ok_or_else(|| Error::DefinitionNotFound {
            key: key.to_string(),
        })
    }
}

/// Values that can be invoked by a `call` node.
pub trait Callable {
    fn call(&self, ctx: &Context, key: &str, args: Vec<Value>) -> Result<Value, Error>;
}

impl Callable for Literal {
    fn call(&self, ctx: &Context, key: &str, args: Vec<Value>) -> Result<Value, Error> {
        self.invoke(ctx, key, args)
    }
}

impl Node for Literal {
    fn scalar(&self) -> &str {
        match self.value {
            Value::Time(_) => "time",
            _ => "literal",
        }
    }

    fn node_type(&self) -> NodeType {
        match self.value {
            Value::Time(_) => NodeType::Expression,
            _ => NodeType::Literal,
        }
    }

    fn shape(&self) -> Vec<KeyNode> {
        match &self.value {
            Value::Time(time) => vec![KeyNode::positional(Expr::Literal(Literal::new(
                format_time(time),
            )))],
            _ => Vec::new(),
        }
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        match &self.value {
            Value::Function(function) if function.is_lazy() => {
                function.call(scope.context(), Vec::new()).map(Literal::new)
            }
            _ => Ok(self.clone()),
        }
    }
}
