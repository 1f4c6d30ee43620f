//! Errors produced while building scopes, constructing nodes and evaluating them.
//!
//! Evaluation never panics on a well-formed tree. Every failure travels up the
//! tree as an `Err`, and each built-in node that owns the failing child wraps it
//! in a [`NodeError`] carrying its own scalar. The result is a single message
//! that traces where the failure happened, e.g.
//! `if.gte: definition not found: person.age`.

use core::fmt;

use thiserror::Error;

use crate::values::{Kind, Value};

/// Error type for every engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A reference or call target does not exist in any reachable scope.
    #[error("definition not found: {key}")]
    DefinitionNotFound { key: String },

    /// A call target resolved, but it is not a function.
    #[error("definition not callable: {key}")]
    DefinitionNotCallable { key: String },

    /// A definition key failed the naming rule while building a scope.
    #[error("invalid definition key: {key}")]
    InvalidDefinitionKey { key: String },

    /// The same key was defined twice while building a scope.
    #[error("definition already exists: {key}")]
    DuplicateDefinition { key: String },

    /// Two operands have mismatched or unsupported kinds.
    #[error("incompatible pair: {first} ({}) and {second} ({})", .first.kind(), .second.kind())]
    IncompatiblePair { first: Value, second: Value },

    /// A variadic node was built without children.
    #[error("must have at least one argument")]
    MissingArguments,

    #[error("only one else branch can be set")]
    ExtraElseBranch,

    /// A required named argument was not supplied to a node constructor.
    #[error("missing argument '{name}'")]
    MissingArgument { name: String },

    /// Aggregated values do not share a single numeric kind.
    #[error("all nodes must evaluate to the same numeric kind")]
    KindMismatch,

    #[error("expected {expected} got {got}")]
    UnexpectedKind { expected: Kind, got: Kind },

    #[error("cannot calculate emptiness for {kind}")]
    NotEmptiable { kind: Kind },

    /// A host function received the wrong number of arguments.
    #[error("expected {expected} args, got {got}")]
    Arity { expected: usize, got: usize },

    /// A host function argument is not assignable to the declared parameter.
    #[error("argument mismatch for function, arg {index} expected {expected}, got {got}")]
    ArgumentMismatch {
        index: usize,
        expected: Kind,
        got: Kind,
    },

    /// A codex already holds a constructor for this scalar.
    #[error("node with name '{name}' already registered")]
    DuplicateNode { name: String },

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A child failure wrapped with the scalar of the node that owns it.
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Create an error from a free-form message.
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// Returns the innermost error, skipping every [`NodeError`] wrapper.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Node(node_error) = current {
            current = &node_error.cause;
        }
        current
    }

    /// The chain of node scalars this error travelled through, outermost first.
    pub fn node_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Node(node_error) = current {
            path.push(node_error.scalar.as_str());
            current = &node_error.cause;
        }
        path
    }
}

/// A child failure prefixed with the scalar of the node that owns the child.
///
/// Nested node errors are joined with `.`, the innermost cause with `: `.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeError {
    pub scalar: String,
    pub cause: Box<Error>,
}

impl NodeError {
    pub fn new(scalar: impl Into<String>, cause: Error) -> Self {
        Self {
            scalar: scalar.into(),
            cause: Box::new(cause),
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause.as_ref() {
            Error::Node(inner) => write!(f, "{}.{}", self.scalar, inner),
            cause => write!(f, "{}: {}", self.scalar, cause),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Returns a closure wrapping an error with the given node scalar.
///
/// Meant for `map_err` on child evaluations.
pub(crate) fn wrap(scalar: &str) -> impl FnOnce(Error) -> Error + '_ {
    move |cause| Error::Node(NodeError::new(scalar, cause))
}
