//! Registry of expression constructors and the syntax tree translator.

use core::fmt;
use std::iter;
use std::sync::Arc;

use chrono::DateTime;
use hashbrown::HashMap;
use lazy_static::lazy_static;

use super::{DecodeError, SyntaxNode};
use crate::error::Error;
use crate::nodes::{
    AffixKind, AggregateKind, Comparison, Expr, KeyNode, Literal, NodeType, Reference,
};
use crate::nodes::{Aggregate, Compare, If, Or};
use crate::values::{Kind, Value};

/// Builds a node from its already translated children.
pub type Constructor = Arc<dyn Fn(Vec<KeyNode>) -> Result<Expr, Error> + Send + Sync>;

/// Host node types that know how to add themselves to a codex.
pub trait Register {
    fn register(codex: &mut Codex) -> Result<(), Error>;
}

/// Maps expression names to constructors.
///
/// Clone the default codex before registering custom nodes so the shared
/// built-in table is never mutated.
#[derive(Clone, Default)]
pub struct Codex {
    constructors: HashMap<String, Constructor>,
}

impl fmt::Debug for Codex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("Codex").field("constructors", &names).finish()
    }
}

impl Codex {
    /// An empty codex. Most hosts want [`default_codex`] instead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constructor for `scalar`, rejecting names already taken.
    pub fn register<F>(&mut self, scalar: impl Into<String>, constructor: F) -> Result<(), Error>
    where
        F: Fn(Vec<KeyNode>) -> Result<Expr, Error> + Send + Sync + 'static,
    {
        let scalar = scalar.into();
        if self.constructors.contains_key(&scalar) {
            return Err(Error::DuplicateNode { name: scalar });
        }
        tracing::debug!(scalar = %scalar, "registering node");
        self.constructors.insert(scalar, Arc::new(constructor));
        Ok(())
    }

    pub fn register_node<T: Register>(&mut self) -> Result<(), Error> {
        T::register(self)
    }

    pub fn contains(&self, scalar: &str) -> bool {
        self.constructors.contains_key(scalar)
    }

    pub fn get(&self, scalar: &str) -> Option<&Constructor> {
        self.constructors.get(scalar)
    }

    /// Translates a syntax tree depth-first: children first, then the parent.
    pub fn translate(&self, node: &SyntaxNode) -> Result<Expr, DecodeError> {
        match node.kind {
            NodeType::Reference => return Ok(Expr::Reference(Reference::new(&node.scalar))),
            NodeType::Literal => {
                let value = node.value.clone().unwrap_or_default();
                return Ok(Expr::Literal(Literal::new(value)));
            }
            NodeType::Expression => {}
        }

        let Some(constructor) = self.constructors.get(&node.scalar) else {
            tracing::debug!(scalar = %node.scalar, "unknown node");
            return Err(DecodeError::UnknownNode {
                scalar: node.scalar.clone(),
                span: node.span.clone(),
            });
        };

        let children = node
            .children
            .iter()
            .map(|child| Ok(KeyNode::new(&child.key, self.translate(&child.node)?)))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let failed = |cause: Error| {
            tracing::debug!(scalar = %node.scalar, error = %cause, "translation failed");
            DecodeError::Translate {
                scalar: node.scalar.clone(),
                cause,
                span: node.span.clone(),
            }
        };
        match constructor(children) {
            Ok(Expr::Invalid(err)) => Err(failed(*err.cause)),
            Ok(expr) => Ok(expr),
            Err(cause) => Err(failed(cause)),
        }
    }
}

/// Matches children against expected parameter names.
///
/// A keyed child fills the parameter with the same name; a positional child
/// fills the next unfilled parameter. Children that fill nothing are returned
/// as the remainder, in order. Returns the filled parameters in the order of
/// `keys`, or [`Error::MissingArgument`] for the first one left unfilled.
pub fn sort_args(args: Vec<KeyNode>, keys: &[&str]) -> Result<(Vec<Expr>, Vec<Expr>), Error> {
    let mut slots: Vec<Option<Expr>> = iter::repeat_with(|| None).take(keys.len()).collect();
    let mut rest = Vec::new();

    for arg in args {
        let slot = keys
            .iter()
            .zip(&slots)
            .position(|(key, slot)| slot.is_none() && (arg.key.is_empty() || arg.key == *key));
        match slot {
            Some(index) => slots[index] = Some(arg.node),
            None => rest.push(arg.node),
        }
    }

    let named = slots
        .into_iter()
        .zip(keys)
        .map(|(slot, key)| {
            slot.ok_or_else(|| Error::MissingArgument {
                name: key.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((named, rest))
}

fn exactly<const N: usize>(args: Vec<KeyNode>, keys: [&str; N]) -> Result<[Expr; N], Error> {
    let got = args.len();
    let (named, rest) = sort_args(args, &keys)?;
    if !rest.is_empty() {
        return Err(Error::Arity { expected: N, got });
    }
    named
        .try_into()
        .map_err(|_| Error::Arity { expected: N, got })
}

/// The string held by a literal argument, e.g. the name in `call("fn")`.
fn string_literal(node: &Expr, name: &str) -> Result<String, Error> {
    match node.value() {
        Some(Value::Str(text)) => Ok(text.clone()),
        Some(other) => Err(Error::UnexpectedKind {
            expected: Kind::Str,
            got: other.kind(),
        }),
        None => Err(Error::custom(format!(
            "'{name}' must be a string literal, got '{}'",
            crate::nodes::Node::scalar(node)
        ))),
    }
}

fn parse_bool(text: &str) -> Result<bool, Error> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(Error::custom(format!("invalid boolean: {text}"))),
    }
}

fn constructor<F>(f: F) -> Constructor
where
    F: Fn(Vec<KeyNode>) -> Result<Expr, Error> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn builtin(codex: &mut Codex, names: &[&str], constructor: Constructor) {
    for name in names {
        codex
            .constructors
            .insert(name.to_string(), constructor.clone());
    }
}

fn comparison(comparison: Comparison) -> Constructor {
    constructor(move |args| {
        let [first, second] = exactly(args, ["first", "second"])?;
        Ok(Compare::build(comparison, first, second))
    })
}

fn aggregate(kind: AggregateKind) -> Constructor {
    constructor(move |args| {
        let (_, rest) = sort_args(args, &[])?;
        Ok(Aggregate::build(kind, rest))
    })
}

fn affix(kind: AffixKind) -> Constructor {
    constructor(move |args| {
        let [text, affix] = exactly(args, ["text", kind.key()])?;
        Ok(match kind {
            AffixKind::Prefix => crate::nodes::has_prefix(text, affix),
            AffixKind::Suffix => crate::nodes::has_suffix(text, affix),
        })
    })
}

fn build_default() -> Codex {
    let mut codex = Codex::new();

    builtin(
        &mut codex,
        &["if"],
        constructor(|args| {
            let (named, rest) = sort_args(args, &["condition", "then"])?;
            let mut named = named.into_iter();
            match (named.next(), named.next()) {
                (Some(condition), Some(then)) => Ok(If::build(condition, then, rest)),
                _ => Err(Error::MissingArgument {
                    name: "condition".to_string(),
                }),
            }
        }),
    );
    builtin(&mut codex, &["equal"], comparison(Comparison::Equal));
    builtin(&mut codex, &["gt", "greater"], comparison(Comparison::Greater));
    builtin(
        &mut codex,
        &["gte", "greaterOrEqual"],
        comparison(Comparison::GreaterOrEqual),
    );
    builtin(&mut codex, &["lt", "smaller"], comparison(Comparison::Smaller));
    builtin(
        &mut codex,
        &["lte", "smallerOrEqual"],
        comparison(Comparison::SmallerOrEqual),
    );
    builtin(
        &mut codex,
        &["not"],
        constructor(|args| {
            let [expression] = exactly(args, ["expression"])?;
            Ok(crate::nodes::not(expression))
        }),
    );
    builtin(
        &mut codex,
        &["or"],
        constructor(|args| {
            let (_, rest) = sort_args(args, &[])?;
            Ok(Or::build(rest))
        }),
    );
    builtin(&mut codex, &["sum"], aggregate(AggregateKind::Sum));
    builtin(&mut codex, &["avg"], aggregate(AggregateKind::Avg));
    builtin(&mut codex, &["hasPrefix"], affix(AffixKind::Prefix));
    builtin(&mut codex, &["hasSuffix"], affix(AffixKind::Suffix));
    builtin(
        &mut codex,
        &["call"],
        constructor(|args| {
            let mut args = args.into_iter().map(|arg| arg.node);
            let name = args.next().ok_or_else(|| Error::MissingArgument {
                name: "name".to_string(),
            })?;
            let name = string_literal(&name, "name")?;
            Ok(crate::nodes::call(name, args.collect()))
        }),
    );
    builtin(
        &mut codex,
        &["exists"],
        constructor(|args| {
            let [path] = exactly(args, ["definition"])?;
            Ok(crate::nodes::exists(string_literal(&path, "definition")?))
        }),
    );
    builtin(
        &mut codex,
        &["coalesce"],
        constructor(|args| {
            let [path, fallback] = exactly(args, ["definition", "fallback"])?;
            let path = string_literal(&path, "definition")?;
            Ok(crate::nodes::coalesce(path, fallback))
        }),
    );
    builtin(
        &mut codex,
        &["isEmpty"],
        constructor(|args| {
            let [node] = exactly(args, ["node"])?;
            Ok(crate::nodes::is_empty(node))
        }),
    );
    builtin(
        &mut codex,
        &["time"],
        constructor(|args| {
            let [text] = exactly(args, ["value"])?;
            let text = string_literal(&text, "value")?;
            let time = DateTime::parse_from_rfc3339(&text)
                .map_err(|err| Error::custom(format!("time is invalid: {err}")))?;
            Ok(crate::nodes::time(time))
        }),
    );
    builtin(
        &mut codex,
        &["bool"],
        constructor(|args| {
            let [text] = exactly(args, ["value"])?;
            let value = parse_bool(&string_literal(&text, "value")?)?;
            Ok(crate::nodes::literal(value))
        }),
    );
    builtin(
        &mut codex,
        &["literal"],
        constructor(|args| {
            let [value] = exactly(args, ["value"])?;
            match value {
                Expr::Literal(_) => Ok(value),
                other => Err(Error::custom(format!(
                    "'literal' expects a literal value, got '{}'",
                    crate::nodes::Node::scalar(&other)
                ))),
            }
        }),
    );

    codex
}

lazy_static! {
    static ref DEFAULT_CODEX: Codex = build_default();
}

/// A codex with every built-in node registered, including the aliases
/// `greater`, `greaterOrEqual`, `smaller` and `smallerOrEqual`.
pub fn default_codex() -> Codex {
    DEFAULT_CODEX.clone()
}
