use super::{Expr, KeyNode, Literal, Node, NodeType};
use crate::error::{Error, wrap};
use crate::scope::Scope;
use crate::values::{Kind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

impl AffixKind {
    pub fn scalar(self) -> &'static str {
        match self {
            AffixKind::Prefix => "hasPrefix",
            AffixKind::Suffix => "hasSuffix",
        }
    }

    /// The shape key of the second operand.
    pub fn key(self) -> &'static str {
        match self {
            AffixKind::Prefix => "prefix",
            AffixKind::Suffix => "suffix",
        }
    }
}

/// `hasPrefix(text, prefix)` / `hasSuffix(text, suffix)` over strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Affix {
    pub(super) kind: AffixKind,
    pub(super) text: Expr,
    pub(super) affix: Expr,
}

impl Affix {
    pub fn kind(&self) -> AffixKind {
        self.kind
    }
}

fn expect_str(value: Value) -> Result<String, Error> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(Error::UnexpectedKind {
            expected: Kind::Str,
            got: other.kind(),
        }),
    }
}

impl Node for Affix {
    fn scalar(&self) -> &str {
        self.kind.scalar()
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![
            KeyNode::new("text", self.text.clone()),
            KeyNode::new(self.kind.key(), self.affix.clone()),
        ]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        let text = scope.compute(&self.text).and_then(expect_str);
        let affix = scope.compute(&self.affix).and_then(expect_str);
        let (text, affix) = text
            .and_then(|text| affix.map(|affix| (text, affix)))
            .map_err(wrap(self.scalar()))?;

        Ok(Literal::new(match self.kind {
            AffixKind::Prefix => text.starts_with(&affix),
            AffixKind::Suffix => text.ends_with(&affix),
        }))
    }
}
