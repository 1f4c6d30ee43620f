//! The rule text format.
//!
//! Text goes through [`tokenize`], [`parse`] and a [`Codex`] to become an
//! [`Expr`]; [`encode`] goes the other way. The codex is the only place that
//! knows which expression names exist, so hosts can extend the language by
//! registering constructors on their own copy of [`default_codex`].
//!
//! ```ignore
//! let codex = default_codex();
//! let rule = decode(r#"if(gte(person.age, 18), "pass", "fail")"#, &codex)?;
//! assert_eq!(to_string(&rule, &EncodeOptions::default().compact())?,
//!            r#"if(condition: gte(first: person.age,second: 18),then: "pass",else: "fail")"#);
//! ```

mod codex;
mod encoder;
mod parser;
mod tokenizer;

use core::ops::Range;

use thiserror::Error;

pub use codex::{Codex, Constructor, Register, default_codex, sort_args};
pub use encoder::{EncodeError, EncodeOptions, encode, to_string};
pub use parser::{SyntaxChild, SyntaxNode, parse};
pub use tokenizer::{Token, tokenize};

use crate::error::Error;
use crate::nodes::Expr;


/// Byte range in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

/// Limits applied while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of expressions.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Failure to turn text into an [`Expr`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("syntax error: {message}")]
    Syntax { message: String, span: Span },

    #[error("unknown node '{scalar}'")]
    UnknownNode { scalar: String, span: Span },

    #[error("invalid '{scalar}' node: {cause}")]
    Translate {
        scalar: String,
        cause: Error,
        span: Span,
    },

    #[error("expressions nested deeper than {max_depth} levels")]
    DepthExceeded { max_depth: usize, span: Span },
}

impl DecodeError {
    pub fn span(&self) -> &Span {
        match self {
            DecodeError::Syntax { span, .. }
            | DecodeError::UnknownNode { span, .. }
            | DecodeError::Translate { span, .. }
            | DecodeError::DepthExceeded { span, .. } => span,
        }
    }

    /// Stable identifier shown by error renderers.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::Syntax { .. } => "D001",
            DecodeError::UnknownNode { .. } => "D002",
            DecodeError::Translate { .. } => "D003",
            DecodeError::DepthExceeded { .. } => "D004",
        }
    }

    /// Short text for the label under the offending span.
    pub fn label(&self) -> String {
        match self {
            DecodeError::Syntax { message, .. } => message.clone(),
            DecodeError::UnknownNode { .. } => "not registered in the codex".to_string(),
            DecodeError::Translate { cause, .. } => cause.to_string(),
            DecodeError::DepthExceeded { .. } => "nesting limit reached here".to_string(),
        }
    }
}

/// Decodes rule text with default options.
pub fn decode(source: &str, codex: &Codex) -> Result<Expr, DecodeError> {
    decode_with(source, codex, &DecodeOptions::default())
}

pub fn decode_with(
    source: &str,
    codex: &Codex,
    options: &DecodeOptions,
) -> Result<Expr, DecodeError> {
    let tokens = tokenize(source)?;
    let root = parse(tokens, source.len(), options)?;
    codex.translate(&root)
}
