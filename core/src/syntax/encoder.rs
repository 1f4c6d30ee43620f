//! Renders node trees back into rule text.

use std::io;

use thiserror::Error;

use crate::error::NodeError;
use crate::nodes::{Expr, Node, NodeType};
use crate::values::{Kind, Value};

/// Output style of the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Single line, no indentation.
    pub compact: bool,
    /// Emit `key: ` before named arguments.
    pub show_names: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compact: false,
            show_names: true,
        }
    }
}

impl EncodeOptions {
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.show_names = false;
        self
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode invalid node: {0}")]
    InvalidNode(NodeError),

    #[error("cannot encode {kind} literal")]
    UnsupportedValue { kind: Kind },

    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),

    #[error("literal node '{scalar}' has no value")]
    MissingValue { scalar: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Encodes `node` into a string.
pub fn to_string(node: &Expr, options: &EncodeOptions) -> Result<String, EncodeError> {
    let mut encoder = Encoder {
        out: String::new(),
        options,
    };
    encoder.node(node, 0)?;
    Ok(encoder.out)
}

/// Encodes `node` into `writer`. Nothing is written if encoding fails.
pub fn encode(
    writer: &mut impl io::Write,
    node: &Expr,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    let text = to_string(node, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

struct Encoder<'o> {
    out: String,
    options: &'o EncodeOptions,
}

impl Encoder<'_> {
    fn line_break(&mut self, indent: usize) {
        if self.options.compact {
            return;
        }
        self.out.push('\n');
        for _ in 0..indent {
            self.out.push('\t');
        }
    }

    fn node(&mut self, node: &Expr, indent: usize) -> Result<(), EncodeError> {
        if let Expr::Invalid(err) = node {
            return Err(EncodeError::InvalidNode(err.clone()));
        }
        match node.node_type() {
            NodeType::Expression => self.expression(node, indent),
            NodeType::Reference => {
                self.out.push_str(node.scalar());
                Ok(())
            }
            NodeType::Literal => match node.value() {
                Some(value) => self.value(value),
                None => Err(EncodeError::MissingValue {
                    scalar: node.scalar().to_string(),
                }),
            },
        }
    }

    /// One child stays inline; several go on their own indented lines.
    fn expression(&mut self, node: &Expr, indent: usize) -> Result<(), EncodeError> {
        let shape = node.shape();
        let len = shape.len();

        self.out.push_str(node.scalar());
        self.out.push('(');
        for (i, child) in shape.iter().enumerate() {
            if i > 0 || len != 1 {
                self.line_break(indent + 1);
            }
            if self.options.show_names && !child.key.is_empty() {
                self.out.push_str(&child.key);
                self.out.push_str(": ");
            }
            self.node(&child.node, indent + 1)?;
            if i + 1 < len {
                self.out.push(',');
            }
        }
        if len > 1 {
            self.line_break(indent);
        }
        self.out.push(')');
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<(), EncodeError> {
        use core::fmt::Write;

        let out = &mut self.out;
        // Writing into a String cannot fail.
        let _ = match value {
            Value::Str(text) => {
                quote(out, text);
                Ok(())
            }
            Value::Bool(value) => write!(out, "{value}"),
            Value::I8(value) => write!(out, "{value}"),
            Value::I16(value) => write!(out, "{value}"),
            Value::I32(value) => write!(out, "{value}"),
            Value::I64(value) => write!(out, "{value}"),
            Value::U8(value) => write!(out, "{value}"),
            Value::U16(value) => write!(out, "{value}"),
            Value::U32(value) => write!(out, "{value}"),
            Value::U64(value) => write!(out, "{value}"),
            Value::F32(value) => return float(out, f64::from(*value), value.to_string()),
            Value::F64(value) => return float(out, *value, value.to_string()),
            other => return Err(EncodeError::UnsupportedValue { kind: other.kind() }),
        };
        Ok(())
    }
}

/// Floats always carry a decimal point so they decode as floats again.
fn float(out: &mut String, value: f64, text: String) -> Result<(), EncodeError> {
    if !value.is_finite() {
        return Err(EncodeError::NonFiniteFloat(value));
    }
    out.push_str(&text);
    if !text.contains('.') {
        out.push_str(".0");
    }
    Ok(())
}

fn quote(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
