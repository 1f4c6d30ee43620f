//! Recursive-descent parser producing an untyped syntax tree.
//!
//! ```text
//! expr  := call | literal | reference
//! call  := IDENT "(" (arg)* ")"
//! arg   := IDENT ":" expr | expr
//! ```
//!
//! Parsing is single pass with one token of lookahead and no backtracking.

use lazy_static::lazy_static;
use regex::Regex;

use super::tokenizer::Token;
use super::{DecodeError, DecodeOptions, Span};
use crate::nodes::NodeType;
use crate::values::Value;

lazy_static! {
    static ref INTEGER: Regex =
        Regex::new(r"^[+-]?[0-9]+$").unwrap_or_else(|err| panic!("invalid pattern: {err}"));
    static ref FLOAT: Regex = Regex::new(r"^[+-]?[0-9]+\.[0-9]+$")
        .unwrap_or_else(|err| panic!("invalid pattern: {err}"));
}

/// A parsed node before translation through a codex.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeType,
    /// Expression name or reference path. Empty for literals.
    pub scalar: String,
    /// Set for literals only.
    pub value: Option<Value>,
    pub children: Vec<SyntaxChild>,
    pub span: Span,
}

/// An argument of an expression. Positional arguments have an empty key.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxChild {
    pub key: String,
    pub node: SyntaxNode,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    index: usize,
    source_len: usize,
    max_depth: usize,
}

/// Parses a whole token stream into a single expression.
pub fn parse(
    tokens: Vec<Token<'_>>,
    source_len: usize,
    options: &DecodeOptions,
) -> Result<SyntaxNode, DecodeError> {
    let mut parser = Parser {
        tokens,
        index: 0,
        source_len,
        max_depth: options.max_depth,
    };
    let root = parser.expression(0)?;
    if let Some(token) = parser.peek() {
        return Err(syntax(
            format!("unexpected '{}' after expression", token.text),
            token.span.clone(),
        ));
    }
    Ok(root)
}

fn syntax(message: impl Into<String>, span: Span) -> DecodeError {
    DecodeError::Syntax {
        message: message.into(),
        span,
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.index)
    }

    fn peek_second(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.index + 1)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn end_span(&self) -> Span {
        Span(self.source_len..self.source_len)
    }

    fn expression(&mut self, depth: usize) -> Result<SyntaxNode, DecodeError> {
        let Some(token) = self.next() else {
            return Err(syntax("unexpected end of input", self.end_span()));
        };
        if depth > self.max_depth {
            return Err(DecodeError::DepthExceeded {
                max_depth: self.max_depth,
                span: token.span,
            });
        }

        match token.text {
            "(" | ")" | ":" => {
                return Err(syntax(format!("unexpected '{}'", token.text), token.span));
            }
            _ => {}
        }

        if self.peek().is_some_and(|next| next.text == "(") {
            if token.is_quoted() {
                return Err(syntax("expression name cannot be a string", token.span));
            }
            return self.call(token, depth);
        }

        leaf(token)
    }

    fn call(&mut self, name: Token<'a>, depth: usize) -> Result<SyntaxNode, DecodeError> {
        // Opening parenthesis.
        self.next();

        let mut children = Vec::new();
        loop {
            let Some(next) = self.peek() else {
                return Err(syntax(
                    format!("missing ')' for '{}'", name.text),
                    Span(name.span.0.start..self.source_len),
                ));
            };
            if next.text == ")" {
                break;
            }

            let key = if self.peek_second().is_some_and(|t| t.text == ":") {
                let key = self.next().map(|t| (t.text, t.span)).unwrap_or_default();
                if key.0.starts_with('"') || key.0 == "(" || key.0 == ")" || key.0 == ":" {
                    return Err(syntax(format!("invalid argument name {}", key.0), key.1));
                }
                self.next();
                key.0.to_string()
            } else {
                String::new()
            };

            let node = self.expression(depth + 1)?;
            children.push(SyntaxChild { key, node });
        }

        let close = self
            .next()
            .map(|t| t.span.0.end)
            .unwrap_or(self.source_len);
        Ok(SyntaxNode {
            kind: NodeType::Expression,
            scalar: name.text.to_string(),
            value: None,
            children,
            span: Span(name.span.0.start..close),
        })
    }
}

fn literal(value: Value, span: Span) -> SyntaxNode {
    SyntaxNode {
        kind: NodeType::Literal,
        scalar: String::new(),
        value: Some(value),
        children: Vec::new(),
        span,
    }
}

fn leaf(token: Token<'_>) -> Result<SyntaxNode, DecodeError> {
    let text = token.text;
    if token.is_quoted() {
        let inner = &text[1..text.len() - 1];
        return unescape(inner)
            .map(|text| literal(Value::Str(text), token.span.clone()))
            .map_err(|message| syntax(message, token.span));
    }
    if INTEGER.is_match(text) {
        return text
            .parse::<i64>()
            .map(|value| literal(Value::I64(value), token.span.clone()))
            .map_err(|_| syntax(format!("integer out of range: {text}"), token.span));
    }
    if FLOAT.is_match(text) {
        return text
            .parse::<f64>()
            .map(|value| literal(Value::F64(value), token.span.clone()))
            .map_err(|_| syntax(format!("invalid float: {text}"), token.span));
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(literal(Value::Bool(true), token.span));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(literal(Value::Bool(false), token.span));
    }
    Ok(SyntaxNode {
        kind: NodeType::Reference,
        scalar: text.to_string(),
        value: None,
        children: Vec::new(),
        span: token.span,
    })
}

/// Reverses the escaping applied by the encoder.
fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let rest = chars.as_str();
                let code = rest
                    .strip_prefix('{')
                    .and_then(|rest| rest.split_once('}'))
                    .and_then(|(hex, _)| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| "invalid unicode escape".to_string())?;
                out.push(code);
                let consumed = rest.find('}').map_or(rest.len(), |i| i + 1);
                chars = rest[consumed..].chars();
            }
            Some(other) => return Err(format!("invalid escape '\\{other}'")),
            None => return Err("dangling escape".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse_text(source: &str) -> Result<SyntaxNode, DecodeError> {
        parse(tokenize(source)?, source.len(), &DecodeOptions::default())
    }

    fn leaf_value(source: &str) -> Option<Value> {
        parse_text(source).unwrap().value
    }

    #[test]
    fn test_literals() {
        assert_eq!(leaf_value("42"), Some(Value::I64(42)));
        assert_eq!(leaf_value("-7"), Some(Value::I64(-7)));
        assert_eq!(leaf_value("+3"), Some(Value::I64(3)));
        assert_eq!(leaf_value("1.25"), Some(Value::F64(1.25)));
        assert_eq!(leaf_value("TRUE"), Some(Value::Bool(true)));
        assert_eq!(leaf_value("False"), Some(Value::Bool(false)));
        assert_eq!(leaf_value(r#""a\"b\n""#), Some(Value::from("a\"b\n")));
        assert_eq!(leaf_value(r#""\u{1f}""#), Some(Value::from("\u{1f}")));
    }

    #[test]
    fn test_bare_tokens_are_references() {
        for source in ["person.age", "1.2.3", "1.", "truthy"] {
            let node = parse_text(source).unwrap();
            assert_eq!(node.kind, NodeType::Reference, "{source}");
            assert_eq!(node.scalar, source);
        }
    }

    #[test]
    fn test_expression_with_keyed_and_positional_children() {
        let node = parse_text("if(condition: x, \"yes\" else: 2)").unwrap();
        assert_eq!(node.kind, NodeType::Expression);
        assert_eq!(node.scalar, "if");
        assert_eq!(node.span, Span(0..31));

        let keys: Vec<_> = node.children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["condition", "", "else"]);
        assert_eq!(node.children[0].node.kind, NodeType::Reference);
        assert_eq!(node.children[1].node.value, Some(Value::from("yes")));
        assert_eq!(node.children[2].node.value, Some(Value::I64(2)));
    }

    #[test]
    fn test_nested_and_empty_expressions() {
        let node = parse_text("or(not(a) now())").unwrap();
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].node.scalar, "not");
        assert_eq!(node.children[1].node.scalar, "now");
        assert!(node.children[1].node.children.is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("", "unexpected end of input"),
            (": x", "unexpected ':'"),
            ("if(: x)", "unexpected ':'"),
            (")", "unexpected ')'"),
            ("if(a", "missing ')' for 'if'"),
            ("a b", "unexpected 'b' after expression"),
            ("a: b", "unexpected ':' after expression"),
            ("if(\"k\": 1)", "invalid argument name \"k\""),
            ("99999999999999999999", "integer out of range: 99999999999999999999"),
            (r#""\q""#, "invalid escape '\\q'"),
        ];
        for (source, expected) in cases {
            match parse_text(source) {
                Err(DecodeError::Syntax { message, .. }) => {
                    assert_eq!(message, expected, "{source}")
                }
                other => panic!("{source}: expected syntax error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_depth_limit() {
        let source = "not(".repeat(4) + "x" + &")".repeat(4);
        let options = DecodeOptions { max_depth: 3 };
        let tokens = tokenize(&source).unwrap();
        assert!(matches!(
            parse(tokens, source.len(), &options),
            Err(DecodeError::DepthExceeded { max_depth: 3, .. })
        ));

        let options = DecodeOptions { max_depth: 4 };
        let tokens = tokenize(&source).unwrap();
        assert!(parse(tokens, source.len(), &options).is_ok());
    }
}
