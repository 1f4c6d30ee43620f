//! Splits rule text into tokens.
//!
//! `(`, `)` and `:` are single-character tokens. Whitespace and `,` only
//! separate tokens. A quoted string is one token including its quotes, with
//! `\` escaping the next character. `//` outside a string drops the pending
//! token and the rest of the line.

use super::{DecodeError, Span};

/// A slice of the source text with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    pub fn is_quoted(&self) -> bool {
        self.text.starts_with('"')
    }
}

struct Tokenizer<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pending: Option<usize>,
}

impl<'a> Tokenizer<'a> {
    fn push(&mut self, start: usize, end: usize) {
        self.tokens.push(Token {
            text: &self.source[start..end],
            span: Span(start..end),
        });
    }

    fn flush(&mut self, end: usize) {
        if let Some(start) = self.pending.take() {
            self.push(start, end);
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, DecodeError> {
    let mut state = Tokenizer {
        source,
        tokens: Vec::new(),
        pending: None,
    };
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                state.flush(i);
                let mut escaped = false;
                let mut end = None;
                for (j, c) in chars.by_ref() {
                    match c {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        '"' => {
                            end = Some(j + 1);
                            break;
                        }
                        _ => {}
                    }
                }
                let Some(end) = end else {
                    return Err(DecodeError::Syntax {
                        message: "unterminated string".to_string(),
                        span: Span(i..source.len()),
                    });
                };
                state.push(i, end);
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                state.pending = None;
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' | ')' | ':' => {
                state.flush(i);
                state.push(i, i + 1);
            }
            ',' => state.flush(i),
            c if c.is_whitespace() => state.flush(i),
            _ => {
                state.pending.get_or_insert(i);
            }
        }
    }
    state.flush(source.len());

    Ok(state.tokens)
}
