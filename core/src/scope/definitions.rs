//! Named definitions backing a scope.

use hashbrown::HashMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;
use crate::nodes::Literal;

lazy_static! {
    static ref KEY_PATTERN: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{1,50}$")
        .unwrap_or_else(|err| panic!("invalid key pattern: {err}"));
}

/// Whether `key` is a valid top-level definition name.
pub fn is_valid_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

/// Resolves dotted keys into literals.
pub trait DefinitionReader {
    fn definition(&self, key: &str) -> Result<Literal, Error>;
}

/// Accepts new definitions. Only used while a scope is being built.
pub trait DefinitionWriter {
    fn define(&mut self, key: &str, value: Literal) -> Result<(), Error>;
}

/// A flat store of top-level definitions.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    store: HashMap<String, Literal>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the first segment of `key` is defined here.
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(top_segment(key))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys().map(String::as_str)
    }
}

fn top_segment(key: &str) -> &str {
    key.split_once('.').map_or(key, |(top, _)| top)
}

impl DefinitionReader for Definitions {
    /// Resolves the first segment locally, then descends into the found
    /// literal. Failures always report the full key.
    fn definition(&self, key: &str) -> Result<Literal, Error> {
        let not_found = || Error::DefinitionNotFound {
            key: key.to_string(),
        };
        let (top, rest) = match key.split_once('.') {
            Some((top, rest)) => (top, Some(rest)),
            None => (key, None),
        };
        let literal = self.store.get(top).ok_or_else(not_found)?;
        match rest {
            None => Ok(literal.clone()),
            Some(rest) => literal.lookup(rest).ok_or_else(not_found),
        }
    }
}

impl DefinitionWriter for Definitions {
    fn define(&mut self, key: &str, value: Literal) -> Result<(), Error> {
        if !is_valid_key(key) {
            return Err(Error::InvalidDefinitionKey {
                key: key.to_string(),
            });
        }
        if self.store.contains_key(key) {
            return Err(Error::DuplicateDefinition {
                key: key.to_string(),
            });
        }
        self.store.insert(key.to_string(), value);
        Ok(())
    }
}
