//! Evaluation scopes.
//!
//! A [`Scope`] couples a [`Context`] with a read-only set of [`Definitions`]
//! and an optional parent. Scopes are assembled once through a
//! [`ScopeBuilder`] and never mutated afterwards, so a child scope can extend
//! a parent without affecting anyone else holding the parent.
//!
//! ```ignore
//! let base = Scope::builder().definition("limit", 18_i64).build()?;
//! let scope = base.child().definition("age", 21_i64).build()?;
//! let passed = scope.compute(&greater_or_equal(reference("age"), reference("limit")))?;
//! ```

mod context;
mod definitions;

use std::sync::Arc;

pub use context::Context;
pub use definitions::{DefinitionReader, DefinitionWriter, Definitions, is_valid_key};

use crate::error::Error;
use crate::nodes::{Literal, Node};
use crate::values::Value;

/// Name resolution plus the active context.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    context: Context,
    definitions: Arc<Definitions>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// An empty scope with a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ScopeBuilder {
        ScopeBuilder::default()
    }

    /// Start a scope that falls back to this one for unknown names and
    /// inherits its context.
    pub fn child(&self) -> ScopeBuilder {
        ScopeBuilder::default()
            .context(self.context.clone())
            .parent(self.clone())
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }

    /// Evaluates `node` and unwraps the resulting literal into its raw value.
    pub fn compute<N: Node + ?Sized>(&self, node: &N) -> Result<Value, Error> {
        tracing::trace!(scalar = node.scalar(), "compute");
        node.eval(self).map(Literal::into_value)
    }

    /// Whether `key` resolves in this scope or any ancestor.
    pub fn exists(&self, key: &str) -> bool {
        self.definition(key).is_ok()
    }
}

impl DefinitionReader for Scope {
    /// Local definitions win. The parent is consulted only when the first
    /// segment of `key` is not defined locally.
    fn definition(&self, key: &str) -> Result<Literal, Error> {
        match (&self.parent, self.definitions.contains(key)) {
            (Some(parent), false) => parent.definition(key),
            _ => self.definitions.definition(key),
        }
    }
}

/// Fluent, all-or-nothing construction of a [`Scope`].
#[derive(Debug, Default)]
pub struct ScopeBuilder {
    context: Option<Context>,
    entries: Vec<(String, Literal)>,
    parent: Option<Scope>,
}

impl ScopeBuilder {
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn definition(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), Literal::new(value)));
        self
    }

    pub fn definitions<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), Literal::new(v))));
        self
    }

    pub fn parent(mut self, parent: Scope) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Validates every key and assembles the scope. The first invalid or
    /// duplicated key aborts the build.
    pub fn build(self) -> Result<Scope, Error> {
        let mut definitions = Definitions::new();
        for (key, value) in self.entries {
            definitions.define(&key, value)?;
        }
        Ok(Scope {
            context: self.context.unwrap_or_default(),
            definitions: Arc::new(definitions),
            parent: self.parent.map(Arc::new),
        })
    }
}
