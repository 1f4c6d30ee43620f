//! Core of the gon rule engine: values, scopes, nodes and the rule text
//! format.
//!
//! Rules are trees of [`Expr`] nodes evaluated against a [`Scope`]. Trees are
//! built either with the constructor functions in [`nodes`] or by decoding
//! rule text through a [`Codex`].

pub mod error;
pub mod nodes;
pub mod scope;
pub mod syntax;
pub mod values;

pub use error::{Error, NodeError};
pub use nodes::{Expr, KeyNode, Literal, Node, NodeType};
pub use scope::{Context, DefinitionReader, Scope, ScopeBuilder};
pub use syntax::{
    Codex, DecodeError, DecodeOptions, EncodeError, EncodeOptions, Register, decode, decode_with,
    default_codex, encode, to_string,
};
pub use values::{Function, Kind, Object, Timestamp, Value};

static_assertions::assert_impl_all!(Value: Send, Sync, Clone);
static_assertions::assert_impl_all!(Expr: Send, Sync, Clone);
static_assertions::assert_impl_all!(Scope: Send, Sync, Clone);
static_assertions::assert_impl_all!(Codex: Send, Sync, Clone);
static_assertions::assert_impl_all!(Error: Send, Sync, Clone);

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level.
    /// Call this at the start of tests where you want to see logging output.
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
