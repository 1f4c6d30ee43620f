//! gon - An embeddable rule engine
//!
//! # Overview
//!
//! gon evaluates small expression trees ("rules") against data supplied by a
//! host application. Common use cases include:
//!
//! - Eligibility and validation checks
//! - Feature flags and conditional logic
//! - Business rules kept outside the application code
//!
//! Rules can be built in Rust with the constructors in [`nodes`] or written
//! as text and decoded through a [`Codex`].
//!
//! # Quick Start
//!
//! ```
//! use gon::{Scope, Value, decode, default_codex};
//!
//! let rule = decode(
//!     r#"if(gte(person.age, 18), "pass", "fail")"#,
//!     &default_codex(),
//! ).unwrap();
//!
//! let person = std::collections::BTreeMap::from([("age".to_string(), Value::I64(21))]);
//! let scope = Scope::builder().definition("person", person).build().unwrap();
//!
//! assert_eq!(scope.compute(&rule).unwrap(), Value::from("pass"));
//! ```
//!
//! # Host functions
//!
//! Plain Rust closures become callable definitions:
//!
//! ```
//! use gon::{Function, Scope, Value, nodes::{call, literal}};
//!
//! let add = Function::new(|a: i64, b: i64| a + b);
//! let scope = Scope::builder().definition("add", add).build().unwrap();
//!
//! let rule = call("add", vec![literal(40_i64), literal(2_i64)]);
//! assert_eq!(scope.compute(&rule).unwrap(), Value::I64(42));
//! ```

// Error rendering utilities
pub mod error_renderer;
pub use error_renderer::{CharSet, RenderConfig, render_error, render_error_to};

pub use gon_core::{
    Codex, Context, DecodeError, DecodeOptions, DefinitionReader, EncodeError, EncodeOptions,
    Error, Expr, Function, KeyNode, Kind, Literal, Node, NodeError, NodeType, Object, Register,
    Scope, ScopeBuilder, Timestamp, Value, decode, decode_with, default_codex, encode, object,
    to_string,
};
pub use gon_core::{nodes, scope, syntax, values};
