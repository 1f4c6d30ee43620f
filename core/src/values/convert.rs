//! Typed conversions between [`Value`] and Rust types.
//!
//! [`FromValue`] drives host function parameters: each parameter type declares
//! the [`Kind`] it accepts so arity and kind checks happen before the closure
//! runs. [`IntoReturn`] turns closure results back into values.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Function, Kind, Object, Timestamp, Value};
use crate::error::Error;

/// Extract a Rust value out of a [`Value`] of the matching kind.
pub trait FromValue: Sized {
    /// The kind a host function parameter of this type declares.
    const KIND: Kind;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const KIND: Kind = Kind::$variant;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Timestamp => Time,
    Vec<Value> => List,
    BTreeMap<String, Value> => Map,
    Arc<dyn Object> => Object,
    Function => Function,
}

impl FromValue for Value {
    const KIND: Kind = Kind::Any;

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

/// Convert a host function result into a value, propagating host errors.
pub trait IntoReturn {
    fn into_return(self) -> Result<Value, Error>;
}

macro_rules! impl_into_return {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReturn for $ty {
                fn into_return(self) -> Result<Value, Error> {
                    Ok(Value::from(self))
                }
            }
        )*
    };
}

impl_into_return! {
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &'static str,
    Timestamp,
    Function,
}

impl IntoReturn for Value {
    fn into_return(self) -> Result<Value, Error> {
        Ok(self)
    }
}

impl<T: Into<Value>> IntoReturn for Option<T> {
    fn into_return(self) -> Result<Value, Error> {
        Ok(Value::from(self))
    }
}

impl<T: Into<Value>> IntoReturn for Vec<T> {
    fn into_return(self) -> Result<Value, Error> {
        Ok(Value::from(self))
    }
}

impl<A: Into<Value>, B: Into<Value>> IntoReturn for (A, B) {
    fn into_return(self) -> Result<Value, Error> {
        Ok(Value::from(self))
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> IntoReturn for (A, B, C) {
    fn into_return(self) -> Result<Value, Error> {
        Ok(Value::from(self))
    }
}

impl<T: Into<Value>> IntoReturn for Result<T, Error> {
    fn into_return(self) -> Result<Value, Error> {
        self.map(Into::into)
    }
}
