//! Host records exposed to dotted-path references.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use super::Value;

/// A host record whose fields can be read by name.
///
/// Fields are read on every evaluation, so an object behind a lock reflects
/// mutations made between evaluations.
pub trait Object: Send + Sync {
    /// Returns the field with the given external name, if any.
    fn field(&self, name: &str) -> Option<Value>;

    fn type_name(&self) -> &str {
        "object"
    }
}

impl<T: Object + ?Sized> Object for Arc<T> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}

impl<T: Object + ?Sized> Object for Box<T> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}

// A poisoned lock still holds readable data.
impl<T: Object> Object for RwLock<T> {
    fn field(&self, name: &str) -> Option<Value> {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.field(name)
    }
}

impl<T: Object> Object for Mutex<T> {
    fn field(&self, name: &str) -> Option<Value> {
        let guard = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.field(name)
    }
}

impl<V: Clone + Into<Value> + Send + Sync> Object for HashMap<String, V> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }

    fn type_name(&self) -> &str {
        "map"
    }
}

impl<V: Clone + Into<Value> + Send + Sync> Object for BTreeMap<String, V> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }

    fn type_name(&self) -> &str {
        "map"
    }
}

/// Implements [`Object`] for a struct by mapping external names to fields.
///
/// Every listed field must be `Clone` and convertible into a [`Value`].
///
/// ```ignore
/// struct Person { age: i64, name: String }
///
/// gon_core::object!(Person {
///     "age" => age,
///     "name" => name,
/// });
/// ```
#[macro_export]
macro_rules! object {
    ($ty:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::values::Object for $ty {
            fn field(&self, name: &str) -> Option<$crate::values::Value> {
                match name {
                    $($name => Some($crate::values::Value::from(self.$field.clone())),)*
                    _ => None,
                }
            }

            fn type_name(&self) -> &str {
                stringify!($ty)
            }
        }
    };
}
