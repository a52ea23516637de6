//! Property access for validated objects.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Read access to a named property of a validated object.
///
/// This is the default accessor behind [`ValidatorConfig`]: object types
/// expose their own getter convention by implementing it, and stock impls
/// cover JSON values and string-keyed maps. Absent properties, and every
/// property of a null object, read as `Value::Null`.
///
/// [`ValidatorConfig`]: crate::ValidatorConfig
pub trait PropertyAccess {
    fn property(&self, name: &str) -> Value;
}

impl PropertyAccess for Value {
    fn property(&self, name: &str) -> Value {
        match self {
            Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

impl PropertyAccess for Map<String, Value> {
    fn property(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl PropertyAccess for HashMap<String, Value> {
    fn property(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl PropertyAccess for BTreeMap<String, Value> {
    fn property(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl<P: PropertyAccess> PropertyAccess for Option<P> {
    fn property(&self, name: &str) -> Value {
        match self {
            Some(inner) => inner.property(name),
            None => Value::Null,
        }
    }
}
