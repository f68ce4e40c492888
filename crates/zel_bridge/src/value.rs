//! Persistent host-owned values.

use std::fmt;

use zel_engine::ElementId;

use crate::errors::{BridgeError, BridgeResult};
use crate::wrappers::{Callable, Object};

/// Tag of a persistent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stored {
    Null,
    Boolean,
    Integer,
    Double,
    Object,
    Callable,
    Element,
}

impl Stored {
    pub fn name(self) -> &'static str {
        match self {
            Stored::Null => "Null",
            Stored::Boolean => "Boolean",
            Stored::Integer => "Integer",
            Stored::Double => "Double",
            Stored::Object => "Object",
            Stored::Callable => "Callable",
            Stored::Element => "Element",
        }
    }
}

impl fmt::Display for Stored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-owned value, portable across engine scopes and threads.
///
/// `Null` is the only representation of "no value"; every other variant
/// carries a payload that cannot be null. Nullable element pointers enter
/// as `Option<ElementId>`, with `None` landing on `Null`. Cloning yields
/// an independent copy whose lifetime is not tied to the original.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Object(Object),
    Callable(Callable),
    Element(ElementId),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn stored(&self) -> Stored {
        match self {
            Value::Null => Stored::Null,
            Value::Bool(_) => Stored::Boolean,
            Value::Int(_) => Stored::Integer,
            Value::Double(_) => Stored::Double,
            Value::Object(_) => Stored::Object,
            Value::Callable(_) => Stored::Callable,
            Value::Element(_) => Stored::Element,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, requested: &'static str) -> BridgeError {
        BridgeError::TypeMismatch {
            requested,
            actual: self.stored().name(),
        }
    }

    pub fn as_bool(&self) -> BridgeResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.mismatch("Boolean")),
        }
    }

    pub fn as_int32(&self) -> BridgeResult<i32> {
        match self {
            Value::Int(i) => Ok(*i as i32),
            _ => Err(self.mismatch("Int32")),
        }
    }

    pub fn as_int64(&self) -> BridgeResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => Err(self.mismatch("Int64")),
        }
    }

    /// Double payload, or an Integer payload widened.
    pub fn as_number(&self) -> BridgeResult<f64> {
        match self {
            Value::Double(n) => Ok(*n),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(self.mismatch("Number")),
        }
    }

    pub fn as_object(&self) -> BridgeResult<Object> {
        match self {
            Value::Object(o) => Ok(*o),
            _ => Err(self.mismatch("Object")),
        }
    }

    pub fn as_callable(&self) -> BridgeResult<Callable> {
        match self {
            Value::Callable(c) => Ok(*c),
            _ => Err(self.mismatch("Callable")),
        }
    }

    /// Element payload, with `Null` reading as the absent element.
    pub fn as_element(&self) -> BridgeResult<Option<ElementId>> {
        match self {
            Value::Element(el) => Ok(Some(*el)),
            Value::Null => Ok(None),
            _ => Err(self.mismatch("Element")),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Callable> for Value {
    fn from(v: Callable) -> Self {
        Value::Callable(v)
    }
}

impl From<ElementId> for Value {
    fn from(v: ElementId) -> Self {
        Value::Element(v)
    }
}

impl From<Option<ElementId>> for Value {
    fn from(v: Option<ElementId>) -> Self {
        match v {
            Some(el) => Value::Element(el),
            None => Value::Null,
        }
    }
}
