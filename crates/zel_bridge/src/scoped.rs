//! Scope-bound transient values.

use std::fmt;
use std::rc::Rc;

use zel_engine::{ElementId, Engine, HandleData, HandleId, Shape};

use crate::errors::{BridgeError, BridgeResult};
use crate::value::{Stored, Value};
use crate::wrappers::{Buffer, Callable, Object};

struct ScopedSlot {
    handle: HandleId,
}

/// Transient wrapper around one engine handle.
///
/// Clones share a single slot; the slot is freed when the last clone
/// drops. Equality compares slot identity, not guest value equality: two
/// wrappers built separately around the same handle are unequal. A
/// `ScopedValue` must not outlive the engine scope that allocated its
/// handle.
#[derive(Clone)]
pub struct ScopedValue {
    slot: Rc<ScopedSlot>,
}

impl PartialEq for ScopedValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for ScopedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedValue")
            .field("handle", &self.slot.handle)
            .field("shares", &Rc::strong_count(&self.slot))
            .finish()
    }
}

impl ScopedValue {
    /// Wrap a raw handle in a fresh slot.
    pub fn from_handle(handle: HandleId) -> Self {
        Self {
            slot: Rc::new(ScopedSlot { handle }),
        }
    }

    pub fn undefined(engine: &Engine) -> Self {
        Self::from_handle(engine.undefined())
    }

    pub fn from_bool(engine: &mut Engine, v: bool) -> Self {
        Self::from_handle(engine.alloc_bool(v))
    }

    pub fn from_i32(engine: &mut Engine, v: i32) -> Self {
        Self::from_handle(engine.alloc_int(v as i64))
    }

    pub fn from_i64(engine: &mut Engine, v: i64) -> Self {
        Self::from_handle(engine.alloc_int(v))
    }

    pub fn from_f64(engine: &mut Engine, v: f64) -> Self {
        Self::from_handle(engine.alloc_number(v))
    }

    pub fn from_str(engine: &mut Engine, v: &str) -> Self {
        Self::from_handle(engine.alloc_str(v))
    }

    /// Wraps the object's existing handle; nothing is allocated.
    pub fn from_object(object: &Object) -> Self {
        Self::from_handle(object.handle())
    }

    /// Wraps the callable's existing handle; nothing is allocated.
    pub fn from_callable(callable: &Callable) -> Self {
        Self::from_handle(callable.handle())
    }

    /// Fresh binary-buffer handle holding a copy of the buffer's bytes.
    pub fn from_buffer(engine: &mut Engine, buffer: &Buffer) -> Self {
        let bytes = buffer.bytes(engine).to_vec();
        Self::from_handle(engine.alloc_buffer(&bytes))
    }

    /// Handle registered for the element; an absent element yields the
    /// undefined handle.
    pub fn from_element(engine: &mut Engine, element: Option<ElementId>) -> Self {
        match element {
            None => Self::from_handle(engine.undefined()),
            Some(el) => Self::from_handle(engine.expose_element(el)),
        }
    }

    /// Mirror a persistent value into the matching guest representation.
    pub fn from_value(engine: &mut Engine, value: &Value) -> BridgeResult<Self> {
        let handle = match value {
            Value::Null => engine.undefined(),
            Value::Bool(b) => engine.alloc_bool(*b),
            Value::Int(i) => engine.alloc_int(*i),
            Value::Double(n) => engine.alloc_number(*n),
            Value::Object(o) => {
                if !engine.is_live(o.handle()) {
                    return Err(BridgeError::InvalidValueType {
                        stored: Stored::Object,
                    });
                }
                o.handle()
            }
            Value::Callable(c) => {
                if !engine.is_live(c.handle()) {
                    return Err(BridgeError::InvalidValueType {
                        stored: Stored::Callable,
                    });
                }
                c.handle()
            }
            Value::Element(el) => engine.expose_element(*el),
        };
        Ok(Self::from_handle(handle))
    }

    pub fn handle(&self) -> HandleId {
        self.slot.handle
    }

    /// Number of live wrappers sharing this slot.
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.slot)
    }

    // ------------------------------------------------------------------
    // Shape predicates
    // ------------------------------------------------------------------

    pub fn is_null(&self, engine: &Engine) -> bool {
        matches!(
            engine.shape_of(self.handle()),
            Shape::Null | Shape::Undefined
        )
    }

    pub fn is_bool(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Bool
    }

    pub fn is_int(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Int
    }

    pub fn is_number(&self, engine: &Engine) -> bool {
        matches!(engine.shape_of(self.handle()), Shape::Int | Shape::Number)
    }

    /// Primitive strings and boxed string objects.
    pub fn is_string(&self, engine: &Engine) -> bool {
        match engine.data(self.handle()) {
            HandleData::Str(_) => true,
            HandleData::Object(o) => o.boxed_str.is_some(),
            _ => false,
        }
    }

    pub fn is_callable(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Function
    }

    pub fn is_buffer(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Buffer
    }

    pub fn is_object(&self, engine: &Engine) -> bool {
        matches!(
            engine.shape_of(self.handle()),
            Shape::Object | Shape::Array | Shape::Function | Shape::Buffer
        )
    }

    pub fn is_array(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Array
    }

    /// True only for an object the engine registered as a host element.
    /// Plain objects, arrays, functions, and strings are never elements.
    pub fn is_element(&self, engine: &Engine) -> bool {
        engine.shape_of(self.handle()) == Shape::Object
            && engine.element_of(self.handle()).is_some()
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// Guest truthiness. Defined for every shape, so this never fails.
    pub fn to_bool(&self, engine: &Engine) -> bool {
        engine.truthiness(self.handle())
    }

    pub fn to_int32(&self, engine: &Engine) -> i32 {
        engine.coerce_int32(self.handle())
    }

    pub fn to_int64(&self, engine: &Engine) -> i64 {
        engine.coerce_int64(self.handle())
    }

    pub fn to_number(&self, engine: &Engine) -> f64 {
        engine.coerce_number(self.handle())
    }

    pub fn to_std_string(&self, engine: &Engine) -> String {
        engine.coerce_string(self.handle())
    }

    pub fn to_callable(&self, engine: &mut Engine) -> BridgeResult<Callable> {
        if !self.is_callable(engine) {
            return Err(BridgeError::InvalidCast {
                requested: "Callable",
                shape: engine.shape_of(self.handle()),
            });
        }
        Ok(Callable::from_handle(engine, self.handle()))
    }

    pub fn to_buffer(&self, engine: &mut Engine) -> BridgeResult<Buffer> {
        if !self.is_buffer(engine) {
            return Err(BridgeError::InvalidCast {
                requested: "Buffer",
                shape: engine.shape_of(self.handle()),
            });
        }
        Ok(Buffer::from_handle(engine, self.handle()))
    }

    /// Object wrapper over the handle. A primitive string is boxed into a
    /// string object first. Element handles are refused: a caller holding
    /// an element almost certainly wanted `to_element`.
    pub fn to_object(&self, engine: &mut Engine) -> BridgeResult<Object> {
        if self.is_string(engine) && !self.is_object(engine) {
            let s = engine.coerce_string(self.handle());
            let boxed = engine.alloc_string_object(s);
            return Ok(Object::from_handle(engine, boxed));
        }
        if self.is_element(engine) {
            return Err(BridgeError::TypeMismatch {
                requested: "Object",
                actual: "element",
            });
        }
        if self.is_object(engine) {
            return Ok(Object::from_handle(engine, self.handle()));
        }
        Err(BridgeError::InvalidCast {
            requested: "Object",
            shape: engine.shape_of(self.handle()),
        })
    }

    /// The element registered for this handle; null and undefined read as
    /// the absent element.
    pub fn to_element(&self, engine: &Engine) -> BridgeResult<Option<ElementId>> {
        if self.is_null(engine) {
            return Ok(None);
        }
        match engine.element_of(self.handle()) {
            Some(el) => Ok(Some(el)),
            None => Err(BridgeError::InvalidCast {
                requested: "Element",
                shape: engine.shape_of(self.handle()),
            }),
        }
    }

    /// Best-matching persistent value for the handle's shape. Strings box
    /// into string objects; shapes with no persistent counterpart land on
    /// `Value::Null`.
    pub fn to_value(&self, engine: &mut Engine) -> Value {
        if self.is_bool(engine) {
            Value::Bool(self.to_bool(engine))
        } else if self.is_int(engine) {
            Value::Int(self.to_int64(engine))
        } else if self.is_number(engine) {
            Value::Double(self.to_number(engine))
        } else if self.is_string(engine) {
            let handle = if self.is_object(engine) {
                self.handle()
            } else {
                let s = engine.coerce_string(self.handle());
                engine.alloc_string_object(s)
            };
            Value::Object(Object::from_handle(engine, handle))
        } else if self.is_element(engine) {
            match engine.element_of(self.handle()) {
                Some(el) => Value::Element(el),
                None => Value::Null,
            }
        } else if self.is_callable(engine) {
            Value::Callable(Callable::from_handle(engine, self.handle()))
        } else if self.is_object(engine) {
            Value::Object(Object::from_handle(engine, self.handle()))
        } else {
            Value::Null
        }
    }
}
