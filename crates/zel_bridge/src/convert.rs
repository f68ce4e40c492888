//! Generic conversions between native types and guest handles.
//!
//! One trait pair, implemented once per supported type. The supported set
//! is closed: adding a type means adding an impl here, and a missing impl
//! is a compile error at the use site. Primitive `FromGuest` impls are
//! total under every shape; wrapper impls are shape-checked.

use zel_engine::{ElementId, Engine, HandleId};

use crate::errors::{BridgeError, BridgeResult};
use crate::scoped::ScopedValue;
use crate::value::Value;
use crate::wrappers::{Buffer, Callable, Object};

/// Read a native value out of a guest handle.
pub trait FromGuest: Sized {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self>;
}

/// Materialize a native value as a guest handle.
pub trait IntoGuest {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId>;
}

impl FromGuest for bool {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(engine.truthiness(handle))
    }
}

impl FromGuest for i32 {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(engine.coerce_int32(handle))
    }
}

impl FromGuest for i64 {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(engine.coerce_int64(handle))
    }
}

impl FromGuest for f64 {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(engine.coerce_number(handle))
    }
}

impl FromGuest for String {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(engine.coerce_string(handle))
    }
}

impl FromGuest for Object {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        ScopedValue::from_handle(handle).to_object(engine)
    }
}

impl FromGuest for Callable {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        ScopedValue::from_handle(handle).to_callable(engine)
    }
}

impl FromGuest for Buffer {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        ScopedValue::from_handle(handle).to_buffer(engine)
    }
}

/// Element reads are double-reported: the conversion fails with
/// `InvalidElement`, and the engine's error channel gets an entry so
/// guest-side error handling observes the failure too.
impl FromGuest for Option<ElementId> {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        match ScopedValue::from_handle(handle).to_element(engine) {
            Ok(element) => Ok(element),
            Err(_) => {
                let shape = engine.shape_of(handle);
                engine.report_error(handle, "given value is not an element");
                Err(BridgeError::InvalidElement { shape })
            }
        }
    }
}

impl FromGuest for ScopedValue {
    fn from_guest(_engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(ScopedValue::from_handle(handle))
    }
}

impl FromGuest for Value {
    fn from_guest(engine: &mut Engine, handle: HandleId) -> BridgeResult<Self> {
        Ok(ScopedValue::from_handle(handle).to_value(engine))
    }
}

impl IntoGuest for bool {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_bool(self))
    }
}

impl IntoGuest for i32 {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_int(self as i64))
    }
}

impl IntoGuest for i64 {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_int(self))
    }
}

impl IntoGuest for f64 {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_number(self))
    }
}

impl IntoGuest for &str {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_str(self))
    }
}

impl IntoGuest for String {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.alloc_str(&self))
    }
}

impl IntoGuest for Object {
    fn into_guest(self, _engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(self.handle())
    }
}

impl IntoGuest for Callable {
    fn into_guest(self, _engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(self.handle())
    }
}

impl IntoGuest for Buffer {
    fn into_guest(self, _engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(self.handle())
    }
}

impl IntoGuest for ElementId {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(engine.expose_element(self))
    }
}

impl IntoGuest for Option<ElementId> {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        match self {
            None => Ok(engine.undefined()),
            Some(el) => Ok(engine.expose_element(el)),
        }
    }
}

impl IntoGuest for &Value {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        ScopedValue::from_value(engine, self).map(|scoped| scoped.handle())
    }
}

impl IntoGuest for Value {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        (&self).into_guest(engine)
    }
}

impl IntoGuest for &ScopedValue {
    fn into_guest(self, _engine: &mut Engine) -> BridgeResult<HandleId> {
        Ok(self.handle())
    }
}

impl IntoGuest for ScopedValue {
    fn into_guest(self, engine: &mut Engine) -> BridgeResult<HandleId> {
        (&self).into_guest(engine)
    }
}
