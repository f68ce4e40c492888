//! Secondary handle wrappers.
//!
//! Each wrapper references exactly one guest handle and takes one pin on
//! it, keeping the cell alive across scope exits. Pins are manual:
//! `release` hands the pin back, after which every copy of the wrapper
//! dangles. Equality is handle identity, not guest value equality.

use zel_engine::{Engine, HandleData, HandleId};

/// Persistent reference to a guest object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    handle: HandleId,
}

impl Object {
    /// Fresh plain guest object.
    pub fn new(engine: &mut Engine) -> Self {
        let handle = engine.alloc_object();
        Self::from_handle(engine, handle)
    }

    /// Wrap an existing handle, taking one pin on it.
    pub fn from_handle(engine: &mut Engine, handle: HandleId) -> Self {
        engine.pin(handle);
        Self { handle }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn release(self, engine: &mut Engine) {
        engine.release(self.handle);
    }
}

/// Persistent reference to a guest function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Callable {
    handle: HandleId,
}

impl Callable {
    pub fn from_handle(engine: &mut Engine, handle: HandleId) -> Self {
        engine.pin(handle);
        Self { handle }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn release(self, engine: &mut Engine) {
        engine.release(self.handle);
    }
}

/// Persistent reference to a guest binary buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffer {
    handle: HandleId,
}

impl Buffer {
    /// Fresh buffer cell holding a copy of `bytes`.
    pub fn with_bytes(engine: &mut Engine, bytes: &[u8]) -> Self {
        let handle = engine.alloc_buffer(bytes);
        Self::from_handle(engine, handle)
    }

    pub fn from_handle(engine: &mut Engine, handle: HandleId) -> Self {
        engine.pin(handle);
        Self { handle }
    }

    pub fn bytes<'e>(&self, engine: &'e Engine) -> &'e [u8] {
        match engine.data(self.handle) {
            HandleData::Buffer(bytes) => bytes,
            other => panic!("buffer wrapper over a {} handle", other.shape().name()),
        }
    }

    pub fn len(&self, engine: &Engine) -> usize {
        self.bytes(engine).len()
    }

    pub fn is_empty(&self, engine: &Engine) -> bool {
        self.bytes(engine).is_empty()
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn release(self, engine: &mut Engine) {
        engine.release(self.handle);
    }
}
