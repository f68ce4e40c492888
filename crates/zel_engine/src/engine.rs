//! Engine façade.
//!
//! Owns the handle slab, the scope stack, the element registry, and the
//! guest error channel. Execution of guest code is out of scope here; the
//! engine only manufactures and classifies handles and applies the guest
//! coercion rules to them.

use std::hash::Hash;

use ahash::RandomState;
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::coerce;
use crate::config::EngineConfig;
use crate::heap::{
    ElementId, GuestFunction, GuestObject, HandleData, HandleId, Heap, Shape,
};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(RandomState::with_seeds(0, 0, 0, 0))
}

/// Token for an open scope, consumed by `exit_scope`.
///
/// Scopes close in LIFO order. Exiting out of order is a caller bug and
/// panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(u32);

struct ScopeFrame {
    allocated: SmallVec<[HandleId; 16]>,
}

/// One guest error surfaced through the engine's reporting channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub message: String,
    pub context: String,
}

pub struct Engine {
    heap: Heap,
    scopes: Vec<ScopeFrame>,
    elements_fwd: FastHashMap<ElementId, HandleId>,
    elements_rev: FastHashMap<HandleId, ElementId>,
    errors: Vec<ReportedError>,
    config: EngineConfig,
    undef: HandleId,
    null: HandleId,
    truthy: HandleId,
    falsy: HandleId,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut heap = Heap::new(config.heap_capacity);
        // Shared singletons, engine-lifetime.
        let undef = heap.alloc(HandleData::Undefined, 0);
        let null = heap.alloc(HandleData::Null, 0);
        let truthy = heap.alloc(HandleData::Bool(true), 0);
        let falsy = heap.alloc(HandleData::Bool(false), 0);
        Self {
            heap,
            scopes: Vec::new(),
            elements_fwd: fast_map_new(),
            elements_rev: fast_map_new(),
            errors: Vec::new(),
            config,
            undef,
            null,
            truthy,
            falsy,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    pub fn scope_depth(&self) -> u32 {
        self.scopes.len() as u32
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        self.scopes.push(ScopeFrame {
            allocated: SmallVec::new(),
        });
        let id = ScopeId(self.scopes.len() as u32);
        trace!(depth = id.0, "scope entered");
        id
    }

    pub fn exit_scope(&mut self, id: ScopeId) {
        assert_eq!(
            id.0,
            self.scopes.len() as u32,
            "scopes must exit in LIFO order"
        );
        let frame = self.scopes.pop().expect("no scope to exit");
        let before = self.heap.live_count();
        for handle in frame.allocated {
            self.heap.sweep(handle);
        }
        trace!(
            depth = id.0,
            reclaimed = before - self.heap.live_count(),
            "scope exited"
        );
    }

    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let scope = self.enter_scope();
        let out = f(self);
        self.exit_scope(scope);
        out
    }

    // ------------------------------------------------------------------
    // Handle construction
    // ------------------------------------------------------------------

    fn alloc(&mut self, data: HandleData) -> HandleId {
        let depth = self.scopes.len() as u32;
        let id = self.heap.alloc(data, depth);
        if let Some(frame) = self.scopes.last_mut() {
            frame.allocated.push(id);
        }
        id
    }

    pub fn undefined(&self) -> HandleId {
        self.undef
    }

    pub fn null_handle(&self) -> HandleId {
        self.null
    }

    pub fn alloc_bool(&mut self, v: bool) -> HandleId {
        if v { self.truthy } else { self.falsy }
    }

    pub fn alloc_int(&mut self, v: i64) -> HandleId {
        self.alloc(HandleData::Int(v))
    }

    pub fn alloc_number(&mut self, v: f64) -> HandleId {
        self.alloc(HandleData::Number(v))
    }

    pub fn alloc_str(&mut self, v: &str) -> HandleId {
        self.alloc(HandleData::Str(v.to_string()))
    }

    pub fn alloc_object(&mut self) -> HandleId {
        self.alloc(HandleData::Object(GuestObject::plain()))
    }

    /// Box a primitive string into a string-valued object cell.
    pub fn alloc_string_object(&mut self, v: String) -> HandleId {
        self.alloc(HandleData::Object(GuestObject::boxed_string(v)))
    }

    pub fn alloc_array(&mut self, items: Vec<HandleId>) -> HandleId {
        self.alloc(HandleData::Array(items))
    }

    pub fn alloc_function(&mut self, name: Option<&str>) -> HandleId {
        self.alloc(HandleData::Function(GuestFunction {
            name: name.map(str::to_string),
        }))
    }

    pub fn alloc_buffer(&mut self, bytes: &[u8]) -> HandleId {
        self.alloc(HandleData::Buffer(bytes.to_vec()))
    }

    // ------------------------------------------------------------------
    // Inspection and persistence
    // ------------------------------------------------------------------

    pub fn data(&self, id: HandleId) -> &HandleData {
        self.heap.get(id)
    }

    pub fn shape_of(&self, id: HandleId) -> Shape {
        self.heap.get(id).shape()
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.heap.is_live(id)
    }

    /// Keep a handle alive past its scope. Pins are manual and must be
    /// balanced by `release`.
    pub fn pin(&mut self, id: HandleId) {
        self.heap.pin(id);
    }

    pub fn release(&mut self, id: HandleId) {
        self.heap.unpin(id);
    }

    pub fn live_handles(&self) -> usize {
        self.heap.live_count()
    }

    pub fn total_allocations(&self) -> usize {
        self.heap.alloc_count()
    }

    // ------------------------------------------------------------------
    // Object properties
    // ------------------------------------------------------------------

    pub fn object_set(&mut self, obj: HandleId, key: &str, value: HandleId) {
        match self.heap.get_mut(obj) {
            HandleData::Object(o) => {
                o.properties.insert(key.to_string(), value);
            }
            other => panic!("object_set on a {:?} handle", other.shape()),
        }
    }

    pub fn object_get(&self, obj: HandleId, key: &str) -> Option<HandleId> {
        match self.heap.get(obj) {
            HandleData::Object(o) => o.properties.get(key).copied(),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Coercion
    // ------------------------------------------------------------------

    pub fn truthiness(&self, id: HandleId) -> bool {
        coerce::truthiness(&self.heap, id)
    }

    pub fn coerce_number(&self, id: HandleId) -> f64 {
        coerce::number_of(&self.heap, id)
    }

    pub fn coerce_int32(&self, id: HandleId) -> i32 {
        coerce::int32_of(&self.heap, id)
    }

    pub fn coerce_int64(&self, id: HandleId) -> i64 {
        coerce::int64_of(&self.heap, id)
    }

    pub fn coerce_string(&self, id: HandleId) -> String {
        coerce::string_of(&self.heap, id)
    }

    // ------------------------------------------------------------------
    // Element registry
    // ------------------------------------------------------------------

    /// Handle for a host element, creating and registering the marked
    /// guest object on first use. Element objects are engine-lifetime;
    /// `retire_element` removes them.
    pub fn expose_element(&mut self, element: ElementId) -> HandleId {
        if let Some(&handle) = self.elements_fwd.get(&element) {
            if self.heap.is_live(handle) {
                return handle;
            }
            // The registered object was released; drop the stale reverse
            // entry before its slot is reused.
            self.elements_rev.remove(&handle);
        }
        let handle = self
            .heap
            .alloc(HandleData::Object(GuestObject::element(element)), 0);
        self.elements_fwd.insert(element, handle);
        self.elements_rev.insert(handle, element);
        debug!(element = element.get(), ?handle, "element exposed");
        handle
    }

    pub fn element_handle(&self, element: ElementId) -> Option<HandleId> {
        self.elements_fwd
            .get(&element)
            .copied()
            .filter(|h| self.heap.is_live(*h))
    }

    /// Element registered for `handle`, if any. The registry entry must
    /// agree with the cell's marker slot; a reused slot index with a stale
    /// entry does not classify as an element.
    pub fn element_of(&self, handle: HandleId) -> Option<ElementId> {
        let element = *self.elements_rev.get(&handle)?;
        if !self.heap.is_live(handle) {
            return None;
        }
        match self.heap.get(handle) {
            HandleData::Object(o) if o.marker == Some(element) => Some(element),
            _ => None,
        }
    }

    pub fn retire_element(&mut self, element: ElementId) {
        if let Some(handle) = self.elements_fwd.remove(&element) {
            self.elements_rev.remove(&handle);
            self.heap.free(handle);
        }
    }

    // ------------------------------------------------------------------
    // Error channel
    // ------------------------------------------------------------------

    /// Surface a guest-visible error for `handle`. The handle's string
    /// coercion becomes the message; `context` names the native operation
    /// that failed.
    pub fn report_error(&mut self, handle: HandleId, context: &str) {
        let message = self.coerce_string(handle);
        warn!(context, %message, "guest error reported");
        if self.errors.len() == self.config.max_reported_errors {
            self.errors.remove(0);
        }
        self.errors.push(ReportedError {
            message,
            context: context.to_string(),
        });
    }

    pub fn pending_errors(&self) -> &[ReportedError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ReportedError> {
        std::mem::take(&mut self.errors)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
