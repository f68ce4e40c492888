//! Handle slab and guest cell storage.
//!
//! Guest values live in a slab of cells indexed by `HandleId`. Cells
//! allocated inside a scope are reclaimed when that scope exits unless
//! they carry a pin; pinned cells persist until their pin count drops
//! back to zero.

use std::num::NonZeroU64;

use ahash::RandomState;
use indexmap::IndexMap;

/// Handle to an engine-resident guest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub usize);

/// Stable identity of a host element exposed into the engine.
///
/// Non-zero so that `Option<ElementId>` stays pointer-sized. The zero
/// pattern is the "no element" case the bridge spells as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(NonZeroU64);

impl ElementId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(ElementId)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

pub type PropMap = IndexMap<String, HandleId, RandomState>;

pub fn prop_map_new() -> PropMap {
    IndexMap::with_hasher(RandomState::with_seeds(0, 0, 0, 0))
}

/// A guest object cell.
///
/// Properties keep insertion order. `marker` is the single internal slot
/// set only when the engine wraps a host element; plain guest objects and
/// boxed strings never carry it.
#[derive(Clone)]
pub struct GuestObject {
    pub properties: PropMap,
    pub marker: Option<ElementId>,
    pub boxed_str: Option<String>,
}

impl GuestObject {
    pub fn plain() -> Self {
        Self {
            properties: prop_map_new(),
            marker: None,
            boxed_str: None,
        }
    }

    pub fn element(marker: ElementId) -> Self {
        Self {
            properties: prop_map_new(),
            marker: Some(marker),
            boxed_str: None,
        }
    }

    pub fn boxed_string(s: String) -> Self {
        Self {
            properties: prop_map_new(),
            marker: None,
            boxed_str: Some(s),
        }
    }
}

#[derive(Clone)]
pub struct GuestFunction {
    pub name: Option<String>,
}

/// Runtime data of one guest cell.
#[derive(Clone)]
pub enum HandleData {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    Str(String),
    Object(GuestObject),
    Array(Vec<HandleId>),
    Function(GuestFunction),
    Buffer(Vec<u8>),
}

/// Engine-visible classification of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Undefined,
    Null,
    Bool,
    Int,
    Number,
    Str,
    Object,
    Array,
    Function,
    Buffer,
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Undefined => "undefined",
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Number => "number",
            Shape::Str => "string",
            Shape::Object => "object",
            Shape::Array => "array",
            Shape::Function => "function",
            Shape::Buffer => "buffer",
        }
    }
}

impl HandleData {
    pub fn shape(&self) -> Shape {
        match self {
            HandleData::Undefined => Shape::Undefined,
            HandleData::Null => Shape::Null,
            HandleData::Bool(_) => Shape::Bool,
            HandleData::Int(_) => Shape::Int,
            HandleData::Number(_) => Shape::Number,
            HandleData::Str(_) => Shape::Str,
            HandleData::Object(_) => Shape::Object,
            HandleData::Array(_) => Shape::Array,
            HandleData::Function(_) => Shape::Function,
            HandleData::Buffer(_) => Shape::Buffer,
        }
    }
}

struct Cell {
    data: HandleData,
    pins: u32,
    // Scope depth at allocation. Zero means the cell persists until its
    // pins drop to zero (or forever, if it was never pinned).
    scope: u32,
}

pub(crate) struct Heap {
    cells: Vec<Option<Cell>>,
    free_list: Vec<usize>,
    alloc_count: usize,
}

impl Heap {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            alloc_count: 0,
        }
    }

    pub(crate) fn alloc(&mut self, data: HandleData, scope: u32) -> HandleId {
        self.alloc_count += 1;
        let cell = Cell {
            data,
            pins: 0,
            scope,
        };
        if let Some(id) = self.free_list.pop() {
            self.cells[id] = Some(cell);
            HandleId(id)
        } else {
            let id = self.cells.len();
            self.cells.push(Some(cell));
            HandleId(id)
        }
    }

    pub(crate) fn get(&self, id: HandleId) -> &HandleData {
        &self.cells[id.0]
            .as_ref()
            .expect("handle used after its scope exited")
            .data
    }

    pub(crate) fn get_mut(&mut self, id: HandleId) -> &mut HandleData {
        &mut self.cells[id.0]
            .as_mut()
            .expect("handle used after its scope exited")
            .data
    }

    pub(crate) fn is_live(&self, id: HandleId) -> bool {
        self.cells.get(id.0).is_some_and(|c| c.is_some())
    }

    pub(crate) fn pin(&mut self, id: HandleId) {
        let cell = self.cells[id.0]
            .as_mut()
            .expect("cannot pin a freed handle");
        cell.pins += 1;
    }

    /// Drop one pin. Returns true when the cell was freed as a result.
    pub(crate) fn unpin(&mut self, id: HandleId) -> bool {
        let cell = self.cells[id.0]
            .as_mut()
            .expect("cannot unpin a freed handle");
        debug_assert!(cell.pins > 0, "unbalanced unpin on {:?}", id);
        cell.pins = cell.pins.saturating_sub(1);
        if cell.pins == 0 && cell.scope == 0 {
            self.free(id);
            return true;
        }
        false
    }

    pub(crate) fn free(&mut self, id: HandleId) {
        if self.is_live(id) {
            self.cells[id.0] = None;
            self.free_list.push(id.0);
        }
    }

    /// Reclaim an unpinned scope-local cell, or promote a pinned one to
    /// persistent so a later unpin can free it.
    pub(crate) fn sweep(&mut self, id: HandleId) {
        let Some(Some(cell)) = self.cells.get_mut(id.0) else {
            return;
        };
        if cell.pins == 0 {
            self.free(id);
        } else {
            cell.scope = 0;
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub(crate) fn alloc_count(&self) -> usize {
        self.alloc_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_reuses_freed_slots() {
        let mut heap = Heap::new(4);
        let a = heap.alloc(HandleData::Int(1), 0);
        let b = heap.alloc(HandleData::Int(2), 0);
        heap.free(a);
        let c = heap.alloc(HandleData::Int(3), 0);
        assert_eq!(a, c);
        assert_ne!(b, c);
        assert_eq!(heap.live_count(), 2);
    }

    #[test]
    fn sweep_frees_unpinned_and_promotes_pinned() {
        let mut heap = Heap::new(4);
        let transient = heap.alloc(HandleData::Bool(true), 1);
        let kept = heap.alloc(HandleData::Bool(false), 1);
        heap.pin(kept);

        heap.sweep(transient);
        heap.sweep(kept);
        assert!(!heap.is_live(transient));
        assert!(heap.is_live(kept));

        // The pin now owns the cell outright.
        assert!(heap.unpin(kept));
        assert!(!heap.is_live(kept));
    }

    #[test]
    fn double_free_is_idempotent() {
        let mut heap = Heap::new(4);
        let a = heap.alloc(HandleData::Null, 0);
        heap.free(a);
        heap.free(a);
        assert_eq!(heap.live_count(), 0);
        assert_eq!(heap.alloc_count(), 1);
    }
}
