//! Zel engine collaborator.
//!
//! The pieces of the guest engine that the value bridge consumes: a handle
//! slab with scope-bound reclamation, literal construction primitives,
//! shape classification, loose coercion rules, an element registry, and a
//! guest error channel. Parsing and execution of guest code live
//! elsewhere.

mod coerce;
mod config;
mod engine;
mod heap;

pub use config::EngineConfig;
pub use engine::{Engine, FastHashMap, ReportedError, ScopeId, fast_map_new};
pub use heap::{
    ElementId, GuestFunction, GuestObject, HandleData, HandleId, PropMap, Shape, prop_map_new,
};
