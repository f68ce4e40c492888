//! Value marshalling between native host code and the Zel engine.
//!
//! Two value worlds meet here. [`ScopedValue`] wraps an engine handle and
//! is only valid while the scope that produced the handle is alive.
//! [`Value`] owns its payload on the host side and survives any number of
//! engine calls; it can be mirrored back into a fresh scope later. The
//! [`FromGuest`]/[`IntoGuest`] pair covers the supported native types for
//! direct boundary conversions.

mod convert;
mod errors;
mod scoped;
mod value;
mod wrappers;

pub use convert::{FromGuest, IntoGuest};
pub use errors::{BridgeError, BridgeResult, codes};
pub use scoped::ScopedValue;
pub use value::{Stored, Value};
pub use wrappers::{Buffer, Callable, Object};

// Collaborator surface, re-exported for consumers of the bridge.
pub use zel_engine::{ElementId, Engine, EngineConfig, HandleId, Shape};
