//! Bridge failure type.
//!
//! Every failure is a contract violation raised synchronously at the call
//! site; nothing here is retryable. Each variant carries the discriminant
//! a caller needs to tell what was requested and what was actually there.

use thiserror::Error;
use zel_engine::Shape;

use crate::value::Stored;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Wrong-tag access on a persistent value, or element/object
    /// confusion when casting a handle to an object.
    #[error("cannot read {requested} out of a {actual} value")]
    TypeMismatch {
        requested: &'static str,
        actual: &'static str,
    },

    /// A persistent value's payload no longer resolves to a live engine
    /// handle.
    #[error("{stored} payload is no longer live in the engine")]
    InvalidValueType { stored: Stored },

    /// The handle's runtime shape does not match the requested native
    /// shape.
    #[error("cannot cast a {} handle to {requested}", .shape.name())]
    InvalidCast {
        requested: &'static str,
        shape: Shape,
    },

    /// Boundary conversion of a non-element handle to an element. Also
    /// surfaced through the engine's error channel so guest code observes
    /// the failure.
    #[error("a {} handle is not an element", .shape.name())]
    InvalidElement { shape: Shape },
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            BridgeError::InvalidValueType { .. } => codes::INVALID_VALUE_TYPE,
            BridgeError::InvalidCast { .. } => codes::INVALID_CAST,
            BridgeError::InvalidElement { .. } => codes::INVALID_ELEMENT,
        }
    }
}

pub mod codes {
    pub const TYPE_MISMATCH: &str = "E0001";
    pub const INVALID_VALUE_TYPE: &str = "E0002";
    pub const INVALID_CAST: &str = "E0003";
    pub const INVALID_ELEMENT: &str = "E0004";
}

pub type BridgeResult<T> = Result<T, BridgeError>;
