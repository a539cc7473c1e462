//! The value-handle contract every walker consumes
//!
//! A [`ValueHandle`] is an opaque reference into memory owned by the
//! inspection host. Walkers only ever read through it, and every read may
//! fail: a missing field, an uninitialized slot or a dangling pointer all come
//! back as a [`FieldAccessError`] that the caller handles on the spot.

use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Failure to read a field, slot or scalar through a [`ValueHandle`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldAccessError {
    /// The value's type has no field with this name
    #[error("no field named '{field}'")]
    Missing { field: String },

    /// The field exists but its memory cannot be read
    #[error("cannot read '{what}': {reason}")]
    Unreadable { what: String, reason: String },

    /// Index past the end of an array-like value
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// A size or capacity that is not a non-negative integer
    #[error("expected a count, got {found}")]
    NotACount { found: String },

    /// Field or index access on a value that has no sub-fields
    #[error("cannot access '{what}' on non-aggregate value {found}")]
    NotAStruct { what: String, found: String },
}

impl FieldAccessError {
    pub fn missing(field: &str) -> Self {
        FieldAccessError::Missing {
            field: field.to_string(),
        }
    }

    pub fn unreadable(what: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldAccessError::Unreadable {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// A readable memory cell supplied by the host
///
/// Handles are cheap to clone and never mutate the memory they point at.
pub trait ValueHandle: Clone + Debug {
    /// Comparable key for a distinct memory location
    type Identity: Clone + Eq + Hash + Debug;

    /// Read a named sub-field
    fn field(&self, name: &str) -> Result<Self, FieldAccessError>;

    /// Read slot `index` of an array-like value
    fn index(&self, index: usize) -> Result<Self, FieldAccessError>;

    /// `false` for null pointers, zero scalars and absent structures
    fn is_truthy(&self) -> bool;

    /// Address identity, stable for the duration of one render
    fn identity(&self) -> Result<Self::Identity, FieldAccessError>;

    /// Render a terminal value as text
    fn display_scalar(&self) -> String;

    /// Read a scalar as a non-negative count (sizes, capacities)
    fn as_count(&self) -> Result<usize, FieldAccessError>;

    /// Structural type name used for printer dispatch; pointers report the
    /// type they point at
    fn type_name(&self) -> Option<String>;
}
