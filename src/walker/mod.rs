//! Structure walkers
//!
//! This module holds the three traversals that turn a pointer structure into a
//! bounded list of labelled entries:
//! - [`list`]: singly linked chains, capped at a maximum node count
//! - [`tree`]: binary tree nodes, with identity-based cycle detection
//! - [`table`]: hash tables, enumerating occupied buckets up to a cap
//!
//! # Contract
//!
//! Every walker exposes a one-line [`Walker::summary`] and a lazy
//! [`Walker::entries`] sequence. Entries carry either a [`ValueHandle`] the host
//! may render further, or placeholder text (`"..."`, `"error"`, `"circular"`)
//! that must be shown verbatim.
//!
//! No walker ever returns an error. Field access failures are turned into
//! either the end of a traversal or an `"error"` placeholder at the exact
//! point where they happen, so a render always finishes with finite output.

pub mod handle;
pub mod list;
pub mod table;
pub mod tree;

pub use handle::{FieldAccessError, ValueHandle};
pub use list::{ListWalker, StopReason};
pub use table::TableWalker;
pub use tree::{TreeWalker, VisitedSet};

/// Placeholder shown for truncation and for the body of a revisited node
pub const ELLIPSIS: &str = "...";

/// Placeholder value for a child link that could not be read
pub const ERROR_TEXT: &str = "error";

/// Lazy entry sequence borrowed from a walker
pub type Entries<'w, H> = Box<dyn Iterator<Item = Entry<H>> + 'w>;

/// Value half of an emitted entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue<H> {
    /// A handle the host may render recursively
    Handle(H),
    /// Terminal text, never dereferenced
    Text(String),
}

/// A labelled entry produced by a walker
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<H> {
    pub label: String,
    pub value: EntryValue<H>,
}

impl<H> Entry<H> {
    pub fn handle(label: impl Into<String>, handle: H) -> Self {
        Entry {
            label: label.into(),
            value: EntryValue::Handle(handle),
        }
    }

    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Entry {
            label: label.into(),
            value: EntryValue::Text(text.into()),
        }
    }

    /// The `("...", "...")` marker appended when a cap cut the walk short
    pub fn truncated() -> Self {
        Entry::text(ELLIPSIS, ELLIPSIS)
    }

    /// Placeholder text, if this entry carries no handle
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Text(text) => Some(text),
            EntryValue::Handle(_) => None,
        }
    }

    pub fn as_handle(&self) -> Option<&H> {
        match &self.value {
            EntryValue::Handle(handle) => Some(handle),
            EntryValue::Text(_) => None,
        }
    }

    pub fn is_truncation(&self) -> bool {
        self.label == ELLIPSIS && self.as_text() == Some(ELLIPSIS)
    }
}

/// How the host should lay out a walker's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayHint {
    /// Children are elements of a sequence: show them inline, don't re-dispatch
    Array,
}

/// A pretty-printer for one structure instance
pub trait Walker<H: ValueHandle> {
    /// One-line label for the structure
    fn summary(&self) -> String;

    /// Lazily enumerate the structure's children
    fn entries(&mut self) -> Entries<'_, H>;

    fn display_hint(&self) -> Option<DisplayHint> {
        None
    }
}
