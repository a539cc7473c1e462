//! # Introduction
//!
//! memwalk renders pointer structures living in inspected memory (singly
//! linked lists, binary trees and hash tables) as bounded, labelled summaries.
//! It is driven by an inspection host that hands out opaque value handles and
//! displays the entries the walkers produce.
//!
//! ## Pipeline
//!
//! ```text
//! Heap → MemRef (ValueHandle) → Registry → Walker → entries → Renderer → TUI / text
//! ```
//!
//! 1. [`walker`]: the [`walker::ValueHandle`] contract and the three walkers.
//!    Every walker terminates with finite output no matter how broken the
//!    memory is.
//! 2. [`registry`]: maps a type name to the walker (and field layout) that
//!    renders it; one process-wide instance.
//! 3. [`render`]: the host loop that dispatches through the registry and
//!    recurses into yielded handles.
//! 4. [`memory`]: a tagged-value heap with tombstones, exposing
//!    [`memory::MemRef`] handles.
//! 5. [`demo`]: sample scenes, healthy and corrupt, used by the binary.
//! 6. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Failure model
//!
//! Field reads fail all the time in inspected memory. A failure is handled
//! where it happens: it ends a list, becomes an `"error"` child in a tree, or
//! collapses a hash table to a single error entry. Caps produce a `"..."`
//! marker; revisited tree nodes produce `"circular"`.

pub mod config;
pub mod constants;
pub mod demo;
pub mod memory;
pub mod registry;
pub mod render;
pub mod ui;
pub mod walker;
