//! TUI pane rendering modules
//!
//! - [`structure`]: the rendered structure tree of the current scene
//! - [`status`]: status bar with keybindings and scene position
//!
//! Each pane module exports a primary `render_*` function plus the state it
//! keeps between frames.

pub mod status;
pub mod structure;

pub use status::render_status_bar;
pub use structure::{render_structure_pane, StructureScrollState};
