//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: scene list, keyboard event loop, scroll state
//! - **[`panes`]**: stateless render functions for the structure pane and the
//!   status bar
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The UI never touches a heap: scenes are rendered to
//! [`RenderedLine`](crate::render::RenderedLine)s up front and [`App`] only
//! displays them.

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, RenderedScene};
