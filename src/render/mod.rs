//! Host-side rendering of walker output
//!
//! The walkers only describe one level of a structure. This module plays the
//! host: it looks up a walker for a value through the [`Registry`], drains its
//! entries, and recurses into every yielded handle, producing a flat list of
//! indented [`RenderedLine`]s.
//!
//! # Bounds
//!
//! - List and table walkers cap their own width.
//! - Tree walkers share one [`VisitedSet`] per [`render`] call, so a cycle is
//!   cut the second time a node is reached.
//! - List and table roots are tracked by the renderer itself in a second set.
//!   A root reached again shows its summary over a `circular = ...` line
//!   instead of being expanded.
//! - Nesting deeper than [`RenderOptions::max_depth`] is shown as `{...}`.

use crate::constants::DEFAULT_MAX_DEPTH;
use crate::registry::{Registry, WalkerKind};
use crate::walker::{DisplayHint, Entry, EntryValue, ValueHandle, VisitedSet, ELLIPSIS};
use std::fmt;
use tracing::debug;

/// Text shown in place of a value nested past the depth limit
pub const DEPTH_ELIDED: &str = "{...}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What produced a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A walker's one-line summary
    Summary,
    /// A value shown through `display_scalar`
    Scalar,
    /// Placeholder text emitted by a walker or by the depth limit
    Placeholder,
}

/// One line of rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub depth: usize,
    pub label: String,
    pub text: String,
    pub kind: LineKind,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}{} = {}",
            "",
            self.label,
            self.text,
            indent = self.depth * 2
        )
    }
}

struct Context<'r, I> {
    registry: &'r Registry,
    options: RenderOptions,
    visited: VisitedSet<I>,
    /// List and table roots already expanded
    expanded: VisitedSet<I>,
    lines: Vec<RenderedLine>,
}

impl<I> Context<'_, I> {
    fn push(&mut self, depth: usize, label: &str, text: String, kind: LineKind) {
        self.lines.push(RenderedLine {
            depth,
            label: label.to_string(),
            text,
            kind,
        });
    }
}

/// Render `root` and everything reachable from it
pub fn render<H: ValueHandle>(
    registry: &Registry,
    label: &str,
    root: H,
    options: RenderOptions,
) -> Vec<RenderedLine> {
    let mut ctx = Context {
        registry,
        options,
        visited: VisitedSet::new(),
        expanded: VisitedSet::new(),
        lines: Vec::new(),
    };
    render_value(&mut ctx, label, root, 0);
    ctx.lines
}

/// Render to indented plain text, one line per entry
pub fn render_to_string<H: ValueHandle>(
    registry: &Registry,
    label: &str,
    root: H,
    options: RenderOptions,
) -> String {
    let mut out = String::new();
    for line in render(registry, label, root, options) {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

fn render_value<H: ValueHandle>(
    ctx: &mut Context<'_, H::Identity>,
    label: &str,
    value: H,
    depth: usize,
) {
    if depth > ctx.options.max_depth {
        debug!(depth, label, "render depth limit reached");
        ctx.push(depth, label, DEPTH_ELIDED.to_string(), LineKind::Placeholder);
        return;
    }

    let Some(mut walker) = ctx.registry.build(value.clone(), &ctx.visited) else {
        ctx.push(depth, label, value.display_scalar(), LineKind::Scalar);
        return;
    };

    if is_repeat(ctx, &value) {
        debug!(label, "structure already expanded");
        // Drained only so a list summary reports its node count
        walker.entries().for_each(drop);
        ctx.push(depth, label, walker.summary(), LineKind::Summary);
        ctx.push(
            depth + 1,
            "circular",
            ELLIPSIS.to_string(),
            LineKind::Placeholder,
        );
        return;
    }

    // Drain first: the list summary counts what was emitted
    let entries: Vec<Entry<H>> = walker.entries().collect();
    ctx.push(depth, label, walker.summary(), LineKind::Summary);
    let inline = walker.display_hint() == Some(DisplayHint::Array);

    for entry in entries {
        match entry.value {
            EntryValue::Text(text) => {
                ctx.push(depth + 1, &entry.label, text, LineKind::Placeholder)
            }
            EntryValue::Handle(handle) if inline => ctx.push(
                depth + 1,
                &entry.label,
                handle.display_scalar(),
                LineKind::Scalar,
            ),
            EntryValue::Handle(handle) => render_value(ctx, &entry.label, handle, depth + 1),
        }
    }
}

/// Record a list or table root, returning `true` if it was seen before
///
/// Tree nodes are left to their walker's own visited set. A root without a
/// readable identity is always expanded; its walker reports the failure.
fn is_repeat<H: ValueHandle>(ctx: &Context<'_, H::Identity>, value: &H) -> bool {
    let tracked = value.type_name().is_some_and(|name| {
        matches!(
            ctx.registry.lookup(&name),
            Some(WalkerKind::List(_) | WalkerKind::Table(_))
        )
    });
    if !tracked {
        return false;
    }
    match value.identity() {
        Ok(id) => !ctx.expanded.insert(id),
        Err(_) => false,
    }
}
