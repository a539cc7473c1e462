//! Binary tree node walker
//!
//! A [`TreeWalker`] renders one node: its key, then its `left` and `right`
//! children as handles the host descends into. Descendants are rendered by
//! walkers created with [`TreeWalker::child`], which share the parent's
//! [`VisitedSet`]. A node whose identity is already in the set is reported as
//! `("circular", "...")` and not expanded again, which bounds any render over
//! a finite set of addresses without limiting depth.
//!
//! A child field that reads as null is simply omitted; a child field that
//! cannot be read at all becomes `("left", "error")` / `("right", "error")`.

use super::{Entries, Entry, ValueHandle, Walker, ELLIPSIS, ERROR_TEXT};
use crate::config::TreeConfig;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Identities of the nodes already expanded during one top-level render
///
/// Cloning shares the underlying set.
pub struct VisitedSet<I> {
    inner: Rc<RefCell<FxHashSet<I>>>,
}

impl<I: Eq + std::hash::Hash> VisitedSet<I> {
    pub fn new() -> Self {
        VisitedSet {
            inner: Rc::new(RefCell::new(FxHashSet::default())),
        }
    }

    /// Record `id`; returns `false` if it was already present
    pub fn insert(&self, id: I) -> bool {
        self.inner.borrow_mut().insert(id)
    }

    pub fn contains(&self, id: &I) -> bool {
        self.inner.borrow().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<I: Eq + std::hash::Hash> Default for VisitedSet<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for VisitedSet<I> {
    fn clone(&self) -> Self {
        VisitedSet {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<I: fmt::Debug> fmt::Debug for VisitedSet<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.borrow().iter()).finish()
    }
}

/// Walker for a single binary tree node
#[derive(Debug)]
pub struct TreeWalker<H: ValueHandle> {
    node: H,
    config: TreeConfig,
    visited: VisitedSet<H::Identity>,
}

impl<H: ValueHandle> TreeWalker<H> {
    /// Walker for a tree root, starting a fresh visited set
    pub fn new(node: H) -> Self {
        Self::with_config(node, TreeConfig::default())
    }

    pub fn with_config(node: H, config: TreeConfig) -> Self {
        Self::with_visited(node, config, VisitedSet::new())
    }

    /// Walker that records into an existing render's visited set
    pub fn with_visited(node: H, config: TreeConfig, visited: VisitedSet<H::Identity>) -> Self {
        TreeWalker {
            node,
            config,
            visited,
        }
    }

    /// Walker for a descendant of this node within the same render
    pub fn child(&self, node: H) -> Self {
        Self::with_visited(node, self.config.clone(), self.visited.clone())
    }

    pub fn visited(&self) -> &VisitedSet<H::Identity> {
        &self.visited
    }
}

impl<H: ValueHandle> Walker<H> for TreeWalker<H> {
    fn summary(&self) -> String {
        match self.node.field(&self.config.key_field) {
            Ok(key) => format!("TreeNode(key={})", key.display_scalar()),
            Err(_) => "TreeNode".to_string(),
        }
    }

    fn entries(&mut self) -> Entries<'_, H> {
        Box::new(TreeEntries {
            walker: self,
            stage: Stage::Start,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Key,
    Left,
    Right,
    Done,
}

struct TreeEntries<'w, H: ValueHandle> {
    walker: &'w TreeWalker<H>,
    stage: Stage,
}

impl<H: ValueHandle> TreeEntries<'_, H> {
    /// Child link entry: handle if set, nothing if null, `"error"` if unreadable
    fn child_entry(&self, label: &str, field: &str) -> Option<Entry<H>> {
        match self.walker.node.field(field) {
            Ok(child) if child.is_truthy() => Some(Entry::handle(label, child)),
            Ok(_) => None,
            Err(err) => {
                trace!(%err, field, "tree child unreadable");
                Some(Entry::text(label, ERROR_TEXT))
            }
        }
    }
}

impl<H: ValueHandle> Iterator for TreeEntries<'_, H> {
    type Item = Entry<H>;

    fn next(&mut self) -> Option<Entry<H>> {
        let walker = self.walker;
        loop {
            match self.stage {
                Stage::Start => {
                    self.stage = Stage::Done;
                    if !walker.node.is_truthy() {
                        return None;
                    }
                    let id = match walker.node.identity() {
                        Ok(id) => id,
                        Err(err) => {
                            debug!(%err, "tree node inaccessible");
                            return Some(Entry::text("error", "Cannot access tree node"));
                        }
                    };
                    if !walker.visited.insert(id.clone()) {
                        debug!(?id, "tree node already visited");
                        return Some(Entry::text("circular", ELLIPSIS));
                    }
                    self.stage = Stage::Key;
                }
                Stage::Key => {
                    self.stage = Stage::Left;
                    match walker.node.field(&walker.config.key_field) {
                        Ok(key) => return Some(Entry::handle(walker.config.key_field.clone(), key)),
                        Err(err) => trace!(%err, "tree key unreadable"),
                    }
                }
                Stage::Left => {
                    self.stage = Stage::Right;
                    if let Some(entry) = self.child_entry("left", &walker.config.left_field) {
                        return Some(entry);
                    }
                }
                Stage::Right => {
                    self.stage = Stage::Done;
                    return self.child_entry("right", &walker.config.right_field);
                }
                Stage::Done => return None,
            }
        }
    }
}
