//! Singly linked list walker
//!
//! Follows the configured `next` field from a root node and emits `[0]`, `[1]`,
//! ... until the chain ends, a link cannot be read, or the node cap is reached.
//! Only the cap produces a visible `("...", "...")` marker; a broken link ends
//! the list exactly like a null one.

use super::{DisplayHint, Entries, Entry, FieldAccessError, ValueHandle, Walker};
use crate::config::ListConfig;
use tracing::{debug, trace};

/// Why the most recent list traversal stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Reached a null / falsy node
    End,
    /// The `next` field of the last emitted node could not be read
    BrokenLink(FieldAccessError),
    /// The node cap was hit while more nodes were reachable
    LimitReached,
}

/// Walker for a chain of nodes linked through one field
#[derive(Debug)]
pub struct ListWalker<H> {
    root: H,
    config: ListConfig,
    count: usize,
    stop: Option<StopReason>,
}

impl<H: ValueHandle> ListWalker<H> {
    pub fn new(root: H) -> Self {
        Self::with_config(root, ListConfig::default())
    }

    pub fn with_config(root: H, config: ListConfig) -> Self {
        ListWalker {
            root,
            config,
            count: 0,
            stop: None,
        }
    }

    /// Nodes emitted by the most recent traversal (so far, if still running)
    pub fn count(&self) -> usize {
        self.count
    }

    /// Set once a traversal has run to completion
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }
}

impl<H: ValueHandle> Walker<H> for ListWalker<H> {
    /// Reflects the last traversal: call after draining [`Walker::entries`]
    fn summary(&self) -> String {
        format!("Linked list with {} nodes", self.count)
    }

    fn entries(&mut self) -> Entries<'_, H> {
        self.count = 0;
        self.stop = None;
        let current = Some(self.root.clone());
        Box::new(ListEntries {
            walker: self,
            current,
            broken: None,
            done: false,
        })
    }

    fn display_hint(&self) -> Option<DisplayHint> {
        Some(DisplayHint::Array)
    }
}

struct ListEntries<'w, H> {
    walker: &'w mut ListWalker<H>,
    current: Option<H>,
    broken: Option<FieldAccessError>,
    done: bool,
}

impl<H> ListEntries<'_, H> {
    fn finish(&mut self, reason: StopReason) {
        self.done = true;
        self.walker.stop = Some(reason);
    }
}

impl<H: ValueHandle> Iterator for ListEntries<'_, H> {
    type Item = Entry<H>;

    fn next(&mut self) -> Option<Entry<H>> {
        if self.done {
            return None;
        }

        let node = match self.current.take() {
            Some(node) if node.is_truthy() => node,
            _ => {
                let reason = match self.broken.take() {
                    Some(err) => StopReason::BrokenLink(err),
                    None => StopReason::End,
                };
                self.finish(reason);
                return None;
            }
        };

        if self.walker.count >= self.walker.config.limit {
            debug!(limit = self.walker.config.limit, "linked list truncated");
            self.finish(StopReason::LimitReached);
            return Some(Entry::truncated());
        }

        let label = format!("[{}]", self.walker.count);
        self.walker.count += 1;

        match node.field(&self.walker.config.next_field) {
            Ok(next) => self.current = Some(next),
            Err(err) => {
                trace!(%err, index = self.walker.count - 1, "list link unreadable");
                self.broken = Some(err);
            }
        }

        Some(Entry::handle(label, node))
    }
}
