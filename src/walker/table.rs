//! Hash table walker
//!
//! Scans bucket slots `0..capacity` in order and emits only the occupied ones
//! as `bucket[i]`, showing at most `min(capacity, limit)` of them. A table
//! whose header cannot be read collapses to a single `("error", message)`.

use super::{Entries, Entry, ValueHandle, Walker};
use crate::config::TableConfig;
use tracing::debug;

/// Walker for an open hash table header
#[derive(Debug)]
pub struct TableWalker<H> {
    table: H,
    config: TableConfig,
}

impl<H: ValueHandle> TableWalker<H> {
    pub fn new(table: H) -> Self {
        Self::with_config(table, TableConfig::default())
    }

    pub fn with_config(table: H, config: TableConfig) -> Self {
        TableWalker { table, config }
    }
}

impl<H: ValueHandle> Walker<H> for TableWalker<H> {
    fn summary(&self) -> String {
        // Shown as stored, even when negative; only the scan needs a count
        let size = self
            .table
            .field(&self.config.size_field)
            .map(|v| v.display_scalar());
        let capacity = self
            .table
            .field(&self.config.capacity_field)
            .map(|v| v.display_scalar());

        match (size, capacity) {
            (Ok(size), Ok(capacity)) => {
                format!("HashMap(size={}, capacity={})", size, capacity)
            }
            _ => "HashMap".to_string(),
        }
    }

    fn entries(&mut self) -> Entries<'_, H> {
        Box::new(TableEntries {
            walker: self,
            scan: Scan::Start,
        })
    }
}

enum Scan<H> {
    Start,
    Buckets {
        buckets: H,
        capacity: usize,
        cap: usize,
        index: usize,
        emitted: usize,
    },
    Done,
}

struct TableEntries<'w, H> {
    walker: &'w TableWalker<H>,
    scan: Scan<H>,
}

impl<H: ValueHandle> TableEntries<'_, H> {
    fn open(&self) -> Result<Scan<H>, String> {
        let config = &self.walker.config;
        let buckets = self
            .walker
            .table
            .field(&config.buckets_field)
            .map_err(|e| e.to_string())?;
        let capacity = self
            .walker
            .table
            .field(&config.capacity_field)
            .and_then(|v| v.as_count())
            .map_err(|e| e.to_string())?;

        Ok(Scan::Buckets {
            buckets,
            capacity,
            cap: capacity.min(config.limit),
            index: 0,
            emitted: 0,
        })
    }
}

impl<H: ValueHandle> Iterator for TableEntries<'_, H> {
    type Item = Entry<H>;

    fn next(&mut self) -> Option<Entry<H>> {
        if let Scan::Start = self.scan {
            match self.open() {
                Ok(scan) => self.scan = scan,
                Err(message) => {
                    debug!(%message, "hash table header unreadable");
                    self.scan = Scan::Done;
                    return Some(Entry::text("error", message));
                }
            }
        }

        let Scan::Buckets {
            buckets,
            capacity,
            cap,
            index,
            emitted,
        } = &mut self.scan
        else {
            return None;
        };

        loop {
            if *emitted >= *cap {
                let truncated = *index < *capacity;
                if truncated {
                    debug!(cap = *cap, capacity = *capacity, "hash table truncated");
                }
                self.scan = Scan::Done;
                return truncated.then(Entry::truncated);
            }
            if *index >= *capacity {
                self.scan = Scan::Done;
                return None;
            }

            let slot = *index;
            *index += 1;
            match buckets.index(slot) {
                Ok(bucket) if bucket.is_truthy() => {
                    *emitted += 1;
                    return Some(Entry::handle(format!("bucket[{}]", slot), bucket));
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(%err, slot, "hash table bucket unreadable");
                    self.scan = Scan::Done;
                    return Some(Entry::text("error", err.to_string()));
                }
            }
        }
    }
}
