//! Walker configuration
//!
//! Each walker is configured once, at construction, with the field names it
//! interprets as structural links. Every name has a default matching the usual
//! C layout (`next`, `left`/`right`/`key`, `buckets`/`size`/`capacity`) and can
//! be overridden per registration.

use crate::constants::{DEFAULT_LIST_LIMIT, DEFAULT_TABLE_LIMIT};

/// Layout of a singly linked list node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub next_field: String,
    pub limit: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            next_field: "next".to_string(),
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListConfig {
    pub fn with_next_field(mut self, name: impl Into<String>) -> Self {
        self.next_field = name.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Layout of a binary tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    pub left_field: String,
    pub right_field: String,
    pub key_field: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            left_field: "left".to_string(),
            right_field: "right".to_string(),
            key_field: "key".to_string(),
        }
    }
}

impl TreeConfig {
    pub fn with_left_field(mut self, name: impl Into<String>) -> Self {
        self.left_field = name.into();
        self
    }

    pub fn with_right_field(mut self, name: impl Into<String>) -> Self {
        self.right_field = name.into();
        self
    }

    pub fn with_key_field(mut self, name: impl Into<String>) -> Self {
        self.key_field = name.into();
        self
    }
}

/// Layout of an open hash table header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub buckets_field: String,
    pub size_field: String,
    pub capacity_field: String,
    /// Upper bound on shown buckets; the effective cap is `min(capacity, limit)`
    pub limit: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            buckets_field: "buckets".to_string(),
            size_field: "size".to_string(),
            capacity_field: "capacity".to_string(),
            limit: DEFAULT_TABLE_LIMIT,
        }
    }
}

impl TableConfig {
    pub fn with_buckets_field(mut self, name: impl Into<String>) -> Self {
        self.buckets_field = name.into();
        self
    }

    pub fn with_size_field(mut self, name: impl Into<String>) -> Self {
        self.size_field = name.into();
        self
    }

    pub fn with_capacity_field(mut self, name: impl Into<String>) -> Self {
        self.capacity_field = name.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}
