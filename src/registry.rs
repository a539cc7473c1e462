//! Printer registry
//!
//! Maps a structural type name (as reported by [`ValueHandle::type_name`]) to
//! the walker that renders it. The process-wide instance is set once at
//! start-up with [`init`] and read through [`global`] afterwards.
//!
//! Registrations can also be written as text, which is how the command line
//! overrides field names:
//!
//! ```text
//! struct Link=list:next=succ,limit=5
//! struct Bst=tree:left=lo,right=hi,key=id
//! struct Dict=table:buckets=slots,size=len,capacity=cap
//! ```

use crate::config::{ListConfig, TableConfig, TreeConfig};
use crate::walker::{ListWalker, TableWalker, TreeWalker, ValueHandle, VisitedSet, Walker};
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Malformed textual registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected TYPE=KIND[:key=value,...], got '{0}'")]
    MissingKind(String),

    #[error("empty type name in '{0}'")]
    EmptyTypeName(String),

    #[error("unknown printer kind '{0}' (expected list, tree or table)")]
    UnknownKind(String),

    #[error("unknown option '{key}' for {kind} printer")]
    UnknownOption { kind: &'static str, key: String },

    #[error("option '{0}' needs a value")]
    MissingValue(String),

    #[error("invalid limit '{0}'")]
    InvalidLimit(String),
}

/// Which walker renders a type, and with which layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkerKind {
    List(ListConfig),
    Tree(TreeConfig),
    Table(TableConfig),
}

impl WalkerKind {
    pub fn name(&self) -> &'static str {
        match self {
            WalkerKind::List(_) => "list",
            WalkerKind::Tree(_) => "tree",
            WalkerKind::Table(_) => "table",
        }
    }
}

/// Type name -> walker mapping
#[derive(Debug, Clone, Default)]
pub struct Registry {
    printers: FxHashMap<String, WalkerKind>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock C layouts
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        for name in ["struct Node", "struct ListNode", "struct Entry"] {
            registry.register(name, WalkerKind::List(ListConfig::default()));
        }
        registry.register("struct TreeNode", WalkerKind::Tree(TreeConfig::default()));
        for name in ["struct HashMap", "struct HashTable"] {
            registry.register(name, WalkerKind::Table(TableConfig::default()));
        }
        registry
    }

    /// Add or replace the printer for `type_name`
    pub fn register(&mut self, type_name: impl Into<String>, kind: WalkerKind) {
        self.printers.insert(type_name.into(), kind);
    }

    /// Parse and add a textual registration
    pub fn register_spec(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (type_name, kind) = parse_registration(spec)?;
        self.register(type_name, kind);
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Option<&WalkerKind> {
        self.printers.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    /// Build the walker registered for `value`'s type
    ///
    /// Tree walkers record into `visited`, which the caller keeps for the
    /// duration of one render.
    pub fn build<'a, H>(
        &self,
        value: H,
        visited: &VisitedSet<H::Identity>,
    ) -> Option<Box<dyn Walker<H> + 'a>>
    where
        H: ValueHandle + 'a,
    {
        let type_name = value.type_name()?;
        let Some(kind) = self.lookup(&type_name) else {
            debug!(%type_name, "no printer registered");
            return None;
        };

        let walker: Box<dyn Walker<H> + 'a> = match kind {
            WalkerKind::List(config) => Box::new(ListWalker::with_config(value, config.clone())),
            WalkerKind::Tree(config) => Box::new(TreeWalker::with_visited(
                value,
                config.clone(),
                visited.clone(),
            )),
            WalkerKind::Table(config) => {
                Box::new(TableWalker::with_config(value, config.clone()))
            }
        };
        Some(walker)
    }
}

/// Parse `TYPE=KIND[:key=value,...]`
///
/// The type name may contain spaces, `*` and `::`; it ends at the first `=`.
pub fn parse_registration(spec: &str) -> Result<(String, WalkerKind), ConfigError> {
    let (type_name, rest) = spec
        .split_once('=')
        .ok_or_else(|| ConfigError::MissingKind(spec.to_string()))?;
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(ConfigError::EmptyTypeName(spec.to_string()));
    }
    let (kind, options) = match rest.split_once(':') {
        Some((kind, options)) => (kind, Some(options)),
        None => (rest, None),
    };

    let mut kind = match kind.trim() {
        "list" => WalkerKind::List(ListConfig::default()),
        "tree" => WalkerKind::Tree(TreeConfig::default()),
        "table" => WalkerKind::Table(TableConfig::default()),
        other => return Err(ConfigError::UnknownKind(other.to_string())),
    };

    for option in options
        .into_iter()
        .flat_map(|o| o.split(','))
        .map(str::trim)
        .filter(|o| !o.is_empty())
    {
        let (key, value) = option
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(_, v)| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingValue(option.to_string()))?;
        apply_option(&mut kind, key, value)?;
    }

    Ok((type_name.to_string(), kind))
}

fn apply_option(kind: &mut WalkerKind, key: &str, value: &str) -> Result<(), ConfigError> {
    let kind_name = kind.name();
    let unknown = || ConfigError::UnknownOption {
        kind: kind_name,
        key: key.to_string(),
    };
    let limit = || {
        value
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidLimit(value.to_string()))
    };

    match kind {
        WalkerKind::List(config) => match key {
            "next" | "next_field" => config.next_field = value.to_string(),
            "limit" => config.limit = limit()?,
            _ => return Err(unknown()),
        },
        WalkerKind::Tree(config) => match key {
            "left" | "left_field" => config.left_field = value.to_string(),
            "right" | "right_field" => config.right_field = value.to_string(),
            "key" | "key_field" => config.key_field = value.to_string(),
            _ => return Err(unknown()),
        },
        WalkerKind::Table(config) => match key {
            "buckets" | "buckets_field" => config.buckets_field = value.to_string(),
            "size" | "size_field" => config.size_field = value.to_string(),
            "capacity" | "capacity_field" => config.capacity_field = value.to_string(),
            "limit" => config.limit = limit()?,
            _ => return Err(unknown()),
        },
    }
    Ok(())
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry; fails if one is already in place
pub fn init(registry: Registry) -> Result<(), Registry> {
    GLOBAL.set(registry)
}

/// The process-wide registry, falling back to [`Registry::with_defaults`]
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::with_defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_stock_layouts() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.len(), 6);
        assert_eq!(
            registry.lookup("struct Node"),
            Some(&WalkerKind::List(ListConfig::default()))
        );
        assert_eq!(
            registry.lookup("struct TreeNode"),
            Some(&WalkerKind::Tree(TreeConfig::default()))
        );
        assert!(matches!(
            registry.lookup("struct HashTable"),
            Some(WalkerKind::Table(_))
        ));
        assert!(registry.lookup("struct Point").is_none());
    }

    #[test]
    fn test_parse_list_with_options() {
        let (name, kind) = parse_registration("struct Link=list:next=succ, limit=5").unwrap();
        assert_eq!(name, "struct Link");
        assert_eq!(
            kind,
            WalkerKind::List(ListConfig::default().with_next_field("succ").with_limit(5))
        );
    }

    #[test]
    fn test_parse_tree_and_table() {
        let (_, tree) = parse_registration("struct Bst=tree:left=lo,right=hi,key=id").unwrap();
        assert_eq!(
            tree,
            WalkerKind::Tree(
                TreeConfig::default()
                    .with_left_field("lo")
                    .with_right_field("hi")
                    .with_key_field("id")
            )
        );

        let (name, table) = parse_registration("struct Dict *=table").unwrap();
        assert_eq!(name, "struct Dict *");
        assert_eq!(table, WalkerKind::Table(TableConfig::default()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_registration("struct Foo"),
            Err(ConfigError::MissingKind(_))
        ));
        assert!(matches!(
            parse_registration("=list"),
            Err(ConfigError::EmptyTypeName(_))
        ));
        assert_eq!(
            parse_registration("struct Foo=graph"),
            Err(ConfigError::UnknownKind("graph".to_string()))
        );
        assert_eq!(
            parse_registration("struct Foo=tree:next=n"),
            Err(ConfigError::UnknownOption {
                kind: "tree",
                key: "next".to_string()
            })
        );
        assert!(matches!(
            parse_registration("struct Foo=list:limit=lots"),
            Err(ConfigError::InvalidLimit(_))
        ));
        assert!(matches!(
            parse_registration("struct Foo=list:next"),
            Err(ConfigError::MissingValue(_))
        ));
    }

    #[test]
    fn test_register_spec_overrides_default() {
        let mut registry = Registry::with_defaults();
        registry.register_spec("struct Node=list:limit=3").unwrap();
        assert_eq!(
            registry.lookup("struct Node"),
            Some(&WalkerKind::List(ListConfig::default().with_limit(3)))
        );
    }

    #[test]
    fn test_global_is_initialized_once() {
        let registry = global();
        assert!(registry.lookup("struct Node").is_some());
        assert!(init(Registry::new()).is_err());
    }
}
