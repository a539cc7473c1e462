//! Memory model for the inspection host
//!
//! This module provides the memory the walkers are pointed at:
//! - [`value`]: Tagged value representation (Int, Char, Pointer, Struct, Array)
//! - [`heap`]: Typed heap blocks with allocation, free and tombstone tracking
//!
//! [`MemRef`] is the host's [`ValueHandle`]: a value read out of the heap,
//! remembering which block it came from. Field and index access dereference
//! pointers on the fly, so a walker can follow `node->next` without knowing
//! anything about the heap.
//!
//! # Failure Mapping
//!
//! | Situation                          | Result                           |
//! |------------------------------------|----------------------------------|
//! | field not in the struct            | [`FieldAccessError::Missing`]    |
//! | field or slot never written        | [`FieldAccessError::Unreadable`] |
//! | pointer to a freed / unknown block | [`FieldAccessError::Unreadable`] |
//! | slot index past the end            | [`FieldAccessError::OutOfBounds`]|
//! | field access on a scalar           | [`FieldAccessError::NotAStruct`] |

pub mod heap;
pub mod value;

use crate::walker::{FieldAccessError, ValueHandle};
use heap::Heap;
use std::fmt;
use value::{Address, Value};

/// A value read out of a [`Heap`]
#[derive(Clone)]
pub struct MemRef<'h> {
    heap: &'h Heap,
    value: Value,
    /// Block this value was read from, if any
    origin: Option<Address>,
}

impl<'h> MemRef<'h> {
    /// Wrap a value that does not live in any block
    pub fn new(heap: &'h Heap, value: Value) -> Self {
        MemRef {
            heap,
            value,
            origin: None,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn origin(&self) -> Option<Address> {
        self.origin
    }

    /// Resolve pointers to the value they reference, together with its block
    fn target(&self, what: &str) -> Result<(&Value, Option<Address>), FieldAccessError> {
        match &self.value {
            Value::Pointer(0) | Value::Null => Err(FieldAccessError::unreadable(
                what,
                "null pointer dereference",
            )),
            Value::Pointer(addr) => {
                let block = self
                    .heap
                    .get_block(*addr)
                    .map_err(|e| FieldAccessError::unreadable(what, e.to_string()))?;
                Ok((&block.value, Some(*addr)))
            }
            Value::Uninitialized => Err(FieldAccessError::unreadable(what, "uninitialized read")),
            other => Ok((other, self.origin)),
        }
    }

    fn child(
        &self,
        value: &Value,
        origin: Option<Address>,
        what: &str,
    ) -> Result<Self, FieldAccessError> {
        if !value.is_initialized() {
            return Err(FieldAccessError::unreadable(what, "uninitialized read"));
        }
        Ok(MemRef {
            heap: self.heap,
            value: value.clone(),
            origin,
        })
    }
}

impl ValueHandle for MemRef<'_> {
    type Identity = Address;

    fn field(&self, name: &str) -> Result<Self, FieldAccessError> {
        let (target, origin) = self.target(name)?;
        match target {
            Value::Struct(fields) => {
                let value = fields.get(name).ok_or_else(|| FieldAccessError::missing(name))?;
                self.child(value, origin, name)
            }
            other => Err(FieldAccessError::NotAStruct {
                what: name.to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    fn index(&self, index: usize) -> Result<Self, FieldAccessError> {
        let what = format!("[{}]", index);
        let (target, origin) = self.target(&what)?;
        match target {
            Value::Array(slots) => {
                let value = slots.get(index).ok_or(FieldAccessError::OutOfBounds {
                    index,
                    len: slots.len(),
                })?;
                self.child(value, origin, &what)
            }
            other => Err(FieldAccessError::NotAStruct {
                what,
                found: other.kind().to_string(),
            }),
        }
    }

    fn is_truthy(&self) -> bool {
        match &self.value {
            Value::Int(n) => *n != 0,
            Value::Char(c) => *c != 0,
            Value::Pointer(addr) => *addr != 0,
            Value::Null | Value::Uninitialized => false,
            Value::Struct(_) | Value::Array(_) => true,
        }
    }

    fn identity(&self) -> Result<Address, FieldAccessError> {
        match &self.value {
            Value::Pointer(addr) if *addr != 0 => self
                .heap
                .get_block(*addr)
                .map(|_| *addr)
                .map_err(|e| FieldAccessError::unreadable("node", e.to_string())),
            Value::Pointer(_) | Value::Null => {
                Err(FieldAccessError::unreadable("node", "null pointer"))
            }
            _ => self
                .origin
                .ok_or_else(|| FieldAccessError::unreadable("node", "value has no address")),
        }
    }

    fn display_scalar(&self) -> String {
        match &self.value {
            Value::Pointer(addr) if *addr != 0 => match self.heap.get_block(*addr) {
                Ok(block) => format!("0x{:08x} {}", addr, block.value),
                Err(_) => format!("0x{:08x} <dangling>", addr),
            },
            other => other.to_string(),
        }
    }

    fn as_count(&self) -> Result<usize, FieldAccessError> {
        let n = match &self.value {
            Value::Int(n) => i64::from(*n),
            Value::Char(c) => i64::from(*c),
            other => {
                return Err(FieldAccessError::NotACount {
                    found: other.kind().to_string(),
                })
            }
        };
        usize::try_from(n).map_err(|_| FieldAccessError::NotACount {
            found: n.to_string(),
        })
    }

    /// Freed blocks keep their type, so a dangling link still dispatches
    fn type_name(&self) -> Option<String> {
        let addr = self.value.as_pointer().filter(|addr| *addr != 0)?;
        self.heap
            .allocations()
            .get(&addr)
            .map(|block| block.type_name.clone())
    }
}

impl fmt::Debug for MemRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemRef")
            .field("value", &self.value)
            .field("origin", &self.origin.map(|a| format!("0x{:08x}", a)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_pair(heap: &mut Heap) -> (Address, Address) {
        let b = heap
            .allocate(
                "struct Node",
                Value::record([("value", Value::Int(2)), ("next", Value::Null)]),
            )
            .unwrap();
        let a = heap
            .allocate(
                "struct Node",
                Value::record([("value", Value::Int(1)), ("next", Value::pointer(b))]),
            )
            .unwrap();
        (a, b)
    }

    #[test]
    fn test_field_follows_pointers() {
        let mut heap = Heap::default();
        let (a, b) = linked_pair(&mut heap);
        let root = heap.root(a);

        let next = root.field("next").unwrap();
        assert_eq!(next.value(), &Value::Pointer(b));
        assert_eq!(next.origin(), Some(a));
        assert_eq!(next.field("value").unwrap().display_scalar(), "2");
        assert_eq!(root.type_name().as_deref(), Some("struct Node"));
    }

    #[test]
    fn test_truthiness() {
        let heap = Heap::default();
        assert!(!MemRef::new(&heap, Value::Null).is_truthy());
        assert!(!MemRef::new(&heap, Value::Int(0)).is_truthy());
        assert!(!MemRef::new(&heap, Value::Uninitialized).is_truthy());
        assert!(MemRef::new(&heap, Value::Int(7)).is_truthy());
        assert!(MemRef::new(&heap, Value::Pointer(0x10)).is_truthy());
    }

    #[test]
    fn test_missing_and_uninitialized_fields() {
        let mut heap = Heap::default();
        let a = heap
            .allocate(
                "struct Node",
                Value::record([("next", Value::Uninitialized)]),
            )
            .unwrap();
        let root = heap.root(a);

        assert_eq!(
            root.field("prev").unwrap_err(),
            FieldAccessError::missing("prev")
        );
        assert!(matches!(
            root.field("next"),
            Err(FieldAccessError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_dangling_pointer_is_unreadable() {
        let mut heap = Heap::default();
        let (a, b) = linked_pair(&mut heap);
        heap.free(b).unwrap();

        let next = heap.root(a).field("next").unwrap();
        assert!(next.is_truthy());
        assert!(next.identity().is_err());
        assert!(next.field("value").is_err());
        assert_eq!(next.type_name().as_deref(), Some("struct Node"));
        assert!(next.display_scalar().ends_with("<dangling>"));
    }

    #[test]
    fn test_identity_is_pointee_address() {
        let mut heap = Heap::default();
        let (a, b) = linked_pair(&mut heap);
        let root = heap.root(a);

        assert_eq!(root.identity().unwrap(), a);
        assert_eq!(root.field("next").unwrap().identity().unwrap(), b);
        assert_eq!(root.field("value").unwrap().identity().unwrap(), a);
    }

    #[test]
    fn test_index_and_count() {
        let mut heap = Heap::default();
        let arr = heap
            .allocate(
                "int[3]",
                Value::Array(vec![Value::Int(4), Value::Uninitialized, Value::Int(-1)]),
            )
            .unwrap();
        let root = heap.root(arr);

        assert_eq!(root.index(0).unwrap().as_count().unwrap(), 4);
        assert!(matches!(root.index(1), Err(FieldAccessError::Unreadable { .. })));
        assert!(matches!(
            root.index(2).unwrap().as_count(),
            Err(FieldAccessError::NotACount { .. })
        ));
        assert_eq!(
            root.index(3).unwrap_err(),
            FieldAccessError::OutOfBounds { index: 3, len: 3 }
        );
        assert!(matches!(
            root.index(0).unwrap().field("x"),
            Err(FieldAccessError::NotAStruct { .. })
        ));
    }
}
