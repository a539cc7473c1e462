//! Heap implementation for the inspection host
//!
//! This module provides the memory the walkers read from:
//! - Explicit allocation/deallocation of typed blocks
//! - Tombstone tracking for freed blocks, so dangling pointers stay detectable
//! - Field and slot writes used to link nodes after allocation
//! - Use-after-free and double-free detection
//!
//! Every block records the type name it was allocated as (`struct Node`,
//! `struct Entry *[8]`, ...). Pointers carry no type of their own; a handle to a
//! pointer reports the type of the block it points at.

use super::value::{Address, Value};
use super::MemRef;
use crate::constants::{HEAP_ADDRESS_START, HEAP_BLOCK_ALIGN};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Heap operation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("Out of memory: {allocated} blocks allocated, limit is {limit}")]
    OutOfMemory { allocated: usize, limit: usize },

    #[error("Double free detected at address 0x{0:x}")]
    DoubleFree(Address),

    #[error("Invalid free: address 0x{0:x} was never allocated")]
    InvalidFree(Address),

    #[error("Use-after-free: address 0x{0:x} has been freed")]
    UseAfterFree(Address),

    #[error("Invalid pointer: address 0x{0:x} not allocated")]
    InvalidPointer(Address),

    #[error("Block at 0x{address:x} has no field '{field}'")]
    MissingField { address: Address, field: String },

    #[error("Block at 0x{address:x} holds {found}, not {expected}")]
    WrongShape {
        address: Address,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Index {index} out of bounds for block at 0x{address:x} of length {len}")]
    IndexOutOfBounds {
        address: Address,
        index: usize,
        len: usize,
    },

    #[error("{what} {value} does not fit in an int field")]
    IntOverflow { what: &'static str, value: usize },
}

/// State of a heap block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    Allocated,
    Tombstone, // Freed but kept so stale pointers can be diagnosed
}

/// A block of heap memory
#[derive(Debug, Clone)]
pub struct HeapBlock {
    pub type_name: String,
    pub value: Value,
    pub state: BlockState,
}

impl HeapBlock {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        HeapBlock {
            type_name: type_name.into(),
            value,
            state: BlockState::Allocated,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.state == BlockState::Allocated
    }
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    allocations: FxHashMap<Address, HeapBlock>,
    next_address: Address,
    live_blocks: usize,
    max_blocks: usize,
}

impl Heap {
    /// Create a new heap holding at most `max_blocks` live blocks
    pub fn new(max_blocks: usize) -> Self {
        Heap {
            allocations: FxHashMap::default(),
            next_address: HEAP_ADDRESS_START, // Start heap at high address
            live_blocks: 0,
            max_blocks,
        }
    }

    /// Allocate a block holding `value`
    pub fn allocate(
        &mut self,
        type_name: impl Into<String>,
        value: Value,
    ) -> Result<Address, HeapError> {
        if self.live_blocks >= self.max_blocks {
            return Err(HeapError::OutOfMemory {
                allocated: self.live_blocks,
                limit: self.max_blocks,
            });
        }

        let addr = self.next_address;
        self.next_address += HEAP_BLOCK_ALIGN;
        self.allocations.insert(addr, HeapBlock::new(type_name, value));
        self.live_blocks += 1;

        Ok(addr)
    }

    /// Free a block of memory (mark as tombstone)
    pub fn free(&mut self, addr: Address) -> Result<(), HeapError> {
        match self.allocations.get_mut(&addr) {
            Some(block) if block.is_allocated() => {
                block.state = BlockState::Tombstone;
                self.live_blocks -= 1;
                Ok(())
            }
            Some(_) => Err(HeapError::DoubleFree(addr)),
            None => Err(HeapError::InvalidFree(addr)),
        }
    }

    /// Get a heap block (returns error if tombstone or doesn't exist)
    pub fn get_block(&self, addr: Address) -> Result<&HeapBlock, HeapError> {
        match self.allocations.get(&addr) {
            Some(block) if block.is_allocated() => Ok(block),
            Some(_) => Err(HeapError::UseAfterFree(addr)),
            None => Err(HeapError::InvalidPointer(addr)),
        }
    }

    /// Get a mutable heap block
    pub fn get_block_mut(&mut self, addr: Address) -> Result<&mut HeapBlock, HeapError> {
        match self.allocations.get_mut(&addr) {
            Some(block) if block.is_allocated() => Ok(block),
            Some(_) => Err(HeapError::UseAfterFree(addr)),
            None => Err(HeapError::InvalidPointer(addr)),
        }
    }

    /// Overwrite (or add) a field of a struct block
    pub fn set_field(&mut self, addr: Address, field: &str, value: Value) -> Result<(), HeapError> {
        let block = self.get_block_mut(addr)?;
        match &mut block.value {
            Value::Struct(fields) => {
                fields.insert(field.to_string(), value);
                Ok(())
            }
            other => Err(HeapError::WrongShape {
                address: addr,
                expected: "struct",
                found: other.kind(),
            }),
        }
    }

    /// Remove a field from a struct block, simulating a layout mismatch
    pub fn remove_field(&mut self, addr: Address, field: &str) -> Result<Value, HeapError> {
        let block = self.get_block_mut(addr)?;
        match &mut block.value {
            Value::Struct(fields) => fields.remove(field).ok_or_else(|| HeapError::MissingField {
                address: addr,
                field: field.to_string(),
            }),
            other => Err(HeapError::WrongShape {
                address: addr,
                expected: "struct",
                found: other.kind(),
            }),
        }
    }

    /// Overwrite one slot of an array block
    pub fn set_slot(&mut self, addr: Address, index: usize, value: Value) -> Result<(), HeapError> {
        let block = self.get_block_mut(addr)?;
        match &mut block.value {
            Value::Array(slots) => {
                let len = slots.len();
                let slot = slots.get_mut(index).ok_or(HeapError::IndexOutOfBounds {
                    address: addr,
                    index,
                    len,
                })?;
                *slot = value;
                Ok(())
            }
            other => Err(HeapError::WrongShape {
                address: addr,
                expected: "array",
                found: other.kind(),
            }),
        }
    }

    /// Handle to a pointer at `addr`, the usual starting point of a render
    pub fn root(&self, addr: Address) -> MemRef<'_> {
        MemRef::new(self, Value::pointer(addr))
    }

    /// Get all allocations (includes tombstones)
    pub fn allocations(&self) -> &FxHashMap<Address, HeapBlock> {
        &self.allocations
    }

    /// Number of blocks not yet freed
    pub fn live_blocks(&self) -> usize {
        self.live_blocks
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(value: i32) -> Value {
        Value::record([("value", Value::Int(value)), ("next", Value::Null)])
    }

    #[test]
    fn test_allocate_assigns_distinct_addresses() {
        let mut heap = Heap::default();
        let a = heap.allocate("struct Node", node(1)).unwrap();
        let b = heap.allocate("struct Node", node(2)).unwrap();

        assert_eq!(a, HEAP_ADDRESS_START);
        assert_eq!(b, HEAP_ADDRESS_START + HEAP_BLOCK_ALIGN);
        assert_eq!(heap.live_blocks(), 2);
    }

    #[test]
    fn test_out_of_memory() {
        let mut heap = Heap::new(1);
        heap.allocate("struct Node", node(1)).unwrap();
        let err = heap.allocate("struct Node", node(2)).unwrap_err();
        assert_eq!(
            err,
            HeapError::OutOfMemory {
                allocated: 1,
                limit: 1
            }
        );
    }

    #[test]
    fn test_free_then_use_is_detected() {
        let mut heap = Heap::default();
        let a = heap.allocate("struct Node", node(1)).unwrap();
        heap.free(a).unwrap();

        assert_eq!(heap.get_block(a).unwrap_err(), HeapError::UseAfterFree(a));
        assert_eq!(heap.free(a).unwrap_err(), HeapError::DoubleFree(a));
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn test_invalid_free_and_pointer() {
        let mut heap = Heap::default();
        assert_eq!(heap.free(0xdead).unwrap_err(), HeapError::InvalidFree(0xdead));
        assert_eq!(
            heap.get_block(0xdead).unwrap_err(),
            HeapError::InvalidPointer(0xdead)
        );
    }

    #[test]
    fn test_set_field_links_nodes() {
        let mut heap = Heap::default();
        let a = heap.allocate("struct Node", node(1)).unwrap();
        let b = heap.allocate("struct Node", node(2)).unwrap();
        heap.set_field(a, "next", Value::pointer(b)).unwrap();

        match &heap.get_block(a).unwrap().value {
            Value::Struct(fields) => assert_eq!(fields["next"], Value::Pointer(b)),
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_set_slot_checks_shape_and_bounds() {
        let mut heap = Heap::default();
        let arr = heap
            .allocate("struct Entry *[2]", Value::Array(vec![Value::Null; 2]))
            .unwrap();
        let n = heap.allocate("struct Node", node(1)).unwrap();

        heap.set_slot(arr, 1, Value::pointer(n)).unwrap();
        assert!(matches!(
            heap.set_slot(arr, 2, Value::Null),
            Err(HeapError::IndexOutOfBounds { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            heap.set_slot(n, 0, Value::Null),
            Err(HeapError::WrongShape {
                expected: "array",
                ..
            })
        ));
    }

    #[test]
    fn test_remove_field() {
        let mut heap = Heap::default();
        let a = heap.allocate("struct Node", node(1)).unwrap();
        assert_eq!(heap.remove_field(a, "next").unwrap(), Value::Null);
        assert!(matches!(
            heap.remove_field(a, "next"),
            Err(HeapError::MissingField { .. })
        ));
    }
}
