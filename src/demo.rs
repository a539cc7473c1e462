//! Sample structures for the `memwalk` binary
//!
//! Each [`Scene`] owns a [`Heap`] with one structure laid out the way a C
//! program would leave it, including deliberately damaged ones: truncated
//! chains, uninitialized links, freed nodes, cycles and headers with a missing
//! field.

use crate::memory::heap::{Heap, HeapError};
use crate::memory::value::{Address, Value};

/// Names accepted on the command line, in display order
pub const SCENE_NAMES: [&str; 9] = [
    "list",
    "long-list",
    "broken-list",
    "tree",
    "cyclic-tree",
    "corrupt-tree",
    "table",
    "large-table",
    "corrupt-table",
];

/// A heap plus the variables that point into it
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: &'static str,
    pub description: &'static str,
    pub heap: Heap,
    pub roots: Vec<(String, Address)>,
}

impl Scene {
    fn new(name: &'static str, description: &'static str, heap: Heap) -> Self {
        Scene {
            name,
            description,
            heap,
            roots: Vec::new(),
        }
    }

    fn with_root(mut self, label: &str, addr: Address) -> Self {
        self.roots.push((label.to_string(), addr));
        self
    }
}

/// Build a scene by name
pub fn build(name: &str) -> Option<Result<Scene, HeapError>> {
    let scene = match name {
        "list" => list_scene(),
        "long-list" => long_list_scene(),
        "broken-list" => broken_list_scene(),
        "tree" => tree_scene(),
        "cyclic-tree" => cyclic_tree_scene(),
        "corrupt-tree" => corrupt_tree_scene(),
        "table" => table_scene(),
        "large-table" => large_table_scene(),
        "corrupt-table" => corrupt_table_scene(),
        _ => return None,
    };
    Some(scene)
}

/// Build every scene in [`SCENE_NAMES`] order
pub fn build_all() -> Result<Vec<Scene>, HeapError> {
    SCENE_NAMES
        .iter()
        .filter_map(|name| build(name))
        .collect()
}

/// Allocate `values` as a `struct Node` chain and return the head
pub fn alloc_list(heap: &mut Heap, values: &[i32]) -> Result<Address, HeapError> {
    let mut next = Value::Null;
    let mut head = 0;
    for &value in values.iter().rev() {
        head = heap.allocate(
            "struct Node",
            Value::record([("value", Value::Int(value)), ("next", next)]),
        )?;
        next = Value::pointer(head);
    }
    Ok(head)
}

/// Allocate a `struct TreeNode` with null children
pub fn alloc_tree_node(heap: &mut Heap, key: i32) -> Result<Address, HeapError> {
    heap.allocate(
        "struct TreeNode",
        Value::record([
            ("key", Value::Int(key)),
            ("left", Value::Null),
            ("right", Value::Null),
        ]),
    )
}

/// Insert `key` into the binary search tree rooted at `root`
pub fn bst_insert(heap: &mut Heap, root: Address, key: i32) -> Result<Address, HeapError> {
    let node = alloc_tree_node(heap, key)?;
    let mut current = root;
    loop {
        let (current_key, left, right) = match &heap.get_block(current)?.value {
            Value::Struct(fields) => (
                fields.get("key").and_then(Value::as_int).unwrap_or_default(),
                fields.get("left").and_then(Value::as_pointer).unwrap_or(0),
                fields.get("right").and_then(Value::as_pointer).unwrap_or(0),
            ),
            _ => return Ok(node),
        };
        let (side, child) = if key < current_key {
            ("left", left)
        } else {
            ("right", right)
        };
        if child == 0 {
            heap.set_field(current, side, Value::pointer(node))?;
            return Ok(node);
        }
        current = child;
    }
}

/// Allocate a `struct HashMap` with `capacity` buckets of `struct Entry` chains
///
/// `entries` are `(key, value)` pairs placed at `key % capacity`. A table with
/// no buckets cannot hold any entry.
pub fn alloc_table(
    heap: &mut Heap,
    capacity: usize,
    entries: &[(i32, i32)],
) -> Result<Address, HeapError> {
    let capacity_int = int_field("capacity", capacity)?;
    let size_int = int_field("size", entries.len())?;

    let buckets = heap.allocate(
        format!("struct Entry *[{}]", capacity),
        Value::Array(vec![Value::Null; capacity]),
    )?;
    if capacity == 0 && !entries.is_empty() {
        return Err(HeapError::IndexOutOfBounds {
            address: buckets,
            index: 0,
            len: 0,
        });
    }

    let mut heads = vec![0; capacity];
    for &(key, value) in entries {
        // rem_euclid keeps the slot in 0..capacity
        let slot = i64::from(key).rem_euclid(i64::from(capacity_int)) as usize;
        let entry = heap.allocate(
            "struct Entry",
            Value::record([
                ("key", Value::Int(key)),
                ("value", Value::Int(value)),
                ("next", Value::pointer(heads[slot])),
            ]),
        )?;
        heads[slot] = entry;
        heap.set_slot(buckets, slot, Value::pointer(entry))?;
    }

    heap.allocate(
        "struct HashMap",
        Value::record([
            ("buckets", Value::pointer(buckets)),
            ("size", Value::Int(size_int)),
            ("capacity", Value::Int(capacity_int)),
        ]),
    )
}

fn int_field(what: &'static str, value: usize) -> Result<i32, HeapError> {
    i32::try_from(value).map_err(|_| HeapError::IntOverflow { what, value })
}

fn list_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let head = alloc_list(&mut heap, &[3, 1, 4, 1, 5])?;
    Ok(Scene::new("list", "Five-node linked list", heap).with_root("head", head))
}

fn long_list_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let values: Vec<i32> = (1..=30).collect();
    let head = alloc_list(&mut heap, &values)?;
    Ok(Scene::new("long-list", "30 nodes, cut at the 20-node cap", heap).with_root("head", head))
}

fn broken_list_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let values = [10, 20, 30, 40, 50, 60];
    let head = alloc_list(&mut heap, &values)?;
    // Fourth node's link was never written
    let fourth = nth_node(&heap, head, 3)?;
    heap.set_field(fourth, "next", Value::Uninitialized)?;
    Ok(Scene::new(
        "broken-list",
        "Six nodes, fourth link uninitialized",
        heap,
    )
    .with_root("head", head))
}

fn tree_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 8)?;
    for key in [4, 12, 2, 6, 10, 14] {
        bst_insert(&mut heap, root, key)?;
    }
    Ok(Scene::new("tree", "Balanced binary search tree", heap).with_root("root", root))
}

fn cyclic_tree_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 1)?;
    let left = alloc_tree_node(&mut heap, 2)?;
    let right = alloc_tree_node(&mut heap, 3)?;
    heap.set_field(root, "left", Value::pointer(left))?;
    heap.set_field(root, "right", Value::pointer(right))?;
    // Back edge to the root, plus a child link that was never written
    heap.set_field(left, "right", Value::pointer(root))?;
    heap.set_field(right, "left", Value::Uninitialized)?;
    Ok(Scene::new(
        "cyclic-tree",
        "Tree with a back edge and an unreadable child",
        heap,
    )
    .with_root("root", root))
}

fn corrupt_tree_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 5)?;
    let freed = bst_insert(&mut heap, root, 3)?;
    bst_insert(&mut heap, root, 7)?;
    heap.free(freed)?;
    let keyless = alloc_tree_node(&mut heap, 0)?;
    heap.remove_field(keyless, "key")?;
    heap.set_field(root, "right", Value::pointer(keyless))?;
    Ok(Scene::new(
        "corrupt-tree",
        "Dangling left child, keyless right child",
        heap,
    )
    .with_root("root", root))
}

fn table_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let map = alloc_table(&mut heap, 16, &[(1, 100), (5, 500), (17, 1700), (9, 900)])?;
    Ok(Scene::new("table", "Sparse table with one collision chain", heap).with_root("map", map))
}

fn large_table_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let entries: Vec<(i32, i32)> = (0..40).map(|k| (k, k * k)).collect();
    let map = alloc_table(&mut heap, 64, &entries)?;
    Ok(Scene::new("large-table", "40 entries, cut at the 20-bucket cap", heap).with_root("map", map))
}

fn corrupt_table_scene() -> Result<Scene, HeapError> {
    let mut heap = Heap::default();
    let ok = alloc_table(&mut heap, 8, &[(2, 20), (3, 30)])?;
    let headless = alloc_table(&mut heap, 8, &[(1, 10)])?;
    heap.remove_field(headless, "capacity")?;
    Ok(Scene::new("corrupt-table", "Healthy table next to one missing its capacity", heap)
        .with_root("map", ok)
        .with_root("broken", headless))
}

fn nth_node(heap: &Heap, head: Address, n: usize) -> Result<Address, HeapError> {
    let mut current = head;
    for _ in 0..n {
        current = match &heap.get_block(current)?.value {
            Value::Struct(fields) => fields
                .get("next")
                .and_then(Value::as_pointer)
                .unwrap_or(0),
            _ => 0,
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scene_builds() {
        let scenes = build_all().unwrap();
        assert_eq!(scenes.len(), SCENE_NAMES.len());
        for scene in &scenes {
            assert!(!scene.roots.is_empty(), "{} has no roots", scene.name);
        }
        assert!(build("nope").is_none());
    }

    #[test]
    fn test_alloc_table_without_buckets() {
        let mut heap = Heap::default();
        let empty = alloc_table(&mut heap, 0, &[]).unwrap();
        assert!(heap.get_block(empty).is_ok());

        let err = alloc_table(&mut heap, 0, &[(1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            HeapError::IndexOutOfBounds { index: 0, len: 0, .. }
        ));
    }

    #[test]
    fn test_alloc_table_negative_keys_wrap() {
        let mut heap = Heap::default();
        let map = alloc_table(&mut heap, 4, &[(-1, 10)]).unwrap();
        let buckets = match &heap.get_block(map).unwrap().value {
            Value::Struct(fields) => fields["buckets"].as_pointer().unwrap(),
            other => panic!("expected struct, got {:?}", other),
        };
        match &heap.get_block(buckets).unwrap().value {
            Value::Array(slots) => {
                assert!(slots[3].as_pointer().is_some_and(|addr| addr != 0));
                assert!(slots[..3].iter().all(|slot| *slot == Value::Null));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_table_is_rejected() {
        assert_eq!(
            int_field("capacity", usize::MAX),
            Err(HeapError::IntOverflow {
                what: "capacity",
                value: usize::MAX
            })
        );
    }

    #[test]
    fn test_bst_insert_orders_keys() {
        let mut heap = Heap::default();
        let root = alloc_tree_node(&mut heap, 8).unwrap();
        let left = bst_insert(&mut heap, root, 4).unwrap();
        let right = bst_insert(&mut heap, root, 12).unwrap();

        match &heap.get_block(root).unwrap().value {
            Value::Struct(fields) => {
                assert_eq!(fields["left"], Value::Pointer(left));
                assert_eq!(fields["right"], Value::Pointer(right));
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }
}
