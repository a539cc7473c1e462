// Binary tree walker: keys, child links, cycles and unreadable nodes

use memwalk::config::TreeConfig;
use memwalk::demo::{alloc_tree_node, bst_insert};
use memwalk::memory::heap::Heap;
use memwalk::memory::value::Value;
use memwalk::memory::MemRef;
use memwalk::walker::{Entry, TreeWalker, ValueHandle, Walker};

fn pairs(entries: &[Entry<MemRef<'_>>]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|e| {
            let value = match e.as_text() {
                Some(text) => text.to_string(),
                None => "<handle>".to_string(),
            };
            (e.label.clone(), value)
        })
        .collect()
}

fn pair(label: &str, value: &str) -> (String, String) {
    (label.to_string(), value.to_string())
}

#[test]
fn test_leaf_yields_only_its_key() {
    let mut heap = Heap::default();
    let leaf = alloc_tree_node(&mut heap, 7).unwrap();

    let mut walker = TreeWalker::new(heap.root(leaf));
    let entries: Vec<_> = walker.entries().collect();

    assert_eq!(pairs(&entries), vec![pair("key", "<handle>")]);
    assert_eq!(entries[0].as_handle().unwrap().display_scalar(), "7");
    assert_eq!(walker.summary(), "TreeNode(key=7)");
}

#[test]
fn test_children_follow_the_key() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 8).unwrap();
    let left = bst_insert(&mut heap, root, 4).unwrap();
    let right = bst_insert(&mut heap, root, 12).unwrap();

    let mut walker = TreeWalker::new(heap.root(root));
    let entries: Vec<_> = walker.entries().collect();

    assert_eq!(
        pairs(&entries),
        vec![
            pair("key", "<handle>"),
            pair("left", "<handle>"),
            pair("right", "<handle>"),
        ]
    );
    assert_eq!(entries[1].as_handle().unwrap().identity().unwrap(), left);
    assert_eq!(entries[2].as_handle().unwrap().identity().unwrap(), right);
}

#[test]
fn test_only_present_children_are_listed() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 8).unwrap();
    bst_insert(&mut heap, root, 12).unwrap();

    let mut walker = TreeWalker::new(heap.root(root));
    let labels: Vec<String> = walker.entries().map(|e| e.label).collect();
    assert_eq!(labels, vec!["key", "right"]);
}

#[test]
fn test_null_node_yields_nothing() {
    let heap = Heap::default();
    let mut walker = TreeWalker::new(heap.root(0));

    assert_eq!(walker.entries().count(), 0);
    assert_eq!(walker.summary(), "TreeNode");
    assert!(walker.visited().is_empty());
}

#[test]
fn test_revisited_node_is_circular() {
    let mut heap = Heap::default();
    let a = alloc_tree_node(&mut heap, 1).unwrap();
    let b = alloc_tree_node(&mut heap, 2).unwrap();
    heap.set_field(a, "left", Value::pointer(b)).unwrap();
    heap.set_field(b, "right", Value::pointer(a)).unwrap();

    let mut root = TreeWalker::new(heap.root(a));
    let root_entries: Vec<_> = root.entries().collect();
    let left = root_entries[1].as_handle().unwrap().clone();

    let mut child = root.child(left);
    let child_entries: Vec<_> = child.entries().collect();
    assert_eq!(
        pairs(&child_entries),
        vec![pair("key", "<handle>"), pair("right", "<handle>")]
    );

    let back = child_entries[1].as_handle().unwrap().clone();
    let mut revisit = child.child(back);
    let revisit_entries: Vec<_> = revisit.entries().collect();
    assert_eq!(pairs(&revisit_entries), vec![pair("circular", "...")]);
    assert_eq!(revisit.summary(), "TreeNode(key=1)");
    assert_eq!(root.visited().len(), 2);
}

#[test]
fn test_self_loop_is_circular_on_second_visit() {
    let mut heap = Heap::default();
    let a = alloc_tree_node(&mut heap, 1).unwrap();
    heap.set_field(a, "left", Value::pointer(a)).unwrap();

    let mut walker = TreeWalker::new(heap.root(a));
    let first: Vec<_> = walker.entries().collect();
    assert_eq!(first.len(), 2);

    let again: Vec<_> = walker.entries().collect();
    assert_eq!(pairs(&again), vec![pair("circular", "...")]);
}

#[test]
fn test_separate_walkers_do_not_share_visits() {
    let mut heap = Heap::default();
    let a = alloc_tree_node(&mut heap, 1).unwrap();

    let mut first = TreeWalker::new(heap.root(a));
    let mut second = TreeWalker::new(heap.root(a));
    assert_eq!(first.entries().count(), 1);
    assert_eq!(pairs(&second.entries().collect::<Vec<_>>()), vec![pair("key", "<handle>")]);
}

#[test]
fn test_unreadable_child_is_an_error_entry() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 3).unwrap();
    heap.set_field(root, "left", Value::Uninitialized).unwrap();
    heap.remove_field(root, "right").unwrap();

    let mut walker = TreeWalker::new(heap.root(root));
    let entries: Vec<_> = walker.entries().collect();
    assert_eq!(
        pairs(&entries),
        vec![
            pair("key", "<handle>"),
            pair("left", "error"),
            pair("right", "error"),
        ]
    );
}

#[test]
fn test_inaccessible_node_reports_error() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 5).unwrap();
    let child = bst_insert(&mut heap, root, 3).unwrap();
    heap.free(child).unwrap();

    let dangling = ValueHandle::field(&heap.root(root), "left").unwrap();
    let mut walker = TreeWalker::new(dangling);
    let entries: Vec<_> = walker.entries().collect();

    assert_eq!(pairs(&entries), vec![pair("error", "Cannot access tree node")]);
    assert_eq!(walker.summary(), "TreeNode");
}

#[test]
fn test_missing_key_falls_back_to_bare_summary() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 5).unwrap();
    bst_insert(&mut heap, root, 2).unwrap();
    heap.remove_field(root, "key").unwrap();

    let mut walker = TreeWalker::new(heap.root(root));
    assert_eq!(walker.summary(), "TreeNode");
    let labels: Vec<String> = walker.entries().map(|e| e.label).collect();
    assert_eq!(labels, vec!["left"]);
}

#[test]
fn test_custom_field_names() {
    let mut heap = Heap::default();
    let lo = heap
        .allocate(
            "struct Bst",
            Value::record([("id", Value::Int(1)), ("lo", Value::Null), ("hi", Value::Null)]),
        )
        .unwrap();
    let root = heap
        .allocate(
            "struct Bst",
            Value::record([
                ("id", Value::Int(2)),
                ("lo", Value::pointer(lo)),
                ("hi", Value::Null),
            ]),
        )
        .unwrap();

    let config = TreeConfig::default()
        .with_left_field("lo")
        .with_right_field("hi")
        .with_key_field("id");
    let mut walker = TreeWalker::with_config(heap.root(root), config);

    assert_eq!(walker.summary(), "TreeNode(key=2)");
    let labels: Vec<String> = walker.entries().map(|e| e.label).collect();
    assert_eq!(labels, vec!["id", "left"]);
}

#[test]
fn test_summary_reads_fresh_each_call() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 9).unwrap();

    let walker = TreeWalker::new(heap.root(root));
    assert_eq!(walker.summary(), walker.summary());
    assert_eq!(walker.summary(), "TreeNode(key=9)");
}

#[test]
fn test_partial_pull_still_marks_node_visited() {
    let mut heap = Heap::default();
    let root = alloc_tree_node(&mut heap, 8).unwrap();
    let left = bst_insert(&mut heap, root, 4).unwrap();
    bst_insert(&mut heap, root, 12).unwrap();

    let mut walker = TreeWalker::new(heap.root(root));
    let first: Vec<_> = walker.entries().take(1).collect();
    assert_eq!(pairs(&first), vec![pair("key", "<handle>")]);
    assert!(walker.visited().contains(&root));
    assert!(!walker.visited().contains(&left));

    // Abandoning the root's entries leaves its children walkable
    let mut child = walker.child(heap.root(left));
    let entries: Vec<_> = child.entries().collect();
    assert_eq!(pairs(&entries), vec![pair("key", "<handle>")]);
    assert_eq!(walker.visited().len(), 2);
}
