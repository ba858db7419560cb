//! Integration tests for scene trees, cursors and annotations

use layout3d::annotation::{collect_markers, AnnotationStore, Position};
use layout3d::error::TreeError;
use layout3d::iterator::{Aggregate, Cursor};
use layout3d::scene::{descendants, find_node_by_id, outline, LayoutSnapshot, NodeKind, SceneNode};

/// Layout with two rooms holding two and three items.
fn two_room_layout() -> SceneNode {
    let layout = SceneNode::layout("layout-1", "Main Layout");
    let kitchen = SceneNode::room("room-1", "Kitchen");
    kitchen.add(SceneNode::item("item-1", "Counter")).unwrap();
    kitchen.add(SceneNode::item("item-2", "Stove")).unwrap();
    let bedroom = SceneNode::room("room-2", "Bedroom");
    bedroom.add(SceneNode::item("item-3", "Bed")).unwrap();
    bedroom.add(SceneNode::item("item-4", "Desk")).unwrap();
    bedroom.add(SceneNode::item("item-5", "Lamp")).unwrap();
    layout.add(kitchen).unwrap();
    layout.add(bedroom).unwrap();
    layout
}

#[test]
fn test_nested_cursors_visit_every_item_in_order() {
    let layout = two_room_layout();

    let mut visited = Vec::new();
    let mut rooms = layout.create_iterator();
    while rooms.has_next() {
        let room = rooms.next_item().unwrap();
        assert_eq!(room.kind(), NodeKind::Room);
        let mut items = room.create_iterator();
        while let Some(item) = items.next_item() {
            visited.push(item.id().to_string());
        }
    }

    assert_eq!(visited, vec!["item-1", "item-2", "item-3", "item-4", "item-5"]);
}

#[test]
fn test_exhausted_cursor_stays_exhausted() {
    let empty = SceneNode::room("room-9", "Empty");
    let mut cursor = empty.create_iterator();
    assert!(!cursor.has_next());
    assert!(cursor.next_item().is_none());
    assert!(cursor.next_item().is_none());

    let layout = two_room_layout();
    let mut cursor = layout.create_iterator();
    assert!(cursor.next_item().is_some());
    assert!(cursor.next_item().is_some());
    for _ in 0..3 {
        assert!(!cursor.has_next());
        assert!(cursor.next_item().is_none());
    }
}

#[test]
fn test_has_next_is_idempotent() {
    let layout = two_room_layout();
    let mut cursor = layout.create_iterator();
    for _ in 0..5 {
        assert!(cursor.has_next());
    }
    assert_eq!(cursor.next_item().unwrap().id(), "room-1");
}

#[test]
fn test_cursors_are_independent() {
    let layout = two_room_layout();
    let mut first = layout.create_iterator();
    let mut second = layout.create_iterator();

    assert_eq!(first.next_item().unwrap().id(), "room-1");
    assert_eq!(first.next_item().unwrap().id(), "room-2");
    assert_eq!(second.next_item().unwrap().id(), "room-1");
}

#[test]
fn test_open_cursor_sees_removal() {
    let room = SceneNode::room("room-1", "Hall");
    let a = SceneNode::item("a", "A");
    let b = SceneNode::item("b", "B");
    let c = SceneNode::item("c", "C");
    for item in [&a, &b, &c] {
        room.add(item.clone()).unwrap();
    }

    let mut cursor = room.create_iterator();
    assert_eq!(cursor.next_item().unwrap().id(), "a");
    assert!(room.remove(&a));
    // "b" shifted into the slot the cursor already passed
    assert_eq!(cursor.next_item().unwrap().id(), "c");
    assert!(cursor.next_item().is_none());
    assert!(a.parent().is_none());
}

#[test]
fn test_open_cursor_sees_append() {
    let room = SceneNode::room("room-1", "Hall");
    room.add(SceneNode::item("a", "A")).unwrap();
    let mut cursor = room.create_iterator();
    assert_eq!(cursor.next_item().unwrap().id(), "a");
    assert!(!cursor.has_next());

    room.add(SceneNode::item("b", "B")).unwrap();
    assert!(cursor.has_next());
    assert_eq!(cursor.next_item().unwrap().id(), "b");
}

#[test]
fn test_tree_invariants_are_enforced() {
    let layout = two_room_layout();
    let room = find_node_by_id(&layout, "room-1").unwrap();

    assert!(matches!(room.add(layout.clone()), Err(TreeError::Cycle { .. })));
    assert!(matches!(room.add(room.clone()), Err(TreeError::Cycle { .. })));

    let other = SceneNode::layout("layout-2", "Other");
    assert!(matches!(
        other.add(room.clone()),
        Err(TreeError::AlreadyAttached(_))
    ));

    assert!(layout.remove(&room));
    other.add(room.clone()).unwrap();
    assert!(room.parent().unwrap().ptr_eq(&other));
}

#[test]
fn test_remove_absent_child_is_noop() {
    let layout = two_room_layout();
    let stranger = SceneNode::room("room-1", "Same id, different node");
    assert!(!layout.remove(&stranger));
    assert_eq!(layout.child_count(), 2);
}

#[test]
fn test_find_searches_any_depth() {
    let layout = two_room_layout();
    let bed = find_node_by_id(&layout, "item-3").unwrap();
    bed.add(SceneNode::item("pillow", "Pillow")).unwrap();

    assert_eq!(find_node_by_id(&layout, "pillow").unwrap().name(), "Pillow");
    assert_eq!(find_node_by_id(&layout, "room-2").unwrap().name(), "Bedroom");
    assert!(find_node_by_id(&layout, "layout-1").is_none());
    assert!(find_node_by_id(&layout, "missing").is_none());
}

#[test]
fn test_descendants_and_outline_follow_preorder() {
    let layout = two_room_layout();
    let ids: Vec<String> = descendants(&layout)
        .iter()
        .map(|n| n.id().to_string())
        .collect();
    assert_eq!(
        ids,
        vec!["room-1", "item-1", "item-2", "room-2", "item-3", "item-4", "item-5"]
    );

    let text = outline(&layout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Layout: Main Layout");
    assert_eq!(lines[1], "  Room: Kitchen");
    assert_eq!(lines[2], "    Item: Counter");
    assert_eq!(lines.len(), 8);
}

#[test]
fn test_snapshot_restores_equivalent_tree() {
    let layout = two_room_layout();
    let restored = LayoutSnapshot::capture(&layout).restore().unwrap();
    assert!(!restored.ptr_eq(&layout));
    assert_eq!(outline(&restored), outline(&layout));
    let lamp = find_node_by_id(&restored, "item-5").unwrap();
    assert_eq!(lamp.parent().unwrap().id(), "room-2");
}

#[test]
fn test_annotation_cursor_through_aggregate() {
    fn count<A: Aggregate>(aggregate: &A) -> usize
    where
        A::Iter: Cursor,
    {
        let mut cursor = aggregate.create_iterator();
        let mut n = 0;
        while cursor.next_item().is_some() {
            n += 1;
        }
        n
    }

    let store = AnnotationStore::new();
    assert_eq!(count(&store), 0);
    store.add("door", Position::new(0.0, 0.0, 0.0));
    store.add("window", Position::new(1.0, 2.0, 0.0));
    assert_eq!(count(&store), 2);
    assert_eq!(count(&two_room_layout()), 2);

    let markers = collect_markers(store.create_iterator());
    assert_eq!(markers[1].label, "window");
    assert_eq!(markers[1].position, Position::new(1.0, 2.0, 0.0));
}
