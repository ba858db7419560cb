//! Depth-first traversal helpers built on node cursors.

use crate::iterator::Cursor;
use crate::scene::node::SceneNode;

/// Find the first descendant of `root` whose id is `id`.
///
/// Pre-order depth-first: each child is compared, then searched, before its next
/// sibling. The root itself is not compared.
pub fn find_node_by_id(root: &SceneNode, id: &str) -> Option<SceneNode> {
    let mut children = root.create_iterator();
    while let Some(child) = children.next_item() {
        if child.id() == id {
            return Some(child);
        }
        if let Some(found) = find_node_by_id(&child, id) {
            return Some(found);
        }
    }
    None
}

/// Every node below `root`, in pre-order.
pub fn descendants(root: &SceneNode) -> Vec<SceneNode> {
    let mut out = Vec::new();
    collect_descendants(root, &mut out);
    out
}

fn collect_descendants(node: &SceneNode, out: &mut Vec<SceneNode>) {
    let mut children = node.create_iterator();
    while let Some(child) = children.next_item() {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

/// Number of childless nodes below `root`.
pub fn leaf_count(root: &SceneNode) -> usize {
    descendants(root).iter().filter(|n| n.is_leaf()).count()
}

/// Indented, one-node-per-line rendering of the hierarchy.
///
/// ```text
/// Layout: Main Layout
///   Room: Default Room
///     Item: Wall
/// ```
pub fn outline(root: &SceneNode) -> String {
    let mut lines = Vec::new();
    write_outline(root, 0, &mut lines);
    lines.join("\n")
}

fn write_outline(node: &SceneNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{}: {}",
        "  ".repeat(depth),
        node.kind().label(),
        node.name()
    ));
    let mut children = node.create_iterator();
    while let Some(child) = children.next_item() {
        write_outline(&child, depth + 1, lines);
    }
}
