//! Scene node: one composite node type for every level of the layout hierarchy.

use crate::error::TreeError;
use crate::iterator::{Aggregate, CompositeIterator, SharedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// Semantic role of a node. Traversal is identical for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root-level container (owns rooms)
    Layout,
    /// Mid-level container (owns items)
    Room,
    /// Leaf item; may still own children
    Item,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Layout => "layout",
            NodeKind::Room => "room",
            NodeKind::Item => "item",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Layout => "Layout",
            NodeKind::Room => "Room",
            NodeKind::Item => "Item",
        }
    }
}

/// Opaque handle to the renderer's visual object. Never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Cursor over a node's children.
pub type SceneIterator = CompositeIterator<SceneNode>;
/// Cursor over the rooms of a layout.
pub type LayoutIterator = SceneIterator;
/// Cursor over the items of a room.
pub type RoomIterator = SceneIterator;

struct NodeData {
    id: String,
    name: String,
    kind: NodeKind,
    children: SharedList<SceneNode>,
    parent: RwLock<Weak<NodeData>>,
    visual: RwLock<Option<VisualHandle>>,
}

/// Shared handle to a node in the scene tree.
///
/// Cloning the handle does not clone the node; equality of identity is
/// [`SceneNode::ptr_eq`].
#[derive(Clone)]
pub struct SceneNode {
    inner: Arc<NodeData>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            inner: Arc::new(NodeData {
                id: id.into(),
                name: name.into(),
                kind,
                children: Arc::new(RwLock::new(Vec::new())),
                parent: RwLock::new(Weak::new()),
                visual: RwLock::new(None),
            }),
        }
    }

    pub fn layout(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Layout)
    }

    pub fn room(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Room)
    }

    pub fn item(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Item)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        *self.inner.visual.read()
    }

    pub fn set_visual(&self, handle: Option<VisualHandle>) {
        *self.inner.visual.write() = handle;
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.read().len()
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Point-in-time copy of the child handles.
    pub fn children(&self) -> Vec<SceneNode> {
        self.inner.children.read().clone()
    }

    pub fn parent(&self) -> Option<SceneNode> {
        self.inner
            .parent
            .read()
            .upgrade()
            .map(|inner| SceneNode { inner })
    }

    /// Same node, not merely equal fields.
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Append `child` after the existing children.
    ///
    /// Rejects a child that already has a parent, and a child that is this node or
    /// one of its ancestors.
    pub fn add(&self, child: SceneNode) -> Result<(), TreeError> {
        if self.ptr_eq(&child) || self.has_ancestor(&child) {
            return Err(TreeError::Cycle {
                parent: self.id().to_string(),
                child: child.id().to_string(),
            });
        }

        {
            let mut parent = child.inner.parent.write();
            if parent.upgrade().is_some() {
                return Err(TreeError::AlreadyAttached(child.id().to_string()));
            }
            *parent = Arc::downgrade(&self.inner);
        }

        self.inner.children.write().push(child);
        Ok(())
    }

    /// Remove the first child that is `child` by identity. Returns whether one was removed.
    pub fn remove(&self, child: &SceneNode) -> bool {
        let removed = {
            let mut children = self.inner.children.write();
            children
                .iter()
                .position(|c| c.ptr_eq(child))
                .map(|index| children.remove(index))
        };

        match removed {
            Some(node) => {
                *node.inner.parent.write() = Weak::new();
                true
            }
            None => false,
        }
    }

    /// Live cursor over this node's children.
    pub fn create_iterator(&self) -> SceneIterator {
        CompositeIterator::new(Arc::clone(&self.inner.children))
    }

    fn has_ancestor(&self, candidate: &SceneNode) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.ptr_eq(candidate) {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

impl Aggregate for SceneNode {
    type Item = SceneNode;
    type Iter = SceneIterator;

    fn create_iterator(&self) -> SceneIterator {
        SceneNode::create_iterator(self)
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("children", &self.child_count())
            .finish()
    }
}
