//! Owned, serializable copy of a scene tree.

use crate::error::TreeError;
use crate::iterator::Cursor;
use crate::scene::node::{NodeKind, SceneNode, VisualHandle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub visual: Option<VisualHandle>,
    #[serde(default)]
    pub children: Vec<LayoutSnapshot>,
}

impl LayoutSnapshot {
    /// Capture `node` and everything below it as it is right now.
    pub fn capture(node: &SceneNode) -> Self {
        let mut children = Vec::with_capacity(node.child_count());
        let mut cursor = node.create_iterator();
        while let Some(child) = cursor.next_item() {
            children.push(Self::capture(&child));
        }

        Self {
            id: node.id().to_string(),
            name: node.name().to_string(),
            kind: node.kind(),
            visual: node.visual(),
            children,
        }
    }

    /// Rebuild a live tree from the snapshot.
    pub fn restore(&self) -> Result<SceneNode, TreeError> {
        let node = SceneNode::new(self.id.clone(), self.name.clone(), self.kind);
        node.set_visual(self.visual);
        for child in &self.children {
            node.add(child.restore()?)?;
        }
        Ok(node)
    }
}

impl From<&SceneNode> for LayoutSnapshot {
    fn from(node: &SceneNode) -> Self {
        Self::capture(node)
    }
}
