//! Scene Graph
//!
//! The reconstructed 3D layout as a composite tree: a layout owns rooms, rooms own
//! items, and any node may own further children. Every node exposes the same cursor
//! over its children, so consumers traverse without knowing how children are stored.

pub mod node;
pub mod search;
pub mod snapshot;

pub use node::{LayoutIterator, NodeKind, RoomIterator, SceneIterator, SceneNode, VisualHandle};
pub use search::{descendants, find_node_by_id, leaf_count, outline};
pub use snapshot::LayoutSnapshot;
