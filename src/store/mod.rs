//! Layout Store
//!
//! Persistence collaborator for reconstructed layouts: the last stage of the
//! generation pipeline hands the finished tree here and receives its result id.

pub mod persistence;

pub use persistence::SledLayoutStore;

use crate::error::StorageError;
use crate::scene::SceneNode;
use crate::types::new_id;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Layout persistence interface
pub trait LayoutStore: Send + Sync {
    /// Persist `layout` and return the id it can be loaded by.
    fn store(&self, layout: &SceneNode) -> Result<String, StorageError>;

    /// Load a previously stored layout. `None` if the id is unknown.
    fn load(&self, layout_id: &str) -> Result<Option<SceneNode>, StorageError>;
}

/// Process-local store keeping the live tree handles.
#[derive(Default)]
pub struct InMemoryLayoutStore {
    layouts: RwLock<HashMap<String, SceneNode>>,
}

impl InMemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.read().is_empty()
    }
}

impl LayoutStore for InMemoryLayoutStore {
    fn store(&self, layout: &SceneNode) -> Result<String, StorageError> {
        let layout_id = new_id("layout");
        debug!(layout_id = %layout_id, root = %layout.id(), "Storing layout in memory");
        self.layouts
            .write()
            .insert(layout_id.clone(), layout.clone());
        Ok(layout_id)
    }

    fn load(&self, layout_id: &str) -> Result<Option<SceneNode>, StorageError> {
        Ok(self.layouts.read().get(layout_id).cloned())
    }
}
