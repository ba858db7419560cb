//! Persistence layer for layouts

use crate::error::StorageError;
use crate::scene::{LayoutSnapshot, SceneNode};
use crate::store::LayoutStore;
use std::path::Path;
use tracing::debug;

/// Sled-backed layout store.
///
/// Layouts are stored as bincode-encoded snapshots under a content-addressed id
/// (`layout-` plus a blake3 prefix of the encoded bytes), so storing an identical
/// layout twice yields the same id.
pub struct SledLayoutStore {
    db: sled::Db,
}

impl SledLayoutStore {
    /// Open or create a store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn layout_id(encoded: &[u8]) -> String {
        let hash = blake3::hash(encoded);
        format!("layout-{}", &hash.to_hex()[..16])
    }
}

impl LayoutStore for SledLayoutStore {
    fn store(&self, layout: &SceneNode) -> Result<String, StorageError> {
        let snapshot = LayoutSnapshot::capture(layout);
        let encoded = bincode::serialize(&snapshot)?;
        let layout_id = Self::layout_id(&encoded);

        self.db.insert(layout_id.as_bytes(), encoded)?;
        debug!(layout_id = %layout_id, root = %layout.id(), "Stored layout snapshot");
        Ok(layout_id)
    }

    fn load(&self, layout_id: &str) -> Result<Option<SceneNode>, StorageError> {
        match self.db.get(layout_id.as_bytes())? {
            Some(value) => {
                let snapshot: LayoutSnapshot = bincode::deserialize(&value)?;
                Ok(Some(snapshot.restore()?))
            }
            None => Ok(None),
        }
    }
}
