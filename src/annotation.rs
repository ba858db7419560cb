//! Annotation Store
//!
//! Flat, ordered collection of user annotations. Exposes the same cursor protocol as
//! scene nodes, so renderers and sidebars iterate without seeing the storage.

use crate::iterator::{Aggregate, CompositeIterator, Cursor, SharedList};
use crate::types::new_id;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Opaque 3D coordinate triple. Stored as data only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub [f64; 3]);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub text: String,
    pub position: Position,
}

/// Cursor over the annotation list.
pub type AnnotationIterator = CompositeIterator<Annotation>;

/// Marker handed to the rendering collaborator for one annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub annotation_id: String,
    pub label: String,
    pub position: Position,
}

#[derive(Debug, Default)]
pub struct AnnotationStore {
    annotations: SharedList<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new annotation and return a copy of it.
    pub fn add(&self, text: impl Into<String>, position: Position) -> Annotation {
        let annotation = Annotation {
            id: new_id("anno"),
            text: text.into(),
            position,
        };
        self.annotations.write().push(annotation.clone());
        debug!(annotation_id = %annotation.id, "Annotation added");
        annotation
    }

    /// Replace the text of an annotation. Returns false if the id is unknown.
    pub fn update(&self, id: &str, text: impl Into<String>) -> bool {
        let mut annotations = self.annotations.write();
        match annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Remove every annotation with `id`. Returns false if none matched.
    pub fn remove(&self, id: &str) -> bool {
        let mut annotations = self.annotations.write();
        let before = annotations.len();
        annotations.retain(|a| a.id != id);
        let removed = annotations.len() != before;
        if removed {
            debug!(annotation_id = %id, "Annotation removed");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<Annotation> {
        self.annotations.read().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.annotations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.read().is_empty()
    }

    /// Live cursor over the annotations in insertion order.
    pub fn create_iterator(&self) -> AnnotationIterator {
        CompositeIterator::new(Arc::clone(&self.annotations))
    }
}

impl Aggregate for AnnotationStore {
    type Item = Annotation;
    type Iter = AnnotationIterator;

    fn create_iterator(&self) -> AnnotationIterator {
        AnnotationStore::create_iterator(self)
    }
}

/// Drain any annotation cursor into renderer markers.
pub fn collect_markers<C>(mut cursor: C) -> Vec<Marker>
where
    C: Cursor<Item = Annotation>,
{
    let mut markers = Vec::new();
    while let Some(annotation) = cursor.next_item() {
        markers.push(Marker {
            annotation_id: annotation.id,
            label: annotation.text,
            position: annotation.position,
        });
    }
    markers
}

/// Cursor over a single annotation, for rendering one new marker.
pub fn single(annotation: Annotation) -> AnnotationIterator {
    CompositeIterator::new(Arc::new(RwLock::new(vec![annotation])))
}
