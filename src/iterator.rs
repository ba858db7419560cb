//! External Iteration Protocol
//!
//! A minimal cursor contract that any ordered collection or tree node can satisfy,
//! plus the one concrete cursor the crate needs: [`CompositeIterator`], a position
//! cursor over a shared child list.
//!
//! Cursors read the backing collection live. There is no snapshot on creation, so a
//! structural change made while a cursor is open is visible to it: removing an
//! element before the cursor's position shifts the remaining elements down and the
//! cursor skips one of them.

use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, mutable, ordered backing storage for cursors.
pub type SharedList<T> = Arc<RwLock<Vec<T>>>;

/// Forward-only cursor over an ordered collection.
pub trait Cursor {
    type Item;

    /// Whether another element is available. Never advances the cursor.
    fn has_next(&self) -> bool;

    /// Return the element at the current position and advance by one.
    ///
    /// Returns `None` once exhausted, however many times it is called.
    fn next_item(&mut self) -> Option<Self::Item>;
}

/// Anything that can produce a cursor over its contents.
pub trait Aggregate {
    type Item;
    type Iter: Cursor<Item = Self::Item>;

    fn create_iterator(&self) -> Self::Iter;
}

/// Position cursor over a [`SharedList`].
#[derive(Debug)]
pub struct CompositeIterator<T> {
    items: SharedList<T>,
    position: usize,
}

impl<T: Clone> CompositeIterator<T> {
    pub fn new(items: SharedList<T>) -> Self {
        Self { items, position: 0 }
    }

    /// Number of elements handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T: Clone> Cursor for CompositeIterator<T> {
    type Item = T;

    fn has_next(&self) -> bool {
        self.position < self.items.read().len()
    }

    fn next_item(&mut self) -> Option<T> {
        let item = self.items.read().get(self.position).cloned()?;
        self.position += 1;
        Some(item)
    }
}

impl<T: Clone> Iterator for CompositeIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.next_item()
    }
}
