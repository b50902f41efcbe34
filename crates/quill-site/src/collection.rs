//! Immutable, chainable collections.
//!
//! [`Collection`] is the value type returned by every query on the site
//! context. Transformations never mutate the receiver; each returns a new
//! collection sharing the underlying `Arc`ed items.

use std::cmp::Ordering;
use std::sync::Arc;

/// Ordered, immutable sequence of shared items.
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<Arc<T>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    /// Create a collection from shared items, preserving order.
    #[must_use]
    pub fn new(items: Vec<Arc<T>>) -> Self {
        Self { items }
    }

    /// Create an empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keep items matching the predicate.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        self.items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Stable sort by a comparator.
    #[must_use]
    pub fn sort_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|a, b| compare(a, b));
        Self { items }
    }

    /// First `n` items.
    #[must_use]
    pub fn take(&self, n: usize) -> Self {
        self.items.iter().take(n).cloned().collect()
    }

    /// Items in `start..end`, clamped to the collection bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.items.len());
        let start = start.min(end);
        Self::new(self.items[start..end].to_vec())
    }

    /// Items in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.items.iter().rev().cloned().collect()
    }

    /// First item.
    #[must_use]
    pub fn first(&self) -> Option<&Arc<T>> {
        self.items.first()
    }

    /// Last item.
    #[must_use]
    pub fn last(&self) -> Option<&Arc<T>> {
        self.items.last()
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.items.get(index)
    }

    /// Number of items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    /// Borrow the items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Arc<T>] {
        &self.items
    }
}

impl<T> FromIterator<Arc<T>> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> From<Vec<Arc<T>>> for Collection<T> {
    fn from(items: Vec<Arc<T>>) -> Self {
        Self::new(items)
    }
}
