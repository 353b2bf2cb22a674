//! Set of dense integer ids with `O(1)` insert, membership test and clear.

use crate::datastr::graph::Id;

/// Marker vector plus insertion-order element list. Clearing only touches the
/// elements that were actually inserted, so the per-query cost is proportional
/// to the work done, not to the network size.
#[derive(Debug, Clone)]
pub struct IndexedSet<T> {
    contained: Vec<bool>,
    elements: Vec<T>,
}

impl<T: Id> IndexedSet<T> {
    pub fn new(capacity: usize) -> IndexedSet<T> {
        IndexedSet {
            contained: vec![false; capacity],
            elements: Vec::new(),
        }
    }

    /// Returns true if the element was not yet contained.
    pub fn insert(&mut self, element: T) -> bool {
        if self.contained[element.id()] {
            return false;
        }
        self.contained[element.id()] = true;
        self.elements.push(element);
        true
    }

    pub fn contains(&self, element: T) -> bool {
        self.contained[element.id()]
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn element(&self, position: usize) -> T {
        self.elements[position]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        for element in &self.elements {
            self.contained[element.id()] = false;
        }
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::Vertex;

    #[test]
    fn insert_is_idempotent() {
        let mut set = IndexedSet::new(4);
        assert!(set.insert(Vertex(2)));
        assert!(!set.insert(Vertex(2)));
        assert!(set.contains(Vertex(2)));
        assert_eq!(set.len(), 1);
        set.clear();
        assert!(!set.contains(Vertex(2)));
        assert!(set.is_empty());
    }
}
