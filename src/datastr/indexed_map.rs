//! Map from dense integer keys to values with iterable key list.

use crate::datastr::graph::Id;

const NO_POSITION: u32 = u32::MAX;

/// Position table plus parallel key/value lists. Supports `O(1)` insert,
/// lookup and removal (swap-remove), and clearing proportional to the number
/// of contained keys.
#[derive(Debug, Clone)]
pub struct IndexedMap<K, V> {
    positions: Vec<u32>,
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K: Id, V> IndexedMap<K, V> {
    pub fn new(capacity: usize) -> IndexedMap<K, V> {
        IndexedMap {
            positions: vec![NO_POSITION; capacity],
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.positions[key.id()] != NO_POSITION
    }

    pub fn insert(&mut self, key: K, value: V) {
        debug_assert!(!self.contains(key));
        self.positions[key.id()] = self.keys.len() as u32;
        self.keys.push(key);
        self.values.push(value);
    }

    pub fn get(&self, key: K) -> Option<&V> {
        match self.positions[key.id()] {
            NO_POSITION => None,
            position => Some(&self.values[position as usize]),
        }
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        match self.positions[key.id()] {
            NO_POSITION => None,
            position => Some(&mut self.values[position as usize]),
        }
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        let position = self.positions[key.id()];
        if position == NO_POSITION {
            return None;
        }
        self.positions[key.id()] = NO_POSITION;
        let value = self.values.swap_remove(position as usize);
        self.keys.swap_remove(position as usize);
        if (position as usize) < self.keys.len() {
            self.positions[self.keys[position as usize].id()] = position;
        }
        Some(value)
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn key(&self, position: usize) -> K {
        self.keys[position]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        for key in &self.keys {
            self.positions[key.id()] = NO_POSITION;
        }
        self.keys.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::Vertex;

    #[test]
    fn insert_get_remove() {
        let mut map: IndexedMap<Vertex, i32> = IndexedMap::new(4);
        map.insert(Vertex(1), 10);
        map.insert(Vertex(3), 30);
        assert_eq!(map.get(Vertex(1)), Some(&10));
        assert_eq!(map.get(Vertex(2)), None);
        assert_eq!(map.remove(Vertex(1)), Some(10));
        assert_eq!(map.get(Vertex(3)), Some(&30));
        assert_eq!(map.len(), 1);
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains(Vertex(3)));
    }
}
