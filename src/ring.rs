//! Fixed-capacity ring buffer that overwrites its oldest entry when full.

/// Ring of `capacity` slots with a write head and a saturating count.
///
/// Logical order is oldest to newest, starting at
/// `(head - count) mod capacity`.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    slots: Vec<T>,
    capacity: usize,
    head: usize,
    count: usize,
}

impl<T: Copy + Default> Ring<T> {
    /// Create an empty ring. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![T::default(); capacity],
            capacity,
            head: 0,
            count: 0,
        }
    }

    /// Append a value, overwriting the oldest entry when full.
    pub fn push(&mut self, value: T) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = (self.head + self.capacity - self.count) % self.capacity;
        (0..self.count).map(move |i| &self.slots[(start + i) % self.capacity])
    }

    /// Most recently pushed entry.
    pub fn latest(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        Some(&self.slots[(self.head + self.capacity - 1) % self.capacity])
    }

    /// Copy of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_order() {
        let mut ring = Ring::new(4);
        for v in 1..=3 {
            ring.push(v);
        }
        assert_eq!(ring.to_vec(), vec![1, 2, 3]);
        assert_eq!(ring.len(), 3);
        assert!(!ring.is_full());
        assert_eq!(ring.latest(), Some(&3));
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let mut ring = Ring::new(4);
        for v in 1..=5 {
            ring.push(v);
        }
        assert_eq!(ring.len(), 4);
        assert!(ring.is_full());
        assert_eq!(ring.to_vec(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn rotation_over_many_wraps() {
        let mut ring = Ring::new(3);
        for v in 0..10 {
            ring.push(v);
        }
        assert_eq!(ring.to_vec(), vec![7, 8, 9]);
        assert_eq!(ring.latest(), Some(&9));
    }

    #[test]
    fn empty_and_clear() {
        let mut ring: Ring<u8> = Ring::new(2);
        assert!(ring.is_empty());
        assert!(ring.latest().is_none());
        ring.push(1);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut ring = Ring::new(0);
        ring.push(7u8);
        ring.push(8u8);
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.to_vec(), vec![8]);
    }
}
