// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity FIFO that overwrites its oldest element when full.

/// Ring buffer with storage allocated once at construction
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Index of the oldest element once the buffer has wrapped
    head: usize,
}

impl<T: Copy> RingBuffer<T> {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be > 0");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append `value`, returning the element it displaced when full
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            return None;
        }
        let displaced = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(displaced)
    }

    pub fn oldest(&self) -> Option<T> {
        self.slots.get(self.head).copied()
    }

    pub fn newest(&self) -> Option<T> {
        if self.slots.is_empty() {
            return None;
        }
        let index = (self.head + self.slots.len() - 1) % self.slots.len();
        Some(self.slots[index])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// Elements from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_without_wrap() {
        let mut ring = RingBuffer::new(3);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.oldest(), Some(1));
        assert_eq!(ring.newest(), Some(2));
        assert!(!ring.is_full());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut ring = RingBuffer::new(3);
        for value in 1..=3 {
            ring.push(value);
        }
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.push(5), Some(2));

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.oldest(), Some(3));
        assert_eq!(ring.newest(), Some(5));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_clear_resets_order() {
        let mut ring = RingBuffer::new(2);
        for value in 0..5 {
            ring.push(value);
        }
        ring.clear();
        assert!(ring.is_empty());
        ring.push(9);
        assert_eq!(ring.oldest(), Some(9));
        assert_eq!(ring.newest(), Some(9));
    }
}
