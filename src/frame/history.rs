//! Fixed-capacity FIFO of recent frames.

use std::fmt;

/// Bounded FIFO that hands back the element it evicts.
///
/// Once full, every push drops exactly one element (the oldest) and returns it,
/// which lets callers undo that element's contribution to running totals.
#[derive(Clone)]
pub struct HistoryRing<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> HistoryRing<T> {
    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "HistoryRing capacity must be greater than zero");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Append `value`, returning the evicted oldest element once the ring is full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let capacity = self.capacity();

        let idx = if self.is_full() {
            let current = self.head;
            self.head = (self.head + 1) % capacity;
            current
        } else {
            let idx = (self.head + self.len) % capacity;
            self.len += 1;
            idx
        };

        self.slots[idx].replace(value)
    }

    /// Oldest element still retained.
    pub fn oldest(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }

    /// Most recently pushed element.
    pub fn newest(&self) -> Option<&T> {
        self.nth_newest(0)
    }

    /// Element pushed `n` pushes before the newest (0 = newest).
    pub fn nth_newest(&self, n: usize) -> Option<&T> {
        if n >= self.len {
            return None;
        }
        let idx = (self.head + self.len - 1 - n) % self.capacity();
        self.slots[idx].as_ref()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> HistoryIter<'_, T> {
        HistoryIter {
            ring: self,
            offset: 0,
            remaining: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HistoryRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryRing")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Oldest-to-newest iterator over a `HistoryRing`.
pub struct HistoryIter<'a, T> {
    ring: &'a HistoryRing<T>,
    offset: usize,
    remaining: usize,
}

impl<'a, T> Iterator for HistoryIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = (self.ring.head + self.offset) % self.ring.capacity();
        self.offset += 1;
        self.remaining -= 1;
        self.ring.slots[idx].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for HistoryIter<'_, T> {}

impl<'a, T> IntoIterator for &'a HistoryRing<T> {
    type Item = &'a T;
    type IntoIter = HistoryIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_none_until_full() {
        let mut ring = HistoryRing::with_capacity(3);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert!(ring.is_full());
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.push(5), Some(2));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_iter_is_oldest_to_newest() {
        let mut ring = HistoryRing::with_capacity(3);
        for v in 1..=5 {
            ring.push(v);
        }
        let items: Vec<i32> = ring.iter().copied().collect();
        assert_eq!(items, vec![3, 4, 5]);
        assert_eq!(ring.oldest(), Some(&3));
        assert_eq!(ring.newest(), Some(&5));
    }

    #[test]
    fn test_nth_newest() {
        let mut ring = HistoryRing::with_capacity(4);
        for v in 10..16 {
            ring.push(v);
        }
        assert_eq!(ring.nth_newest(0), Some(&15));
        assert_eq!(ring.nth_newest(3), Some(&12));
        assert_eq!(ring.nth_newest(4), None);
    }

    #[test]
    fn test_clear_resets_order() {
        let mut ring = HistoryRing::with_capacity(2);
        ring.push('a');
        ring.push('b');
        ring.push('c');
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.push('d'), None);
        assert_eq!(ring.newest(), Some(&'d'));
        assert_eq!(ring.oldest(), Some(&'d'));
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn test_zero_capacity_panics() {
        let _ = HistoryRing::<u8>::with_capacity(0);
    }
}
