use alloc::collections::vec_deque::{self, VecDeque};
use core::iter::FusedIterator;

/// `BoundedList` is a fixed capacity list of key-value pairs, ordered from the
/// most recently used or inserted entry (index `0`) to the oldest one.
///
/// It does no hashing: lookups are a linear scan, which keeps it usable for any
/// `K: PartialEq`. The list never checks for duplicate keys; callers are expected to
/// call [`contains`] before [`insert_front`].
///
/// # Example
///
/// ```rust
/// use collatz_arc::BoundedList;
///
/// let mut list = BoundedList::new(2);
/// assert_eq!(list.insert_front(1, "a"), None);
/// assert_eq!(list.insert_front(2, "b"), None);
///
/// // full, the oldest entry is dropped to make room
/// assert_eq!(list.insert_front(3, "c"), Some((1, "a")));
///
/// // promote 2 back to the front
/// let idx = list.contains(&2).unwrap();
/// list.promote(idx);
/// assert_eq!(list.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
/// ```
///
/// [`contains`]: struct.BoundedList.html#method.contains
/// [`insert_front`]: struct.BoundedList.html#method.insert_front
#[derive(Debug, Clone)]
pub struct BoundedList<K, V> {
    entries: VecDeque<(K, V)>,
    cap: usize,
}

impl<K, V> BoundedList<K, V> {
    /// Creates an empty list which holds at most `cap` entries.
    /// A capacity of `0` is allowed; such a list never holds anything.
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Returns the maximum number of entries the list can hold.
    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Returns the number of entries currently in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the list holds `cap` entries.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.cap
    }

    /// Returns the entry at `idx`, `0` being the most recent one.
    pub fn get(&self, idx: usize) -> Option<(&K, &V)> {
        self.entries.get(idx).map(|(k, v)| (k, v))
    }

    /// Moves the entry at `idx` to the front of the list. Entries which were in front
    /// of it shift back by one position. Does nothing if `idx` is out of bounds.
    pub fn promote(&mut self, idx: usize) {
        if idx == 0 {
            return;
        }

        if let Some(ent) = self.entries.remove(idx) {
            self.entries.push_front(ent);
        }
    }

    /// Inserts an entry at the front of the list, whether or not the list has room.
    ///
    /// If the list is full the oldest entry is dropped to make room and returned.
    /// For a list of capacity `0` the new entry itself is returned, since it
    /// has nowhere to go.
    pub fn insert_front(&mut self, k: K, v: V) -> Option<(K, V)> {
        if self.cap == 0 {
            return Some((k, v));
        }

        let evicted = if self.is_full() {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front((k, v));
        evicted
    }

    /// Removes all entries. The capacity is unchanged.
    pub fn purge(&mut self) {
        self.entries.clear();
    }

    /// An iterator visiting all entries from the most recent to the oldest.
    /// The iterator element type is `(&'a K, &'a V)`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// An iterator visiting all keys from the most recent to the oldest.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.entries.iter(),
        }
    }
}

impl<K: PartialEq, V> BoundedList<K, V> {
    /// Returns the position of `k` in the list, or `None` if it is absent.
    pub fn contains(&self, k: &K) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == k)
    }
}

/// An iterator over the entries of a [`BoundedList`], most recent first.
///
/// [`BoundedList`]: struct.BoundedList.html
pub struct Iter<'a, K, V> {
    inner: vec_deque::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An iterator over the keys of a [`BoundedList`], most recent first.
///
/// [`BoundedList`]: struct.BoundedList.html
pub struct Keys<'a, K, V> {
    inner: vec_deque::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}
impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}
