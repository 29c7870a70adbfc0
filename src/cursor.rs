//! Cursors over the live slots of a hash container.
//!
//! A [`Cursor`] names one occupied slot: its physical index together with
//! borrowed views of the key and value stored there. Cursors are yielded in
//! ascending slot order by [`Cursors`], and are invalidated (by the borrow
//! checker) by any structural modification of the container.

use core::fmt::Debug;

use crate::hash_table::Buffers;

/// A view of one occupied slot.
///
/// # Examples
///
/// ```rust
/// use shift_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("a", 1);
///
/// for cursor in map.cursor() {
///     assert_eq!(cursor.key, &"a");
///     assert_eq!(cursor.value, &1);
///     assert!(cursor.index < map.buffer_len());
/// }
/// ```
pub struct Cursor<'a, K, V = ()> {
    /// Physical slot index of the entry.
    pub index: usize,
    /// The key stored in the slot.
    pub key: &'a K,
    /// The value stored in the slot. Always `()` for sets.
    pub value: &'a V,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K: Debug, V: Debug> Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("key", self.key)
            .field("value", self.value)
            .finish()
    }
}

/// An iterator of [`Cursor`]s in ascending slot order.
pub struct Cursors<'a, K, V> {
    buffers: &'a Buffers<K, V>,
    slot: usize,
    remaining: usize,
}

impl<'a, K, V> Cursors<'a, K, V> {
    pub(crate) fn new(buffers: &'a Buffers<K, V>, remaining: usize) -> Self {
        Self {
            buffers,
            slot: 0,
            remaining,
        }
    }
}

impl<K, V> Clone for Cursors<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buffers: self.buffers,
            slot: self.slot,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Cursors<'a, K, V> {
    type Item = Cursor<'a, K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.buffers.occupied.next_occupied(self.slot)?;
        self.slot = index + 1;
        self.remaining -= 1;

        // SAFETY: `next_occupied` only returns slots whose key and value are
        // initialized, and the shared borrow keeps them that way.
        unsafe {
            Some(Cursor {
                index,
                key: self.buffers.keys[index].assume_init_ref(),
                value: self.buffers.values[index].assume_init_ref(),
            })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Cursors<'_, K, V> {}

impl<K, V> core::iter::FusedIterator for Cursors<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::HashSet;

    #[test]
    fn cursors_ascend_and_match_lookup() {
        let mut set = HashSet::new();
        for k in 0..100u32 {
            set.insert(k);
        }

        let cursors: Vec<_> = set.cursor().collect();
        assert_eq!(cursors.len(), 100);
        assert!(cursors.windows(2).all(|w| w[0].index < w[1].index));
        for cursor in &cursors {
            assert_eq!(set.index_of(cursor.key), Ok(cursor.index));
        }
    }

    #[test]
    fn cursors_on_empty_set() {
        let set: HashSet<u32> = HashSet::new();
        assert_eq!(set.cursor().count(), 0);
        assert_eq!(set.cursor().size_hint(), (0, Some(0)));
    }
}
