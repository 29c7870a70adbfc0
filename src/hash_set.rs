use core::fmt::Debug;

use crate::Error;
use crate::HashOrderMixing;
use crate::capacity;
use crate::cursor::Cursors;
use crate::error::infallible;
use crate::hash_table::HashTable;
use crate::policy::KeyPolicy;
use crate::policy::ValueEquality;

/// A hash set backed by a linear-probing [`HashTable`] with unit values.
///
/// `HashSet<K, P>` stores keys hashed and compared through the key policy
/// `P`, [`ValueEquality`] by default.
///
/// # Performance Characteristics
///
/// - **Memory**: one bit per slot of overhead, plus the size of `K`.
pub struct HashSet<K, P = ValueEquality> {
    table: HashTable<K, (), P>,
}

impl<K, P> Clone for HashSet<K, P>
where
    K: Clone,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K, P> PartialEq for HashSet<K, P>
where
    P: KeyPolicy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|k| other.contains(k))
    }
}

impl<K, P> Eq for HashSet<K, P> where P: KeyPolicy<K> {}

impl<K, P> Debug for HashSet<K, P>
where
    K: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> HashSet<K, ValueEquality> {
    /// Creates an empty set with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_policy(ValueEquality::default())
    }

    /// Creates an empty set able to hold `capacity` keys without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, ValueEquality::default())
    }
}

impl<K, S> HashSet<K, ValueEquality<S>> {
    /// Creates an empty set hashing keys with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    ///
    /// use shift_hash::HashSet;
    ///
    /// let mut set = HashSet::with_hasher(RandomState::new());
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_policy(ValueEquality::with_hasher(hash_builder))
    }

    /// Creates an empty set with the specified capacity, hashing keys with
    /// `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_policy(capacity, ValueEquality::with_hasher(hash_builder))
    }
}

impl<K, P> HashSet<K, P> {
    /// Creates an empty set using `policy` for key hashing and equality.
    pub fn with_policy(policy: P) -> Self {
        Self {
            table: HashTable::with_policy(policy),
        }
    }

    /// Creates an empty set with the specified capacity and key policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` cannot be represented at the default load factor.
    pub fn with_capacity_and_policy(capacity: usize, policy: P) -> Self {
        Self::try_with_capacity_and_policy(
            capacity,
            capacity::DEFAULT_LOAD_FACTOR,
            HashOrderMixing::Randomized,
            policy,
        )
        .unwrap_or_else(|e| infallible(e))
    }

    /// Creates an empty set from every construction parameter.
    ///
    /// See [`HashTable::try_with_capacity_and_policy`] for the errors.
    pub fn try_with_capacity_and_policy(
        expected_elements: usize,
        load_factor: f64,
        mixing: HashOrderMixing,
        policy: P,
    ) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity_and_policy(
                expected_elements,
                load_factor,
                mixing,
                policy,
            )?,
        })
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of keys the set can hold before growing.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the length of the backing slot array.
    pub fn buffer_len(&self) -> usize {
        self.table.buffer_len()
    }

    /// Returns the configured load factor.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Returns this set's hash order mixing seed.
    pub fn mixing_seed(&self) -> u64 {
        self.table.mixing_seed()
    }

    /// Returns the key policy.
    pub fn policy(&self) -> &P {
        self.table.policy()
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &HashTable<K, (), P> {
        &self.table
    }

    /// Removes all keys, keeping the allocated buffer.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all keys and shrinks the buffer to the minimum length.
    pub fn release(&mut self) {
        self.table.release();
    }

    /// Returns an iterator over the keys, in slot order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a cursor over the keys, exposing slot indices.
    pub fn cursor(&self) -> Cursors<'_, K, ()> {
        self.table.cursor()
    }

    /// Visits keys until `f` returns `false`. Returns `true` if every key
    /// was visited.
    pub fn for_each_while(&self, mut f: impl FnMut(&K) -> bool) -> bool {
        self.table.for_each_while(|k, _| f(k))
    }

    /// Removes and yields every key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let mut set: HashSet<u32> = (0..5).collect();
    /// let mut drained: Vec<u32> = set.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [0, 1, 2, 3, 4]);
    /// assert!(set.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, P> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Renders slot density; see
    /// [`HashTable::visualize_key_distribution`].
    pub fn visualize_key_distribution(&self, characters: usize) -> alloc::string::String {
        self.table.visualize_key_distribution(characters)
    }
}

impl<K, P> HashSet<K, P>
where
    P: KeyPolicy<K>,
{
    /// Adds `key` to the set. Returns `true` if it was not present.
    ///
    /// An equal key already in the set is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.table.insert(key, ()).is_none()
    }

    /// Fallible version of [`insert`](Self::insert). On error the set is
    /// unchanged.
    pub fn try_insert(&mut self, key: K) -> Result<bool, Error> {
        Ok(self.table.try_insert(key, ())?.is_none())
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.table.contains(key)
    }

    /// Returns the stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.table.get(key).map(|(k, _)| k)
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.table.remove(key).is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.table.remove(key).map(|(k, _)| k)
    }

    /// Locates `key`; see [`HashTable::index_of`].
    pub fn index_of(&self, key: &K) -> Result<usize, usize> {
        self.table.index_of(key)
    }

    /// Retains only the keys for which `f` returns `true`. Returns how many
    /// were removed.
    pub fn retain(&mut self, mut f: impl FnMut(&K) -> bool) -> usize {
        self.table.retain(|k, _| f(k))
    }

    /// Adds every key of `other`. Returns the number of keys that were not
    /// present before.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let mut a: HashSet<u32> = [1, 2].into_iter().collect();
    /// let b: HashSet<u32> = [2, 3, 4].into_iter().collect();
    /// assert_eq!(a.add_all(&b), 2);
    /// assert_eq!(a.len(), 4);
    /// ```
    pub fn add_all<Q>(&mut self, other: &HashSet<K, Q>) -> usize
    where
        K: Clone,
    {
        let before = self.len();
        self.table.reserve(other.len());
        for key in other.iter() {
            self.insert(key.clone());
        }
        self.len() - before
    }

    /// Removes every key that `other` contains. Returns how many were
    /// removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    ///
    /// let mut a: HashSet<u32> = (0..10).collect();
    /// let b: HashSet<u32> = (5..20).collect();
    /// assert_eq!(a.remove_all(&b), 5);
    /// assert_eq!(a.len(), 5);
    /// ```
    pub fn remove_all<Q>(&mut self, other: &HashSet<K, Q>) -> usize
    where
        Q: KeyPolicy<K>,
    {
        self.retain(|k| !other.contains(k))
    }

    /// Keeps only the keys that `other` contains. Returns how many were
    /// removed.
    pub fn retain_all<Q>(&mut self, other: &HashSet<K, Q>) -> usize
    where
        Q: KeyPolicy<K>,
    {
        self.retain(|k| other.contains(k))
    }

    /// Returns `true` if every key of `self` is in `other`.
    pub fn is_subset<Q>(&self, other: &HashSet<K, Q>) -> bool
    where
        Q: KeyPolicy<K>,
    {
        self.len() <= other.len() && self.iter().all(|k| other.contains(k))
    }

    /// Returns `true` if every key of `other` is in `self`.
    pub fn is_superset<Q>(&self, other: &HashSet<K, Q>) -> bool
    where
        Q: KeyPolicy<K>,
    {
        other.is_subset(self)
    }

    /// Returns `true` if `self` and `other` share no key.
    pub fn is_disjoint<Q>(&self, other: &HashSet<K, Q>) -> bool
    where
        Q: KeyPolicy<K>,
    {
        if self.len() <= other.len() {
            self.iter().all(|k| !other.contains(k))
        } else {
            other.iter().all(|k| !self.contains(k))
        }
    }

    /// Reserves capacity for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.try_reserve(additional)
    }

    /// Shrinks the buffer to the smallest length that holds the keys.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Re-lays the set out under a new mixing seed.
    pub fn reseed(&mut self, mixing: HashOrderMixing) {
        self.table.reseed(mixing);
    }

    /// Returns probe length statistics for the current layout.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, P> Default for HashSet<K, P>
where
    P: Default,
{
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<K, P> FromIterator<K> for HashSet<K, P>
where
    P: KeyPolicy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, P> Extend<K> for HashSet<K, P>
where
    P: KeyPolicy<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, P> Extend<&'a K> for HashSet<K, P>
where
    K: Copy + 'a,
    P: KeyPolicy<K>,
{
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, K, P> IntoIterator for &'a HashSet<K, P> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, P> IntoIterator for HashSet<K, P> {
    type Item = K;
    type IntoIter = IntoIter<K, P>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

/// An iterator over the keys of a `HashSet`.
pub struct Iter<'a, K> {
    inner: crate::hash_table::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// An owning iterator over the keys of a `HashSet`.
pub struct IntoIter<K, P> {
    inner: crate::hash_table::IntoIter<K, (), P>,
}

impl<K, P> Iterator for IntoIter<K, P> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the keys of a `HashSet`.
pub struct Drain<'a, K, P> {
    inner: crate::hash_table::Drain<'a, K, (), P>,
}

impl<K, P> Iterator for Drain<'_, K, P> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
