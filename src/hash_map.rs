use core::fmt::Debug;
use core::ops::AddAssign;

use crate::Error;
use crate::HashOrderMixing;
use crate::capacity;
use crate::cursor::Cursors;
use crate::error::infallible;
use crate::hash_table::HashTable;
use crate::policy::KeyPolicy;
use crate::policy::ValueEquality;

/// A hash map backed by a linear-probing [`HashTable`].
///
/// `HashMap<K, V, P>` stores key-value pairs whose keys are hashed and
/// compared through the key policy `P`. The default policy,
/// [`ValueEquality`], uses `Hash + Eq`; see [`IdentityEquality`] and
/// [`CustomEquality`] for the alternatives.
///
/// Every instance mixes raw hashes with its own seed, so iteration order
/// differs between two maps holding the same keys.
///
/// # Performance Characteristics
///
/// - **Memory**: one bit per slot of overhead, plus the size of `K` and `V`.
///
/// [`IdentityEquality`]: crate::IdentityEquality
/// [`CustomEquality`]: crate::CustomEquality
pub struct HashMap<K, V, P = ValueEquality> {
    table: HashTable<K, V, P>,
}

impl<K, V, P> Clone for HashMap<K, V, P>
where
    K: Clone,
    V: Clone,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K, V, P> Debug for HashMap<K, V, P>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P> PartialEq for HashMap<K, V, P>
where
    V: PartialEq,
    P: KeyPolicy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, P> Eq for HashMap<K, V, P>
where
    V: Eq,
    P: KeyPolicy<K>,
{
}

impl<K, V> HashMap<K, V, ValueEquality> {
    /// Creates an empty map with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_policy(ValueEquality::default())
    }

    /// Creates an empty map able to hold `capacity` entries without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, ValueEquality::default())
    }
}

impl<K, V, S> HashMap<K, V, ValueEquality<S>> {
    /// Creates an empty map hashing keys with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use shift_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_policy(ValueEquality::with_hasher(hash_builder))
    }

    /// Creates an empty map with the specified capacity, hashing keys with
    /// `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_policy(capacity, ValueEquality::with_hasher(hash_builder))
    }
}

impl<K, V, P> HashMap<K, V, P> {
    /// Creates an empty map using `policy` for key hashing and equality.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::rc::Rc;
    ///
    /// use shift_hash::HashMap;
    /// use shift_hash::IdentityEquality;
    ///
    /// let a = Rc::new(String::from("key"));
    /// let b = Rc::new(String::from("key"));
    ///
    /// let mut map = HashMap::with_policy(IdentityEquality);
    /// map.insert(a.clone(), 1);
    /// map.insert(b.clone(), 2);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&a), Some(&1));
    /// ```
    pub fn with_policy(policy: P) -> Self {
        Self {
            table: HashTable::with_policy(policy),
        }
    }

    /// Creates an empty map with the specified capacity and key policy.
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

    /// Creates an empty map from every construction parameter.
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

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map can hold before growing.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the length of the backing slot arrays.
    pub fn buffer_len(&self) -> usize {
        self.table.buffer_len()
    }

    /// Returns the configured load factor.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Returns this map's hash order mixing seed.
    pub fn mixing_seed(&self) -> u64 {
        self.table.mixing_seed()
    }

    /// Returns the key policy.
    pub fn policy(&self) -> &P {
        self.table.policy()
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &HashTable<K, V, P> {
        &self.table
    }

    /// Removes all entries, keeping the allocated buffer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all entries and shrinks the buffer to the minimum length.
    pub fn release(&mut self) {
        self.table.release();
    }

    /// Returns an iterator over the entries, in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let keys: Vec<_> = map.keys().collect();
    /// assert_eq!(keys.len(), 2);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns a cursor over the entries, exposing slot indices.
    pub fn cursor(&self) -> Cursors<'_, K, V> {
        self.table.cursor()
    }

    /// Visits entries until `f` returns `false`. Returns `true` if every
    /// entry was visited.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let map: HashMap<u32, u32> = (0..10).map(|k| (k, k)).collect();
    /// let mut visited = 0;
    /// let completed = map.for_each_while(|_, _| {
    ///     visited += 1;
    ///     visited < 3
    /// });
    /// assert!(!completed);
    /// assert_eq!(visited, 3);
    /// ```
    pub fn for_each_while(&self, f: impl FnMut(&K, &V) -> bool) -> bool {
        self.table.for_each_while(f)
    }

    /// Removes and yields every entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert!(map.is_empty());
    /// assert_eq!(pairs.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V, P> {
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

impl<K, V, P> HashMap<K, V, P>
where
    P: KeyPolicy<K>,
{
    /// Inserts a key-value pair.
    ///
    /// Returns the previous value if the key was present. The stored key is
    /// not replaced in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    /// Fallible version of [`insert`](Self::insert). On error the map is
    /// unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        self.table.try_insert(key, value)
    }

    /// Inserts the pair only if `key` is absent. Returns `true` if inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert!(map.insert_if_absent("k", 1));
    /// assert!(!map.insert_if_absent("k", 2));
    /// assert_eq!(map.get(&"k"), Some(&1));
    /// ```
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        match self.table.index_of(&key) {
            Ok(_) => false,
            Err(slot) => {
                self.table.index_insert(slot, key, value);
                true
            }
        }
    }

    /// Stores `put` for an absent key, or adds `increment` to the present
    /// value. Returns the value now stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.put_or_add("k", 10, 1), 10);
    /// assert_eq!(map.put_or_add("k", 10, 1), 11);
    /// ```
    pub fn put_or_add(&mut self, key: K, put: V, increment: V) -> V
    where
        V: AddAssign + Clone,
    {
        match self.table.index_of(&key) {
            Ok(slot) => {
                let value = self.table.index_get_mut(slot);
                *value += increment;
                value.clone()
            }
            Err(slot) => self.table.index_insert(slot, key, put).clone(),
        }
    }

    /// Adds `increment` to the value of `key`, inserting `increment` if the
    /// key is absent. Returns the value now stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     counts.add_to(word, 1);
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// ```
    pub fn add_to(&mut self, key: K, increment: V) -> V
    where
        V: AddAssign + Clone,
    {
        self.put_or_add(key, increment.clone(), increment)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.table.get(key)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Returns a copy of the value for `key`, or `V::default()` if absent.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains(key)
    }

    /// Removes `key`, returning its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.table.remove(key)
    }

    /// Retains only the entries for which `f` returns `true`.
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(f);
    }

    /// Removes every entry matching `predicate`. Returns how many were
    /// removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..10).map(|k| (k, k * k)).collect();
    /// assert_eq!(map.remove_all(|_, v| *v > 10), 6);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn remove_all(&mut self, mut predicate: impl FnMut(&K, &V) -> bool) -> usize {
        self.table.retain(|k, v| !predicate(k, v))
    }

    /// Inserts every entry of `other`, overwriting values of shared keys.
    /// Returns the number of keys that were not present before.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut a: HashMap<u32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
    /// let b: HashMap<u32, &str> = [(2, "B"), (3, "C")].into_iter().collect();
    /// assert_eq!(a.put_all(&b), 1);
    /// assert_eq!(a.get(&2), Some(&"B"));
    /// assert_eq!(a.len(), 3);
    /// ```
    pub fn put_all<Q>(&mut self, other: &HashMap<K, V, Q>) -> usize
    where
        K: Clone,
        V: Clone,
    {
        let before = self.len();
        self.table.reserve(other.len());
        for (k, v) in other.iter() {
            self.insert(k.clone(), v.clone());
        }
        self.len() - before
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, P> {
        match self.table.index_of(&key) {
            Ok(slot) => Entry::Occupied(OccupiedEntry {
                table: &mut self.table,
                slot,
            }),
            Err(slot) => Entry::Vacant(VacantEntry {
                table: &mut self.table,
                slot,
                key,
            }),
        }
    }

    /// Locates `key`; see [`HashTable::index_of`].
    pub fn index_of(&self, key: &K) -> Result<usize, usize> {
        self.table.index_of(key)
    }

    /// Returns `true` if `index` is an occupied slot.
    pub fn index_exists(&self, index: usize) -> bool {
        self.table.index_exists(index)
    }

    /// Returns the value at an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_get(&self, index: usize) -> &V {
        self.table.index_get(index)
    }

    /// Returns the value at an occupied slot mutably.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_get_mut(&mut self, index: usize) -> &mut V {
        self.table.index_get_mut(index)
    }

    /// Replaces the value at an occupied slot, returning the old value.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_replace(&mut self, index: usize, value: V) -> V {
        self.table.index_replace(index, value)
    }

    /// Inserts into the insertion slot returned by
    /// [`index_of`](Self::index_of); see [`HashTable::index_insert`].
    pub fn index_insert(&mut self, index: usize, key: K, value: V) -> &mut V {
        self.table.index_insert(index, key, value)
    }

    /// Removes the entry at an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_remove(&mut self, index: usize) -> (K, V) {
        self.table.index_remove(index)
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.try_reserve(additional)
    }

    /// Shrinks the buffer to the smallest length that holds the entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let mut map = HashMap::with_capacity(100);
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    /// assert!(map.capacity() >= 100);
    ///
    /// map.shrink_to_fit();
    /// assert!(map.capacity() >= 2);
    /// assert!(map.capacity() < 100);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Re-lays the map out under a new mixing seed.
    pub fn reseed(&mut self, mixing: HashOrderMixing) {
        self.table.reseed(mixing);
    }

    /// Returns probe length statistics for the current layout.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Returns a histogram of probe lengths.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram()
    }
}

impl<K, V, P> HashMap<K, V, P>
where
    P: KeyPolicy<K> + Default,
{
    /// Builds a map holding a copy of every entry of `other`.
    ///
    /// The new map is sized for `other.len()` entries and uses its own
    /// mixing seed, so its layout differs from `other`'s.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    ///
    /// let source: HashMap<u32, u32> = (0..100).map(|k| (k, k)).collect();
    /// let copy: HashMap<u32, u32> = HashMap::try_from_map(&source).unwrap();
    /// assert_eq!(copy, source);
    /// ```
    pub fn try_from_map<Q>(other: &HashMap<K, V, Q>) -> Result<Self, Error>
    where
        K: Clone,
        V: Clone,
    {
        let mut map = Self::try_with_capacity_and_policy(
            other.len(),
            capacity::DEFAULT_LOAD_FACTOR,
            HashOrderMixing::Randomized,
            P::default(),
        )?;
        for (k, v) in other.iter() {
            map.try_insert(k.clone(), v.clone())?;
        }
        Ok(map)
    }
}

impl<K, V, P> Default for HashMap<K, V, P>
where
    P: Default,
{
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<K, V, P> FromIterator<(K, V)> for HashMap<K, V, P>
where
    P: KeyPolicy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, P> Extend<(K, V)> for HashMap<K, V, P>
where
    P: KeyPolicy<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, P> IntoIterator for &'a HashMap<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, P> IntoIterator for HashMap<K, V, P> {
    type Item = (K, V);
    type IntoIter = crate::hash_table::IntoIter<K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, P> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, P>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, P>),
}

impl<'a, K, V, P> Entry<'a, K, V, P>
where
    P: KeyPolicy<K>,
{
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, P> Entry<'a, K, V, P>
where
    V: Default,
    P: KeyPolicy<K>,
{
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, P> {
    table: &'a mut HashTable<K, V, P>,
    slot: usize,
    key: K,
}

impl<'a, K, V, P> VacantEntry<'a, K, V, P>
where
    P: KeyPolicy<K>,
{
    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Returns the empty slot the entry would be inserted into, unless the
    /// insertion triggers growth.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let Self { table, slot, key } = self;
        table.index_insert(slot, key, value)
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, P> {
    table: &'a mut HashTable<K, V, P>,
    slot: usize,
}

impl<'a, K, V, P> OccupiedEntry<'a, K, V, P>
where
    P: KeyPolicy<K>,
{
    /// Gets a reference to the stored key.
    pub fn key(&self) -> &K {
        self.table.index_get_entry(self.slot).0
    }

    /// Returns the slot holding the entry.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.table.index_get(self.slot)
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.index_get_mut(self.slot)
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        let Self { table, slot } = self;
        table.index_get_mut(slot)
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        self.table.index_replace(self.slot, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.table.index_remove(self.slot).1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.table.index_remove(self.slot)
    }
}

/// An iterator over the entries of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
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

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the entries of a `HashMap`.
pub struct Drain<'a, K, V, P> {
    inner: crate::hash_table::Drain<'a, K, V, P>,
}

impl<K, V, P> Iterator for Drain<'_, K, V, P> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
