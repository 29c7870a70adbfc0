use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::mem::MaybeUninit;

use crate::Error;
use crate::HashOrderMixing;
use crate::capacity;
use crate::cursor::Cursors;
use crate::error::infallible;
use crate::mixing::mix_hash;
use crate::policy::KeyPolicy;

/// One bit per slot, set while the slot holds a live key and value.
///
/// Occupancy is tracked apart from the keys for every key type, so no key
/// value is ever reserved as an "empty" marker.
pub(crate) struct Occupancy {
    words: Box<[u64]>,
}

impl Occupancy {
    fn try_new(len: usize) -> Result<Self, Error> {
        let words = len.div_ceil(64);
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(words)
            .map_err(|_| alloc_error::<u64>(words))?;
        buffer.resize(words, 0);
        Ok(Self {
            words: buffer.into_boxed_slice(),
        })
    }

    #[inline(always)]
    pub(crate) fn get(&self, index: usize) -> bool {
        self.words[index >> 6] & (1 << (index & 63)) != 0
    }

    #[inline(always)]
    fn set(&mut self, index: usize) {
        self.words[index >> 6] |= 1 << (index & 63);
    }

    #[inline(always)]
    fn clear(&mut self, index: usize) {
        self.words[index >> 6] &= !(1 << (index & 63));
    }

    fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Returns the first occupied slot at or after `from`.
    #[inline]
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        let mut word_index = from >> 6;
        let mut word = *self.words.get(word_index)? & (u64::MAX << (from & 63));
        loop {
            if word != 0 {
                return Some((word_index << 6) + word.trailing_zeros() as usize);
            }
            word_index += 1;
            word = *self.words.get(word_index)?;
        }
    }

    #[cfg(test)]
    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

fn alloc_error<T>(len: usize) -> Error {
    match Layout::array::<T>(len) {
        Ok(layout) => Error::AllocError { layout },
        Err(_) => Error::CapacityOverflow,
    }
}

fn try_alloc_slots<T>(len: usize) -> Result<Box<[MaybeUninit<T>]>, Error> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| alloc_error::<T>(len))?;
    buffer.resize_with(len, MaybeUninit::uninit);
    Ok(buffer.into_boxed_slice())
}

/// Parallel key and value arrays plus their occupancy bits.
///
/// Owns no live entries by itself: dropping a `Buffers` never drops a key or
/// value. The owning table is responsible for that.
pub(crate) struct Buffers<K, V> {
    pub(crate) keys: Box<[MaybeUninit<K>]>,
    pub(crate) values: Box<[MaybeUninit<V>]>,
    pub(crate) occupied: Occupancy,
}

impl<K, V> Buffers<K, V> {
    fn try_new(len: usize) -> Result<Self, Error> {
        debug_assert!(len.is_power_of_two());
        Ok(Self {
            keys: try_alloc_slots(len)?,
            values: try_alloc_slots(len)?,
            occupied: Occupancy::try_new(len)?,
        })
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Debug statistics for hash table analysis.
///
/// Available under `cfg(test)` or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Maximum load before resize
    pub capacity: usize,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Configured load factor
    pub load_factor: f64,
    /// Slot utilization (populated / total_slots)
    pub slot_utilization: f64,
    /// Longest distance of any entry from its home slot
    pub max_probe_length: usize,
    /// Average distance of entries from their home slot
    pub mean_probe_length: f64,
    /// Total memory in bytes used by the slot arrays
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} (load factor {:.2})",
            self.populated, self.capacity, self.load_factor
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.populated,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!(
            "Probe Length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash table with linear probing.
///
/// `HashTable<K, V, P>` is the engine behind [`HashMap`](crate::HashMap) and
/// [`HashSet`](crate::HashSet) (which stores `V = ()`). Keys and values live
/// in two parallel, power-of-two sized arrays; a separate occupancy bitmap
/// tells live slots from empty ones.
///
/// - Lookups start at the key's home slot, `mix(hash, seed) & (len - 1)`,
///   and walk forward one slot at a time until they find the key or an empty
///   slot.
/// - Removal never leaves a tombstone. Entries further along the probe chain
///   are shifted backward into the gap, so an empty slot always terminates a
///   lookup.
/// - The table grows by doubling once it holds `floor(len * load_factor)`
///   entries.
///
/// ## Performance Characteristics
///
/// - **Memory**: one bit per slot of overhead, plus the size of `K` and `V`.
///
/// ## Example
///
/// ```rust
/// use shift_hash::HashTable;
///
/// let mut table: HashTable<u64, &str> = HashTable::new();
/// assert_eq!(table.insert(7, "seven"), None);
/// assert_eq!(table.insert(7, "SEVEN"), Some("seven"));
///
/// match table.index_of(&7) {
///     Ok(slot) => assert_eq!(table.index_get(slot), &"SEVEN"),
///     Err(_) => unreachable!(),
/// }
/// ```
pub struct HashTable<K, V, P = crate::ValueEquality> {
    buffers: Buffers<K, V>,
    assigned: usize,
    resize_at: usize,
    mask: usize,
    load_factor: f64,
    seed: u64,
    policy: P,
}

impl<K, V, P> Drop for HashTable<K, V, P> {
    fn drop(&mut self) {
        self.drop_entries();
    }
}

impl<K, V, P> Clone for HashTable<K, V, P>
where
    K: Clone,
    V: Clone,
    P: Clone,
{
    fn clone(&self) -> Self {
        let buffers = Buffers::try_new(self.buffers.len()).unwrap_or_else(|e| infallible(e));
        let mut new_table = Self {
            buffers,
            assigned: 0,
            resize_at: self.resize_at,
            mask: self.mask,
            load_factor: self.load_factor,
            seed: self.seed,
            policy: self.policy.clone(),
        };

        // Same length and seed, so every entry keeps its slot.
        for cursor in self.cursor() {
            let slot = cursor.index;
            new_table.buffers.keys[slot].write(cursor.key.clone());
            new_table.buffers.values[slot].write(cursor.value.clone());
            new_table.buffers.occupied.set(slot);
            new_table.assigned += 1;
        }

        debug_assert_eq!(new_table.assigned, self.assigned);
        new_table
    }
}

impl<K, V, P> Debug for HashTable<K, V, P>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Slots<'a, K, V, P>(&'a HashTable<K, V, P>);

        impl<K: Debug, V: Debug, P> Debug for Slots<'_, K, V, P> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut list = f.debug_list();
                for (index, slot) in self.0.slots().enumerate() {
                    match slot {
                        Some((k, v)) => list.entry(&(index, k, v)),
                        None => list.entry(&format_args!("..")),
                    };
                }
                list.finish()
            }
        }

        f.debug_struct("HashTable")
            .field("slots", &Slots(self))
            .field("populated", &self.assigned)
            .field("capacity", &self.resize_at)
            .field("seed", &format_args!("{:#018x}", self.seed))
            .finish()
    }
}

impl<K, V, P> HashTable<K, V, P>
where
    P: Default,
{
    /// Creates an empty table with the default capacity and load factor.
    pub fn new() -> Self {
        Self::with_policy(P::default())
    }

    /// Creates a table able to hold at least `capacity` elements without
    /// growing, at the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds
    /// [`max_capacity`](crate::capacity::max_capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashTable;
    ///
    /// let table: HashTable<u32, String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity_and_policy(
            capacity,
            capacity::DEFAULT_LOAD_FACTOR,
            HashOrderMixing::Randomized,
            P::default(),
        )
        .unwrap_or_else(|e| infallible(e))
    }
}

impl<K, V, P> Default for HashTable<K, V, P>
where
    P: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P> HashTable<K, V, P> {
    /// Creates an empty table using `policy` for key hashing and equality.
    pub fn with_policy(policy: P) -> Self {
        Self::try_with_capacity_and_policy(
            capacity::DEFAULT_EXPECTED_ELEMENTS,
            capacity::DEFAULT_LOAD_FACTOR,
            HashOrderMixing::Randomized,
            policy,
        )
        .unwrap_or_else(|e| infallible(e))
    }

    /// Creates a table sized for `expected_elements` at `load_factor`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLoadFactor`] if `load_factor` is out of range.
    /// - [`Error::CapacityOverflow`] if no legal buffer length can hold
    ///   `expected_elements` at `load_factor`.
    /// - [`Error::AllocError`] if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::Error;
    /// use shift_hash::HashOrderMixing;
    /// use shift_hash::HashTable;
    /// use shift_hash::ValueEquality;
    ///
    /// let table = HashTable::<u32, u32, ValueEquality>::try_with_capacity_and_policy(
    ///     10,
    ///     0.5,
    ///     HashOrderMixing::Fixed(1),
    ///     ValueEquality::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(table.buffer_len(), 32);
    ///
    /// let bad = HashTable::<u32, u32, ValueEquality>::try_with_capacity_and_policy(
    ///     10,
    ///     1.0,
    ///     HashOrderMixing::Randomized,
    ///     ValueEquality::default(),
    /// );
    /// assert!(matches!(bad, Err(Error::InvalidLoadFactor { .. })));
    /// ```
    pub fn try_with_capacity_and_policy(
        expected_elements: usize,
        load_factor: f64,
        mixing: HashOrderMixing,
        policy: P,
    ) -> Result<Self, Error> {
        let length = capacity::min_buffer_size(expected_elements, load_factor)?;
        let buffers = Buffers::try_new(length)?;

        Ok(Self {
            buffers,
            assigned: 0,
            resize_at: capacity::expand_at_count(length, load_factor),
            mask: length - 1,
            load_factor,
            seed: mixing.seed(),
            policy,
        })
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.assigned
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Returns the number of elements the table can hold before growing.
    pub fn capacity(&self) -> usize {
        self.resize_at
    }

    /// Returns the length of the backing slot arrays. Always a power of two.
    pub fn buffer_len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns the element count at which the table grows.
    ///
    /// Same as [`capacity`](Self::capacity); named after the invariant
    /// `len() <= resize_threshold() < buffer_len()`.
    pub fn resize_threshold(&self) -> usize {
        self.resize_at
    }

    /// Returns the configured load factor.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Returns this instance's hash order mixing seed.
    pub fn mixing_seed(&self) -> u64 {
        self.seed
    }

    /// Returns the key policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns `true` if slot `index` holds an entry.
    ///
    /// Out-of-range indices are reported as unoccupied.
    #[inline]
    pub fn is_occupied(&self, index: usize) -> bool {
        index < self.buffer_len() && self.buffers.occupied.get(index)
    }

    /// Returns the entry stored in slot `index`, if any.
    ///
    /// Together with [`buffer_len`](Self::buffer_len) this exposes the
    /// physical layout of the table.
    #[inline]
    pub fn slot(&self, index: usize) -> Option<(&K, &V)> {
        if self.is_occupied(index) {
            // SAFETY: The occupancy bit is set only while both arrays hold an
            // initialized entry at `index`.
            unsafe {
                Some((
                    self.buffers.keys[index].assume_init_ref(),
                    self.buffers.values[index].assume_init_ref(),
                ))
            }
        } else {
            None
        }
    }

    /// Returns every slot of the backing buffer in order, `None` for empty
    /// slots.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = Option<(&K, &V)>> + '_ {
        (0..self.buffer_len()).map(move |index| self.slot(index))
    }

    /// Returns a cursor over all entries, in slot order.
    pub fn cursor(&self) -> Cursors<'_, K, V> {
        Cursors::new(&self.buffers, self.assigned)
    }

    /// Returns an iterator over all entries, in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.cursor(),
        }
    }

    /// Returns an iterator over all entries with mutable access to the
    /// values, in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            occupied: &self.buffers.occupied,
            keys: &self.buffers.keys,
            values: self.buffers.values.iter_mut().enumerate(),
            remaining: self.assigned,
        }
    }

    /// Visits entries in slot order until `f` returns `false`.
    ///
    /// Returns `true` if every entry was visited.
    pub fn for_each_while(&self, mut f: impl FnMut(&K, &V) -> bool) -> bool {
        self.cursor().all(|cursor| f(cursor.key, cursor.value))
    }

    /// Removes and yields every entry. The buffer is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V, P> {
        Drain {
            table: self,
            slot: 0,
        }
    }

    /// Removes all elements, keeping the allocated buffer.
    pub fn clear(&mut self) {
        self.drop_entries();
    }

    fn drop_entries(&mut self) {
        if core::mem::needs_drop::<K>() || core::mem::needs_drop::<V>() {
            let mut from = 0;
            while let Some(slot) = self.buffers.occupied.next_occupied(from) {
                // Clear first so a panicking destructor cannot cause a
                // double drop later on.
                self.buffers.occupied.clear(slot);
                self.assigned -= 1;
                // SAFETY: The slot was occupied, so both entries are
                // initialized, and clearing the bit hands ownership to us.
                unsafe {
                    self.buffers.keys[slot].assume_init_drop();
                    self.buffers.values[slot].assume_init_drop();
                }
                from = slot + 1;
            }
        }

        self.buffers.occupied.clear_all();
        self.assigned = 0;
    }

    /// Removes all elements and shrinks the buffer to the minimum length.
    pub fn release(&mut self) {
        self.drop_entries();
        let length = capacity::MIN_HASH_ARRAY_LENGTH;
        if self.buffer_len() != length {
            self.buffers = Buffers::try_new(length).unwrap_or_else(|e| infallible(e));
            self.mask = length - 1;
            self.resize_at = capacity::expand_at_count(length, self.load_factor);
        }
    }

    /// Renders the key distribution over the buffer as `characters` digits.
    ///
    /// The buffer is divided into `characters` equal spans; each span is
    /// shown as `.` when empty, or as a digit from `0` to `9` proportional to
    /// its occupancy. Long runs of `9` reveal clustering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashTable;
    ///
    /// let table: HashTable<u32, ()> = HashTable::new();
    /// assert_eq!(table.visualize_key_distribution(4), "....");
    /// ```
    pub fn visualize_key_distribution(&self, characters: usize) -> String {
        let length = self.buffer_len();
        let characters = characters.clamp(1, length);
        let span = length / characters;

        let mut out = String::with_capacity(characters);
        for chunk in 0..characters {
            let start = chunk * span;
            let end = if chunk + 1 == characters {
                length
            } else {
                start + span
            };
            let used = (start..end)
                .filter(|&slot| self.buffers.occupied.get(slot))
                .count();
            if used == 0 {
                out.push('.');
            } else {
                let digit = (used * 9).div_ceil(end - start).min(9) as u8;
                out.push(char::from(b'0' + digit));
            }
        }
        out
    }

    #[inline(always)]
    fn next_slot(&self, slot: usize) -> usize {
        (slot + 1) & self.mask
    }

    /// Reads the key at an occupied slot.
    ///
    /// # Safety
    ///
    /// The caller must ensure slot `index` is occupied.
    #[inline(always)]
    unsafe fn key_at(&self, index: usize) -> &K {
        debug_assert!(self.buffers.occupied.get(index));
        // SAFETY: Caller ensures the slot is occupied, so the key is initialized.
        unsafe { self.buffers.keys.get_unchecked(index).assume_init_ref() }
    }

    /// Writes an entry into an empty slot.
    #[inline(always)]
    fn write_slot(&mut self, index: usize, key: K, value: V) -> &mut V {
        debug_assert!(!self.buffers.occupied.get(index));
        self.buffers.keys[index].write(key);
        self.buffers.occupied.set(index);
        self.buffers.values[index].write(value)
    }

    /// Moves the entry out of an occupied slot, leaving it empty.
    ///
    /// # Safety
    ///
    /// The caller must ensure slot `index` is occupied.
    #[inline(always)]
    unsafe fn take_slot(&mut self, index: usize) -> (K, V) {
        debug_assert!(self.buffers.occupied.get(index));
        self.buffers.occupied.clear(index);
        // SAFETY: Caller ensures the slot was occupied; the bit is now clear,
        // so the entry is read exactly once.
        unsafe {
            (
                self.buffers.keys[index].assume_init_read(),
                self.buffers.values[index].assume_init_read(),
            )
        }
    }
}

impl<K, V, P> HashTable<K, V, P>
where
    P: KeyPolicy<K>,
{
    /// Returns the home slot of `key` in the current buffer.
    #[inline(always)]
    fn home_slot(&self, key: &K) -> usize {
        mix_hash(self.policy.hash_key(key), self.seed) as usize & self.mask
    }

    /// Walks from `slot` to the first empty slot.
    ///
    /// Terminates because the threshold keeps at least one slot empty.
    #[inline]
    fn probe_empty(&self, mut slot: usize) -> usize {
        while self.buffers.occupied.get(slot) {
            slot = self.next_slot(slot);
        }
        slot
    }

    /// Locates `key`.
    ///
    /// Returns `Ok(slot)` if the key is present, or `Err(slot)` with the
    /// empty slot it would be inserted into. An `Err` slot stays valid for
    /// [`index_insert`](Self::index_insert) until the table is modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashTable;
    ///
    /// let mut table: HashTable<u8, u8> = HashTable::new();
    /// let slot = table.index_of(&1).unwrap_err();
    /// table.index_insert(slot, 1, 10);
    /// let slot = table.index_of(&1).unwrap();
    /// assert_eq!(table.index_replace(slot, 11), 10);
    /// assert_eq!(table.index_remove(slot), (1, 11));
    /// assert!(table.is_empty());
    /// ```
    #[inline]
    pub fn index_of(&self, key: &K) -> Result<usize, usize> {
        let mut slot = self.home_slot(key);
        loop {
            if !self.buffers.occupied.get(slot) {
                return Err(slot);
            }
            // SAFETY: The slot was just checked to be occupied.
            if self.policy.keys_equal(unsafe { self.key_at(slot) }, key) {
                return Ok(slot);
            }
            slot = self.next_slot(slot);
        }
    }

    /// Returns `true` if `index` is an occupied slot, as returned in `Ok`
    /// from [`index_of`](Self::index_of).
    pub fn index_exists(&self, index: usize) -> bool {
        self.is_occupied(index)
    }

    /// Returns the key and value at an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_get_entry(&self, index: usize) -> (&K, &V) {
        match self.slot(index) {
            Some(entry) => entry,
            None => missing_slot(index),
        }
    }

    /// Returns the value at an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_get(&self, index: usize) -> &V {
        self.index_get_entry(index).1
    }

    /// Returns the value at an occupied slot mutably.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_get_mut(&mut self, index: usize) -> &mut V {
        if !self.is_occupied(index) {
            missing_slot(index);
        }
        // SAFETY: Checked above that the slot is occupied.
        unsafe { self.buffers.values[index].assume_init_mut() }
    }

    /// Replaces the value at an occupied slot, returning the old value.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_replace(&mut self, index: usize, value: V) -> V {
        core::mem::replace(self.index_get_mut(index), value)
    }

    /// Inserts `key` into the empty slot returned in `Err` from
    /// [`index_of`](Self::index_of), growing first if the table is at its
    /// threshold.
    ///
    /// `index` must come from `index_of(&key)` with no modification of the
    /// table in between; debug builds verify this.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is occupied, or if growth overflows.
    pub fn index_insert(&mut self, index: usize, key: K, value: V) -> &mut V {
        self.try_index_insert(index, key, value)
            .unwrap_or_else(|e| infallible(e))
    }

    /// Fallible version of [`index_insert`](Self::index_insert).
    ///
    /// On error the table is unchanged and `key` and `value` are dropped.
    pub fn try_index_insert(&mut self, index: usize, key: K, value: V) -> Result<&mut V, Error> {
        assert!(
            index < self.buffer_len() && !self.buffers.occupied.get(index),
            "slot {index} is not an empty insertion slot"
        );
        debug_assert_eq!(
            self.index_of(&key),
            Err(index),
            "slot {index} is not the insertion slot of this key"
        );

        let index = if self.assigned >= self.resize_at {
            self.try_grow()?;
            self.probe_empty(self.home_slot(&key))
        } else {
            index
        };

        self.assigned += 1;
        Ok(self.write_slot(index, key, value))
    }

    /// Removes the entry at an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if slot `index` is not occupied.
    pub fn index_remove(&mut self, index: usize) -> (K, V) {
        if !self.is_occupied(index) {
            missing_slot(index);
        }

        // SAFETY: Checked above that the slot is occupied.
        let entry = unsafe { self.take_slot(index) };
        self.assigned -= 1;
        self.shift_conflicting_keys(index);
        entry
    }

    /// Closes the gap at `gap` by moving later entries of the probe chain
    /// backward.
    ///
    /// An entry at `slot` may fill the gap when the gap lies between its
    /// home slot and `slot` in probe order, i.e. when its probe distance is
    /// at least the distance from the gap. The walk ends at the first empty
    /// slot.
    fn shift_conflicting_keys(&mut self, mut gap: usize) {
        debug_assert!(!self.buffers.occupied.get(gap));

        let mask = self.mask;
        let mut distance = 0;
        loop {
            distance += 1;
            let slot = (gap + distance) & mask;
            if !self.buffers.occupied.get(slot) {
                break;
            }

            // SAFETY: The slot was just checked to be occupied.
            let home = self.home_slot(unsafe { self.key_at(slot) });
            let probe_distance = slot.wrapping_sub(home) & mask;
            if probe_distance >= distance {
                self.buffers.keys.swap(gap, slot);
                self.buffers.values.swap(gap, slot);
                self.buffers.occupied.set(gap);
                self.buffers.occupied.clear(slot);
                gap = slot;
                distance = 0;
            }
        }
    }

    /// Inserts a key-value pair, returning the previous value for an
    /// existing key. The stored key is kept in that case.
    ///
    /// # Panics
    ///
    /// Panics if growth overflows the maximum buffer length.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.try_insert(key, value).unwrap_or_else(|e| infallible(e))
    }

    /// Fallible version of [`insert`](Self::insert).
    ///
    /// On error the table is unchanged and `key` and `value` are dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        match self.index_of(&key) {
            Ok(slot) => Ok(Some(self.index_replace(slot, value))),
            Err(slot) => {
                self.try_index_insert(slot, key, value)?;
                Ok(None)
            }
        }
    }

    /// Returns the entry stored for `key`.
    #[inline]
    pub fn get(&self, key: &K) -> Option<(&K, &V)> {
        match self.index_of(key) {
            Ok(slot) => self.slot(slot),
            Err(_) => None,
        }
    }

    /// Returns the value stored for `key` mutably.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.index_of(key) {
            Ok(slot) => Some(self.index_get_mut(slot)),
            Err(_) => None,
        }
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index_of(key).is_ok()
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        match self.index_of(key) {
            Ok(slot) => Some(self.index_remove(slot)),
            Err(_) => None,
        }
    }

    /// Retains only the entries for which `f` returns `true`.
    ///
    /// `f` is called exactly once per entry.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) -> usize {
        if self.assigned == 0 {
            return 0;
        }

        // Start right after an empty slot: clusters never straddle it, so
        // backward shifts only move entries that have not been visited yet.
        let start = self.probe_empty(0);
        let length = self.buffer_len();
        let before = self.assigned;

        let mut offset = 1;
        while offset < length {
            let slot = (start + offset) & self.mask;
            if self.buffers.occupied.get(slot) {
                // SAFETY: The slot was just checked to be occupied.
                let keep = unsafe {
                    f(
                        self.buffers.keys[slot].assume_init_ref(),
                        self.buffers.values[slot].assume_init_mut(),
                    )
                };
                if !keep {
                    self.index_remove(slot);
                    // Re-examine the slot: the shift may have filled it.
                    continue;
                }
            }
            offset += 1;
        }

        before - self.assigned
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new buffer length overflows.
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional)
            .unwrap_or_else(|e| infallible(e));
    }

    /// Fallible version of [`reserve`](Self::reserve). On error the table is
    /// unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .assigned
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required > self.resize_at {
            let length = capacity::min_buffer_size(required, self.load_factor)?;
            self.try_rehash(length, self.seed)?;
        }
        Ok(())
    }

    /// Shrinks the buffer to the smallest length that holds the current
    /// elements.
    pub fn shrink_to_fit(&mut self) {
        let length = capacity::min_buffer_size(self.assigned, self.load_factor)
            .unwrap_or_else(|e| infallible(e));
        if length < self.buffer_len() {
            self.try_rehash(length, self.seed)
                .unwrap_or_else(|e| infallible(e));
        }
    }

    /// Re-lays the table out under a new mixing seed.
    ///
    /// Logical contents are unchanged; only the physical slot assignment
    /// moves.
    pub fn reseed(&mut self, mixing: HashOrderMixing) {
        self.try_rehash(self.buffer_len(), mixing.seed())
            .unwrap_or_else(|e| infallible(e));
    }

    #[cold]
    fn try_grow(&mut self) -> Result<(), Error> {
        let length =
            capacity::next_buffer_size(self.buffer_len(), self.assigned, self.load_factor)?;
        self.try_rehash(length, self.seed)
    }

    /// Moves every entry into freshly allocated buffers of `length` slots.
    ///
    /// The new buffers are allocated before anything is touched, so failure
    /// leaves the table as it was.
    fn try_rehash(&mut self, length: usize, seed: u64) -> Result<(), Error> {
        debug_assert!(capacity::expand_at_count(length, self.load_factor) >= self.assigned);

        let new_buffers = Buffers::try_new(length)?;
        let mut old = core::mem::replace(&mut self.buffers, new_buffers);
        self.mask = length - 1;
        self.resize_at = capacity::expand_at_count(length, self.load_factor);
        self.seed = seed;

        let expected = self.assigned;
        self.assigned = 0;

        let mut from = 0;
        while let Some(old_slot) = old.occupied.next_occupied(from) {
            old.occupied.clear(old_slot);
            // SAFETY: The bit was set, so both entries are initialized; it is
            // now clear, so ownership moves to the new buffers exactly once.
            let (key, value) = unsafe {
                (
                    old.keys[old_slot].assume_init_read(),
                    old.values[old_slot].assume_init_read(),
                )
            };
            let slot = self.probe_empty(self.home_slot(&key));
            self.write_slot(slot, key, value);
            self.assigned += 1;
            from = old_slot + 1;
        }

        debug_assert_eq!(self.assigned, expected);
        Ok(())
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Entry `d` of the result counts the entries stored `d` slots after
    /// their home slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for cursor in self.cursor() {
            let distance = cursor.index.wrapping_sub(self.home_slot(cursor.key)) & self.mask;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let total_probe: usize = hist.iter().enumerate().map(|(d, &n)| d * n).sum();
        let total_slots = self.buffer_len();

        DebugStats {
            populated: self.assigned,
            capacity: self.resize_at,
            total_slots,
            load_factor: self.load_factor,
            slot_utilization: self.assigned as f64 / total_slots as f64,
            max_probe_length: hist.len().saturating_sub(1),
            mean_probe_length: if self.assigned == 0 {
                0.0
            } else {
                total_probe as f64 / self.assigned as f64
            },
            total_bytes: total_slots
                * (core::mem::size_of::<K>() + core::mem::size_of::<V>())
                + total_slots.div_ceil(64) * 8,
        }
    }

    /// Checks every structural invariant, panicking on the first violation.
    ///
    /// Test-only: compiled only with `cfg(test)`.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let length = self.buffer_len();
        assert!(length.is_power_of_two());
        assert!(length >= capacity::MIN_HASH_ARRAY_LENGTH);
        assert!(self.assigned <= self.resize_at);
        assert!(self.resize_at < length);
        assert_eq!(self.buffers.occupied.count(), self.assigned);

        for cursor in self.cursor() {
            let mut slot = self.home_slot(cursor.key);
            while slot != cursor.index {
                assert!(
                    self.buffers.occupied.get(slot),
                    "empty slot {slot} breaks the probe chain of slot {}",
                    cursor.index
                );
                slot = self.next_slot(slot);
            }
        }
    }
}

#[cold]
#[inline(never)]
fn missing_slot(index: usize) -> ! {
    panic!("slot {index} is not occupied")
}

/// An iterator over the entries of a [`HashTable`], in slot order.
pub struct Iter<'a, K, V> {
    inner: Cursors<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|cursor| (cursor.key, cursor.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashTable`], in slot order.
pub struct IterMut<'a, K, V> {
    occupied: &'a Occupancy,
    keys: &'a [MaybeUninit<K>],
    values: core::iter::Enumerate<core::slice::IterMut<'a, MaybeUninit<V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (slot, value) in self.values.by_ref() {
            if self.occupied.get(slot) {
                self.remaining -= 1;
                // SAFETY: The slot is occupied, so key and value are
                // initialized. The shared borrow of the table's keys and the
                // exclusive borrow of its values are disjoint.
                return Some(unsafe { (self.keys[slot].assume_init_ref(), value.assume_init_mut()) });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// A draining iterator over the entries of a [`HashTable`].
///
/// Entries not consumed are dropped when the iterator is dropped.
pub struct Drain<'a, K, V, P> {
    table: &'a mut HashTable<K, V, P>,
    slot: usize,
}

impl<K, V, P> Iterator for Drain<'_, K, V, P> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.table.buffers.occupied.next_occupied(self.slot)?;
        self.slot = slot + 1;
        self.table.assigned -= 1;
        // SAFETY: `next_occupied` only returns occupied slots. No shift is
        // needed because every entry is removed eventually.
        Some(unsafe { self.table.take_slot(slot) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.assigned, Some(self.table.assigned))
    }
}

impl<K, V, P> ExactSizeIterator for Drain<'_, K, V, P> {}

impl<K, V, P> Drop for Drain<'_, K, V, P> {
    fn drop(&mut self) {
        self.table.drop_entries();
    }
}

/// An owning iterator over the entries of a [`HashTable`].
pub struct IntoIter<K, V, P> {
    table: HashTable<K, V, P>,
    slot: usize,
}

impl<K, V, P> Iterator for IntoIter<K, V, P> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.table.buffers.occupied.next_occupied(self.slot)?;
        self.slot = slot + 1;
        self.table.assigned -= 1;
        // SAFETY: `next_occupied` only returns occupied slots.
        Some(unsafe { self.table.take_slot(slot) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.assigned, Some(self.table.assigned))
    }
}

impl<K, V, P> ExactSizeIterator for IntoIter<K, V, P> {}

impl<K, V, P> IntoIterator for HashTable<K, V, P> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            slot: 0,
        }
    }
}

impl<'a, K, V, P> IntoIterator for &'a HashTable<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::Cell;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::CustomEquality;
    use crate::ValueEquality;

    type Table<V> = HashTable<u64, V, ValueEquality>;

    fn fixed<V>(expected: usize, load_factor: f64, seed: u64) -> Table<V> {
        Table::try_with_capacity_and_policy(
            expected,
            load_factor,
            HashOrderMixing::Fixed(seed),
            ValueEquality::default(),
        )
        .unwrap()
    }

    /// Every key hashes to the same raw value: one giant probe chain.
    fn colliding() -> HashTable<u64, u64, CustomEquality<fn(&u64) -> u64, fn(&u64, &u64) -> bool>> {
        HashTable::with_policy(CustomEquality::new(
            (|_: &u64| 0) as fn(&u64) -> u64,
            (|a: &u64, b: &u64| a == b) as fn(&u64, &u64) -> bool,
        ))
    }

    fn layout<V>(table: &Table<V>) -> Vec<Option<u64>> {
        table.slots().map(|slot| slot.map(|(k, _)| *k)).collect()
    }

    #[test]
    fn insert_and_find() {
        let mut table: Table<i32> = Table::new();
        for k in 0..32u64 {
            assert_eq!(table.insert(k, (k as i32) * 2), None);
            assert_eq!(table.get(&k), Some((&k, &((k as i32) * 2))), "{:#?}", table);
        }
        assert_eq!(table.len(), 32);
        for k in 0..32u64 {
            assert_eq!(table.get(&k).map(|(_, v)| *v), Some((k as i32) * 2));
        }
        assert!(table.get(&999).is_none());
        table.assert_invariants();
    }

    #[test]
    fn duplicate_insert_replaces_value_and_keeps_count() {
        let mut table: Table<i32> = Table::new();
        assert_eq!(table.insert(42, 7), None);
        assert_eq!(table.insert(42, 11), Some(7));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&42), Some((&42, &11)));
    }

    #[test]
    fn two_hundred_keys_force_growth() {
        let mut table = fixed::<u64>(0, 0.75, 1);
        let initial = table.buffer_len();
        assert!(capacity::expand_at_count(initial, 0.75) < 200);

        for k in 0..200u64 {
            table.insert(k, k + 1000);
        }

        assert_eq!(table.len(), 200);
        assert!(table.buffer_len() > initial);
        assert_eq!(table.buffer_len(), 512);
        for k in 0..200u64 {
            assert_eq!(table.get(&k).map(|(_, v)| *v), Some(k + 1000));
        }
        table.assert_invariants();
    }

    #[test]
    fn growth_respects_threshold() {
        let mut table = fixed::<()>(0, 0.5, 3);
        for k in 0..1000u64 {
            table.insert(k, ());
            assert!(table.len() <= table.resize_threshold());
            assert!(table.resize_threshold() < table.buffer_len());
        }
    }

    #[test]
    fn tiny_load_factor_still_grows() {
        let mut table = fixed::<()>(0, 0.01, 9);
        assert_eq!(table.resize_threshold(), 0);
        for k in 0..50u64 {
            table.insert(k, ());
        }
        assert_eq!(table.len(), 50);
        table.assert_invariants();
    }

    #[test]
    fn remove_items() {
        let mut table: Table<u64> = Table::new();
        for k in 0..8u64 {
            table.insert(k, k * 10);
        }
        for k in (0..8u64).step_by(2) {
            assert_eq!(table.remove(&k), Some((k, k * 10)));
        }
        assert_eq!(table.len(), 4);
        for k in 0..8u64 {
            assert_eq!(table.contains(&k), k % 2 == 1);
        }
        assert_eq!(table.remove(&0), None);
        table.assert_invariants();
    }

    #[test]
    fn backward_shift_repairs_single_cluster() {
        let mut table = colliding();
        for k in 0..3u64 {
            table.insert(k, k);
        }
        table.assert_invariants();

        // Removing the head of the chain must pull the rest back.
        assert_eq!(table.remove(&0), Some((0, 0)));
        table.assert_invariants();
        assert!(table.contains(&1));
        assert!(table.contains(&2));
        assert!(!table.contains(&0));

        assert_eq!(table.remove(&2), Some((2, 2)));
        assert_eq!(table.remove(&1), Some((1, 1)));
        assert!(table.is_empty());
        assert_eq!(
            (0..table.buffer_len())
                .filter(|&s| table.is_occupied(s))
                .count(),
            0
        );
    }

    #[test]
    fn backward_shift_handles_wraparound() {
        // Two keys per home slot, with homes chosen near the end of the
        // buffer so chains wrap to slot zero.
        let mut table = fixed::<u64>(0, 0.75, 0);
        let len = table.buffer_len() as u64;
        let mut by_home: Vec<Vec<u64>> = vec![Vec::new(); len as usize];
        for k in 0..10_000u64 {
            let home = table.home_slot(&k);
            by_home[home].push(k);
        }
        let last = (len - 1) as usize;
        let keys = [by_home[last][0], by_home[last][1], by_home[0][0]];
        for &k in &keys {
            table.insert(k, k);
        }
        assert_eq!(table.buffer_len() as u64, len, "no growth expected");
        table.assert_invariants();

        assert!(table.remove(&keys[0]).is_some());
        table.assert_invariants();
        assert!(table.contains(&keys[1]));
        assert!(table.contains(&keys[2]));
        // The wrapped entry moved back to the end of the buffer.
        assert_eq!(table.index_of(&keys[1]), Ok(last));
        assert_eq!(table.index_of(&keys[2]), Ok(0));
    }

    #[test]
    fn random_insert_remove_keeps_probe_chains() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut table = fixed::<u32>(0, 0.9, 77);
        let mut model = std::collections::HashMap::new();

        for step in 0..20_000u32 {
            let key = rng.random_range(0..512u64);
            if rng.random_bool(0.55) {
                assert_eq!(table.insert(key, step), model.insert(key, step));
            } else {
                assert_eq!(table.remove(&key).map(|(_, v)| v), model.remove(&key));
            }
            if step % 512 == 0 {
                table.assert_invariants();
            }
        }

        table.assert_invariants();
        assert_eq!(table.len(), model.len());
        for (k, v) in &model {
            assert_eq!(table.get(k).map(|(_, v)| v), Some(v));
        }
    }

    #[test]
    fn retain_visits_each_entry_once() {
        let mut table = colliding();
        for k in 0..3u64 {
            table.insert(k, k);
        }
        let mut visits = 0;
        let removed = table.retain(|k, _| {
            visits += 1;
            *k == 1
        });
        assert_eq!(visits, 3);
        assert_eq!(removed, 2);
        assert_eq!(table.len(), 1);
        assert!(table.contains(&1));
        table.assert_invariants();

        let mut table = fixed::<u64>(0, 0.75, 5);
        for k in 0..1000u64 {
            table.insert(k, k);
        }
        let mut visits = 0;
        table.retain(|k, v| {
            visits += 1;
            *v += 1;
            k % 3 == 0
        });
        assert_eq!(visits, 1000);
        assert_eq!(table.len(), 334);
        for k in 0..1000u64 {
            assert_eq!(table.get(&k).map(|(_, v)| *v), (k % 3 == 0).then_some(k + 1));
        }
        table.assert_invariants();
    }

    #[test]
    fn index_api_round_trip() {
        let mut table: Table<&str> = Table::new();
        let slot = table.index_of(&5).unwrap_err();
        assert!(!table.index_exists(slot));
        *table.index_insert(slot, 5, "five") = "FIVE";

        let slot = table.index_of(&5).unwrap();
        assert!(table.index_exists(slot));
        assert_eq!(table.index_get(slot), &"FIVE");
        assert_eq!(table.index_get_entry(slot), (&5, &"FIVE"));
        assert_eq!(table.index_replace(slot, "V"), "FIVE");
        assert_eq!(table.index_remove(slot), (5, "V"));
        assert!(table.is_empty());
    }

    #[test]
    fn index_insert_grows_at_threshold() {
        let mut table = fixed::<u64>(0, 0.75, 2);
        let threshold = table.resize_threshold();
        for k in 0..threshold as u64 {
            table.insert(k, k);
        }
        let len = table.buffer_len();
        let slot = table.index_of(&1000).unwrap_err();
        table.index_insert(slot, 1000, 1);
        assert!(table.buffer_len() > len);
        assert_eq!(table.get(&1000), Some((&1000, &1)));
        table.assert_invariants();
    }

    #[test]
    #[should_panic(expected = "is not occupied")]
    fn index_get_on_empty_slot_panics() {
        let table: Table<u64> = Table::new();
        let slot = table.index_of(&1).unwrap_err();
        table.index_get(slot);
    }

    #[test]
    #[should_panic(expected = "is not an empty insertion slot")]
    fn index_insert_on_occupied_slot_panics() {
        let mut table: Table<u64> = Table::new();
        table.insert(1, 1);
        let slot = table.index_of(&1).unwrap();
        table.index_insert(slot, 2, 2);
    }

    #[test]
    fn clear_keeps_buffer_and_release_shrinks_it() {
        let mut table: Table<String> = Table::with_capacity(100);
        for k in 0..50u64 {
            table.insert(k, k.to_string());
        }
        let len = table.buffer_len();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.buffer_len(), len);
        assert!(!table.contains(&1));

        table.insert(3, "three".to_string());
        table.release();
        assert!(table.is_empty());
        assert_eq!(table.buffer_len(), capacity::MIN_HASH_ARRAY_LENGTH);
        table.insert(4, "four".to_string());
        assert_eq!(table.get(&4).map(|(_, v)| v.as_str()), Some("four"));
    }

    #[test]
    fn drops_every_entry_exactly_once() {
        struct Counted(Rc<Cell<usize>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        {
            let mut table: Table<Counted> = Table::new();
            for k in 0..100u64 {
                table.insert(k, Counted(drops.clone()));
            }
            // Replaced value is returned and dropped here.
            drop(table.insert(0, Counted(drops.clone())));
            assert_eq!(drops.get(), 1);

            for k in 0..10u64 {
                drop(table.remove(&k));
            }
            assert_eq!(drops.get(), 11);

            table.clear();
            assert_eq!(drops.get(), 101);

            for k in 0..20u64 {
                table.insert(k, Counted(drops.clone()));
            }
            let mut drain = table.drain();
            drop(drain.next());
            drop(drain);
            assert_eq!(drops.get(), 121);
            assert!(table.is_empty());

            for k in 0..5u64 {
                table.insert(k, Counted(drops.clone()));
            }
        }
        assert_eq!(drops.get(), 126);
    }

    #[test]
    fn resize_transparency() {
        let mut table = fixed::<u64>(0, 0.75, 11);
        for k in 0..100u64 {
            table.insert(k, k * 3);
        }
        let before: std::collections::BTreeMap<u64, u64> =
            table.iter().map(|(k, v)| (*k, *v)).collect();
        let len = table.buffer_len();

        table.reserve(10_000);
        assert!(table.buffer_len() > len);
        assert_eq!(table.len(), 100);
        let after: std::collections::BTreeMap<u64, u64> =
            table.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
        table.assert_invariants();

        table.shrink_to_fit();
        assert_eq!(table.buffer_len(), capacity::min_buffer_size(100, 0.75).unwrap());
        let shrunk: std::collections::BTreeMap<u64, u64> =
            table.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, shrunk);
        table.assert_invariants();
    }

    #[test]
    fn try_reserve_overflow_leaves_table_intact() {
        let mut table = fixed::<u64>(0, 0.75, 1);
        table.insert(1, 1);
        assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(
            table.try_reserve(capacity::MAX_HASH_ARRAY_LENGTH),
            Err(Error::CapacityOverflow)
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1), Some((&1, &1)));
        table.assert_invariants();
    }

    #[test]
    fn construction_rejects_bad_configuration() {
        for load_factor in [0.0, 1.0, -1.0, f64::NAN] {
            assert!(matches!(
                Table::<()>::try_with_capacity_and_policy(
                    1,
                    load_factor,
                    HashOrderMixing::Randomized,
                    ValueEquality::default()
                ),
                Err(Error::InvalidLoadFactor { .. })
            ));
        }
        assert!(matches!(
            Table::<()>::try_with_capacity_and_policy(
                usize::MAX,
                0.75,
                HashOrderMixing::Randomized,
                ValueEquality::default()
            ),
            Err(Error::CapacityOverflow)
        ));
    }

    #[test]
    fn pinned_seed_gives_identical_layouts() {
        let build = || {
            let mut table = fixed::<()>(0, 0.75, 0xdead_beef);
            for k in (0..300u64).map(|k| k * 7919) {
                table.insert(k, ());
            }
            for k in (0..300u64).step_by(3).map(|k| k * 7919) {
                table.remove(&k);
            }
            table
        };
        assert_eq!(layout(&build()), layout(&build()));
    }

    #[test]
    fn distinct_seeds_give_distinct_layouts() {
        let build = |mixing| {
            let mut table = Table::<()>::try_with_capacity_and_policy(
                0,
                0.75,
                mixing,
                ValueEquality::default(),
            )
            .unwrap();
            for k in 0..64u64 {
                table.insert(k, ());
            }
            table
        };

        let a = build(HashOrderMixing::Randomized);
        let b = build(HashOrderMixing::Randomized);
        assert_ne!(a.mixing_seed(), b.mixing_seed());
        assert_ne!(layout(&a), layout(&b));
        assert_eq!(a.len(), b.len());
        for k in 0..64u64 {
            assert!(a.contains(&k) && b.contains(&k));
        }

        let c = build(HashOrderMixing::Fixed(1));
        let d = build(HashOrderMixing::Fixed(2));
        assert_ne!(layout(&c), layout(&d));
    }

    #[test]
    fn reseed_moves_slots_not_contents() {
        let mut table = fixed::<u64>(0, 0.75, 1);
        for k in 0..100u64 {
            table.insert(k, k);
        }
        let before = layout(&table);
        table.reseed(HashOrderMixing::Fixed(2));
        assert_eq!(table.mixing_seed(), 2);
        assert_ne!(layout(&table), before);
        assert_eq!(table.len(), 100);
        for k in 0..100u64 {
            assert_eq!(table.get(&k), Some((&k, &k)));
        }
        table.assert_invariants();
    }

    #[test]
    fn clone_preserves_layout() {
        let mut table = fixed::<String>(0, 0.75, 4);
        for k in 0..40u64 {
            table.insert(k, k.to_string());
        }
        let clone = table.clone();
        assert_eq!(layout(&clone), layout(&table));
        assert_eq!(clone.len(), 40);
        clone.assert_invariants();
    }

    #[test]
    fn iterators_cover_every_entry() {
        let mut table: Table<u64> = Table::new();
        for k in 0..100u64 {
            table.insert(k, k);
        }
        assert_eq!(table.iter().len(), 100);
        for (_, v) in table.iter_mut() {
            *v *= 2;
        }
        let sum: u64 = table.iter().map(|(_, v)| *v).sum();
        assert_eq!(sum, (0..100u64).map(|k| k * 2).sum());

        let mut seen = 0;
        assert!(!table.for_each_while(|_, _| {
            seen += 1;
            seen < 10
        }));
        assert_eq!(seen, 10);
        assert!(table.for_each_while(|_, _| true));

        let owned: std::collections::BTreeMap<u64, u64> = table.into_iter().collect();
        assert_eq!(owned.len(), 100);
    }

    #[test]
    fn visualize_key_distribution_marks_density() {
        let mut table = fixed::<()>(0, 0.5, 1);
        assert_eq!(table.visualize_key_distribution(4), "....");
        for k in 0..table.resize_threshold() as u64 {
            table.insert(k, ());
        }
        let picture = table.visualize_key_distribution(table.buffer_len());
        assert_eq!(picture.len(), table.buffer_len());
        assert_eq!(picture.chars().filter(|&c| c == '9').count(), table.len());
        assert!(picture.chars().all(|c| c == '9' || c == '.'));
    }

    #[test]
    fn debug_stats_and_histogram() {
        let mut table = fixed::<u64>(0, 0.75, 3);
        for k in 0..500u64 {
            table.insert(k, k);
        }
        let hist = table.probe_histogram();
        assert_eq!(hist.iter().sum::<usize>(), 500);

        let stats = table.debug_stats();
        assert_eq!(stats.populated, 500);
        assert_eq!(stats.total_slots, table.buffer_len());
        assert_eq!(stats.max_probe_length + 1, hist.len());
        assert!(stats.mean_probe_length >= 0.0);
        #[cfg(feature = "std")]
        stats.print();
    }

    #[test]
    fn debug_output_shows_slots() {
        let mut table = fixed::<u8>(0, 0.75, 0);
        table.insert(1, 2);
        let rendered = alloc::format!("{table:?}");
        assert!(rendered.contains("(") && rendered.contains(".."), "{rendered}");
        assert!(rendered.contains("populated: 1"), "{rendered}");
    }
}
