//! What "the same key" means.
//!
//! A [`KeyPolicy`] supplies the raw hash and the equality test a container
//! uses for its keys. The set of policies is closed:
//!
//! - [`ValueEquality`] (the default): keys compare with `==` and hash through
//!   a [`BuildHasher`].
//! - [`IdentityEquality`]: keys are the same entry only when they point at
//!   the same object, see [`ObjectIdentity`].
//! - [`CustomEquality`]: a caller-supplied hash function and comparator.
//!
//! Floating-point keys go through [`FloatKey`], which folds every NaN
//! encoding into one canonical value before the key is hashed, stored or
//! compared.

use core::fmt;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;

use alloc::boxed::Box;
use alloc::rc::Rc;
#[cfg(target_has_atomic = "ptr")]
use alloc::sync::Arc;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used by [`ValueEquality`] unless another is given.
        ///
        /// Deliberately unseeded: per-instance randomization is the job of
        /// [`HashOrderMixing`](crate::HashOrderMixing), so the raw hash of a
        /// key is stable across containers.
        pub type DefaultHashBuilder = foldhash::fast::FixedState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used by [`ValueEquality`] unless another is given.
        pub type DefaultHashBuilder =
            core::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;
    } else {
        compile_error!("shift-hash needs the `foldhash` or the `std` feature for its default hasher");
    }
}

/// Hashing and equality for the keys of a container.
///
/// Implementations must be consistent: keys that compare equal must produce
/// the same hash.
pub trait KeyPolicy<K> {
    /// Returns the raw (unmixed) hash of `key`.
    fn hash_key(&self, key: &K) -> u64;

    /// Returns `true` if `a` and `b` denote the same entry.
    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

/// Keys compare by value through `Eq`, hashing through `S`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueEquality<S = DefaultHashBuilder> {
    hash_builder: S,
}

impl<S> ValueEquality<S> {
    /// Creates a value policy hashing through `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns the hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> KeyPolicy<K> for ValueEquality<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Keys compare by the address of the object they refer to.
///
/// Two value-equal but distinct objects are two separate entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityEquality;

impl<K> KeyPolicy<K> for IdentityEquality
where
    K: ObjectIdentity,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        key.identity() as usize as u64
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        core::ptr::eq(a.identity(), b.identity())
    }
}

/// Pointer-like keys with a stable object address.
///
/// The address must stay the same for as long as the key lives in a
/// container. Zero-sized pointees share one dangling address, so all
/// `Box<()>` keys, for instance, are the same object.
pub trait ObjectIdentity {
    /// Returns the address of the referenced object.
    fn identity(&self) -> *const ();
}

impl<T: ?Sized> ObjectIdentity for &T {
    #[inline]
    fn identity(&self) -> *const () {
        (*self as *const T).cast()
    }
}

impl<T: ?Sized> ObjectIdentity for Box<T> {
    #[inline]
    fn identity(&self) -> *const () {
        (&**self as *const T).cast()
    }
}

impl<T: ?Sized> ObjectIdentity for Rc<T> {
    #[inline]
    fn identity(&self) -> *const () {
        Rc::as_ptr(self).cast()
    }
}

#[cfg(target_has_atomic = "ptr")]
impl<T: ?Sized> ObjectIdentity for Arc<T> {
    #[inline]
    fn identity(&self) -> *const () {
        Arc::as_ptr(self).cast()
    }
}

/// Keys hash through `hash` and compare through `eq`.
///
/// # Examples
///
/// ```rust
/// use shift_hash::CustomEquality;
/// use shift_hash::HashSet;
///
/// // Case-insensitive ASCII strings.
/// let policy = CustomEquality::new(
///     |s: &String| {
///         s.bytes()
///             .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b.to_ascii_lowercase() as u64))
///     },
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
/// );
/// let mut set = HashSet::with_policy(policy);
/// assert!(set.insert("Hello".to_string()));
/// assert!(!set.insert("HELLO".to_string()));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct CustomEquality<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> CustomEquality<H, E> {
    /// Creates a policy from a hash function and an equality comparator.
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<H, E> fmt::Debug for CustomEquality<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEquality").finish_non_exhaustive()
    }
}

impl<K, H, E> KeyPolicy<K> for CustomEquality<H, E>
where
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating-point types usable in a [`FloatKey`].
pub trait Float: sealed::Sealed + Copy {
    /// The bit representation.
    type Bits: Copy + Eq + Hash + fmt::Debug;

    /// Returns the value with every NaN replaced by the canonical NaN.
    fn canonicalize(self) -> Self;

    /// Returns the bits of the canonicalized value.
    fn canonical_bits(self) -> Self::Bits;
}

impl Float for f32 {
    type Bits = u32;

    #[inline]
    fn canonicalize(self) -> Self {
        if self.is_nan() {
            f32::from_bits(0x7fc0_0000)
        } else {
            self
        }
    }

    #[inline]
    fn canonical_bits(self) -> u32 {
        self.canonicalize().to_bits()
    }
}

impl Float for f64 {
    type Bits = u64;

    #[inline]
    fn canonicalize(self) -> Self {
        if self.is_nan() {
            f64::from_bits(0x7ff8_0000_0000_0000)
        } else {
            self
        }
    }

    #[inline]
    fn canonical_bits(self) -> u64 {
        self.canonicalize().to_bits()
    }
}

/// A floating-point key compared by its canonical bit pattern.
///
/// Construction folds every NaN encoding into a single canonical NaN, so two
/// bit-distinct NaNs are the same key. Apart from NaN, keys compare by bits:
/// `0.0` and `-0.0` are different keys.
///
/// # Examples
///
/// ```rust
/// use shift_hash::FloatKey;
/// use shift_hash::HashMap;
///
/// let quiet = f64::from_bits(0x7ff8_0000_0000_0001);
/// let negative = f64::from_bits(0xfff0_0000_0000_0002);
///
/// let mut map = HashMap::new();
/// map.insert(FloatKey::new(quiet), "first");
/// map.insert(FloatKey::new(negative), "second");
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get(&FloatKey::new(f64::NAN)), Some(&"second"));
/// ```
#[derive(Clone, Copy)]
pub struct FloatKey<F>(F);

impl<F: Float> FloatKey<F> {
    /// Wraps `value`, canonicalizing NaN.
    #[inline]
    pub fn new(value: F) -> Self {
        FloatKey(value.canonicalize())
    }

    /// Returns the canonical value.
    #[inline]
    pub fn get(self) -> F {
        self.0
    }
}

impl<F: Float> From<F> for FloatKey<F> {
    fn from(value: F) -> Self {
        Self::new(value)
    }
}

impl<F: Float> PartialEq for FloatKey<F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.canonical_bits() == other.0.canonical_bits()
    }
}

impl<F: Float> Eq for FloatKey<F> {}

impl<F: Float> Hash for FloatKey<F> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.canonical_bits().hash(state);
    }
}

impl<F: Float + fmt::Debug> fmt::Debug for FloatKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
