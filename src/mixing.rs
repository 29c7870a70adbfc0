//! Per-instance hash order mixing.
//!
//! Every container combines the raw hash of a key with a per-instance seed
//! before reducing it to a slot. Two containers holding the same keys
//! therefore lay them out differently, which keeps an adversary who controls
//! the key sequence from forcing long probe chains in every instance.
//!
//! Seeds come from [`HashOrderMixing`], handed to each container at
//! construction. Test suites that need reproducible layouts either pass
//! [`HashOrderMixing::Fixed`] directly or pin a process-wide seed with
//! [`pin_test_seed`], which turns every [`HashOrderMixing::Randomized`]
//! container deterministic until [`reset_test_seed`] is called.

use core::sync::atomic::AtomicBool;
use core::sync::atomic::AtomicU64;
use core::sync::atomic::Ordering;

static TEST_SEED: AtomicU64 = AtomicU64::new(0);
static TEST_SEED_PINNED: AtomicBool = AtomicBool::new(false);
static INSTANCES: AtomicU64 = AtomicU64::new(0);

/// Name of the environment variable read by [`pin_test_seed_from_env`].
#[cfg(feature = "std")]
pub const TEST_SEED_ENV: &str = "SHIFT_HASH_TEST_SEED";

/// Golden-ratio increment used to spread sequential counters.
const PHI: u64 = 0x9E37_79B9_7F4A_7C15;

/// Selects where a container's mixing seed comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashOrderMixing {
    /// A fresh, unpredictable seed per container, unless a test seed is
    /// pinned, in which case the seed is derived from the pinned value.
    #[default]
    Randomized,
    /// Exactly this seed, regardless of the test-seed registry.
    Fixed(u64),
}

impl HashOrderMixing {
    /// Resolves this configuration into a concrete seed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashOrderMixing;
    ///
    /// assert_eq!(HashOrderMixing::Fixed(7).seed(), 7);
    /// ```
    pub fn seed(self) -> u64 {
        match self {
            HashOrderMixing::Fixed(seed) => seed,
            HashOrderMixing::Randomized => match pinned_test_seed() {
                Some(seed) => fmix64(seed ^ PHI),
                None => random_seed(),
            },
        }
    }
}

/// Pins the process-wide test seed.
///
/// While pinned, every [`HashOrderMixing::Randomized`] container created in
/// this process uses the same seed derived from `seed`.
pub fn pin_test_seed(seed: u64) {
    TEST_SEED.store(seed, Ordering::Relaxed);
    TEST_SEED_PINNED.store(true, Ordering::Release);
}

/// Clears a seed pinned by [`pin_test_seed`].
pub fn reset_test_seed() {
    TEST_SEED_PINNED.store(false, Ordering::Release);
}

/// Returns the pinned test seed, if any.
pub fn pinned_test_seed() -> Option<u64> {
    if TEST_SEED_PINNED.load(Ordering::Acquire) {
        Some(TEST_SEED.load(Ordering::Relaxed))
    } else {
        None
    }
}

/// Pins the test seed from the [`TEST_SEED_ENV`] environment variable.
///
/// Accepts decimal or `0x`-prefixed hexadecimal. Returns the pinned seed, or
/// `None` (leaving the registry untouched) when the variable is unset or
/// unparsable.
#[cfg(feature = "std")]
pub fn pin_test_seed_from_env() -> Option<u64> {
    let value = std::env::var(TEST_SEED_ENV).ok()?;
    let seed = parse_seed(value.trim())?;
    pin_test_seed(seed);
    Some(seed)
}

#[cfg(feature = "std")]
fn parse_seed(value: &str) -> Option<u64> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Combines a raw key hash with a container's mixing seed.
///
/// The result is what the slot resolver masks down to a home slot. The
/// finalizer spreads every input bit over the low bits so that power-of-two
/// masking stays well distributed even for sequential raw hashes.
#[inline(always)]
pub fn mix_hash(hash: u64, seed: u64) -> u64 {
    fmix64(hash ^ seed)
}

/// MurmurHash3 64-bit finalizer. A bijection on `u64`.
#[inline(always)]
pub(crate) fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

fn random_seed() -> u64 {
    let instance = INSTANCES.fetch_add(1, Ordering::Relaxed);

    cfg_if::cfg_if! {
        if #[cfg(feature = "foldhash")] {
            use core::hash::BuildHasher;
            foldhash::fast::RandomState::default().hash_one(instance)
        } else if #[cfg(feature = "std")] {
            use core::hash::BuildHasher;
            std::collections::hash_map::RandomState::new().hash_one(instance)
        } else {
            // No entropy source without std or foldhash: fall back to the
            // stack address, which varies with ASLR.
            let marker = 0u8;
            let address = &marker as *const u8 as usize as u64;
            fmix64(instance.wrapping_mul(PHI) ^ address)
        }
    }
}
