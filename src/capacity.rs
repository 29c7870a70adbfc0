//! Buffer sizing for the hash containers.
//!
//! Everything here is a pure function of an element count and a load
//! factor. Buffer lengths are always powers of two between
//! [`MIN_HASH_ARRAY_LENGTH`] and [`MAX_HASH_ARRAY_LENGTH`]; any request that
//! would need more than the maximum fails with [`Error::CapacityOverflow`]
//! instead of wrapping.

use crate::Error;

/// Smallest buffer a hash container ever probes.
pub const MIN_HASH_ARRAY_LENGTH: usize = 4;

/// Largest buffer a hash container may allocate.
///
/// Half of the highest power of two addressable by `usize`, so that doubling
/// the largest legal length can never wrap.
pub const MAX_HASH_ARRAY_LENGTH: usize = 1 << (usize::BITS - 2);

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest accepted load factor.
pub const MIN_LOAD_FACTOR: f64 = 0.01;

/// Largest accepted load factor.
pub const MAX_LOAD_FACTOR: f64 = 0.99;

/// Number of elements a container is sized for when none is given.
pub const DEFAULT_EXPECTED_ELEMENTS: usize = 4;

/// Validates a load factor, returning it unchanged when acceptable.
///
/// `NaN` and infinities are rejected along with anything outside of
/// `MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR`.
pub fn check_load_factor(load_factor: f64) -> Result<f64, Error> {
    if (MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&load_factor) {
        Ok(load_factor)
    } else {
        Err(Error::InvalidLoadFactor { load_factor })
    }
}

/// Returns the element count at which a buffer of `length` slots must grow.
///
/// This is `floor(length * load_factor)`, clamped to `length - 1` so that at
/// least one slot is always empty and every probe sequence terminates.
///
/// # Examples
///
/// ```rust
/// use shift_hash::capacity::expand_at_count;
///
/// assert_eq!(expand_at_count(16, 0.75), 12);
/// assert_eq!(expand_at_count(4, 0.99), 3);
/// ```
#[inline]
pub fn expand_at_count(length: usize, load_factor: f64) -> usize {
    debug_assert!(length.is_power_of_two(), "length {length} is not a power of two");
    let at = (length as f64 * load_factor) as usize;
    at.min(length - 1)
}

/// Returns the largest number of elements representable at `load_factor`.
pub fn max_capacity(load_factor: f64) -> Result<usize, Error> {
    let load_factor = check_load_factor(load_factor)?;
    Ok(expand_at_count(MAX_HASH_ARRAY_LENGTH, load_factor))
}

/// Returns the smallest power-of-two buffer length able to hold `elements`
/// entries without exceeding `load_factor`.
///
/// # Examples
///
/// ```rust
/// use shift_hash::capacity::min_buffer_size;
///
/// assert_eq!(min_buffer_size(0, 0.75), Ok(4));
/// assert_eq!(min_buffer_size(200, 0.75), Ok(512));
/// assert!(min_buffer_size(usize::MAX, 0.75).is_err());
/// ```
pub fn min_buffer_size(elements: usize, load_factor: f64) -> Result<usize, Error> {
    let load_factor = check_load_factor(load_factor)?;

    let estimate = elements as f64 / load_factor;
    if !(estimate <= MAX_HASH_ARRAY_LENGTH as f64) {
        return Err(Error::CapacityOverflow);
    }

    // Truncation (no `f64::ceil` in core) may undershoot by one slot; the
    // loop below doubles until the threshold actually fits.
    let mut length = (estimate as usize)
        .max(MIN_HASH_ARRAY_LENGTH)
        .checked_next_power_of_two()
        .ok_or(Error::CapacityOverflow)?;

    while expand_at_count(length, load_factor) < elements {
        if length >= MAX_HASH_ARRAY_LENGTH {
            return Err(Error::CapacityOverflow);
        }
        length <<= 1;
    }

    if length > MAX_HASH_ARRAY_LENGTH {
        return Err(Error::CapacityOverflow);
    }

    Ok(length)
}

/// Returns the buffer length to grow into when a buffer of `length` slots
/// holding `assigned` elements has reached its threshold.
///
/// Growth doubles the buffer, or more if doubling alone would not lift the
/// threshold above `assigned` (possible with very small load factors).
pub fn next_buffer_size(length: usize, assigned: usize, load_factor: f64) -> Result<usize, Error> {
    debug_assert!(length.is_power_of_two());
    if length >= MAX_HASH_ARRAY_LENGTH {
        return Err(Error::CapacityOverflow);
    }

    let required = min_buffer_size(assigned + 1, load_factor)?;
    Ok((length << 1).max(required))
}
