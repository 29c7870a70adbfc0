//! Growth policy for array-backed (non-hash) buffers.
//!
//! Hash buffers always double; see [`capacity`](crate::capacity). Plain
//! arrays grow proportionally instead, bounded below and above so small
//! buffers do not reallocate for every push and large ones do not
//! overshoot by gigabytes.

use core::mem::size_of;

use crate::Error;

/// Returns the longest array of `T` the allocator can be asked for.
///
/// Zero-sized types are capped at `isize::MAX` elements.
///
/// # Examples
///
/// ```rust
/// use shift_hash::growth::max_array_length;
///
/// assert_eq!(max_array_length::<u64>(), isize::MAX as usize / 8);
/// assert_eq!(max_array_length::<()>(), isize::MAX as usize);
/// ```
pub const fn max_array_length<T>() -> usize {
    let size = size_of::<T>();
    if size == 0 {
        isize::MAX as usize
    } else {
        isize::MAX as usize / size
    }
}

/// Proportional growth, clamped to `[min_grow, max_grow]` extra elements
/// per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthStrategy {
    min_grow: usize,
    max_grow: usize,
    ratio: f64,
}

impl GrowthStrategy {
    /// Default minimum number of elements added per growth step.
    pub const DEFAULT_MIN_GROW: usize = 10;

    /// Default growth ratio.
    pub const DEFAULT_RATIO: f64 = 1.5;

    /// Creates a validated strategy.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrowthStrategy`] unless `min_grow <= max_grow` and
    /// `ratio` is finite and at least `1.0`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::GrowthStrategy;
    ///
    /// assert!(GrowthStrategy::new(10, 100, 2.0).is_ok());
    /// assert!(GrowthStrategy::new(100, 10, 2.0).is_err());
    /// assert!(GrowthStrategy::new(10, 100, 0.5).is_err());
    /// ```
    pub fn new(min_grow: usize, max_grow: usize, ratio: f64) -> Result<Self, Error> {
        if min_grow > max_grow || !ratio.is_finite() || ratio < 1.0 {
            return Err(Error::InvalidGrowthStrategy {
                min_grow,
                max_grow,
                ratio,
            });
        }
        Ok(Self {
            min_grow,
            max_grow,
            ratio,
        })
    }

    /// Minimum number of elements added per growth step.
    pub fn min_grow(&self) -> usize {
        self.min_grow
    }

    /// Maximum number of elements added per growth step.
    pub fn max_grow(&self) -> usize {
        self.max_grow
    }

    /// Proportional growth ratio.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Returns the new length for a buffer of `current_len` elements holding
    /// `element_count`, which must fit `pending` more.
    ///
    /// The buffer grows by `current_len * (ratio - 1)` clamped to
    /// `[min_grow, max_grow]`, or further if that is still too small for the
    /// pending elements. Lengths are capped at [`max_array_length`] for
    /// `T`.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] if `element_count + pending` exceeds the
    /// cap.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::GrowthStrategy;
    ///
    /// let strategy = GrowthStrategy::default();
    /// assert_eq!(strategy.grow::<u32>(0, 0, 1), Ok(10));
    /// assert_eq!(strategy.grow::<u32>(100, 100, 1), Ok(150));
    /// assert_eq!(strategy.grow::<u32>(100, 100, 500), Ok(600));
    /// ```
    pub fn grow<T>(
        &self,
        current_len: usize,
        element_count: usize,
        pending: usize,
    ) -> Result<usize, Error> {
        let max_len = max_array_length::<T>();
        let required = element_count
            .checked_add(pending)
            .filter(|&required| required <= max_len)
            .ok_or(Error::CapacityOverflow)?;

        let proportional = (current_len as f64 * (self.ratio - 1.0)) as usize;
        let increment = proportional.clamp(self.min_grow, self.max_grow);
        let grown = current_len.saturating_add(increment).min(max_len);

        Ok(grown.max(required))
    }
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self {
            min_grow: Self::DEFAULT_MIN_GROW,
            max_grow: max_array_length::<u8>(),
            ratio: Self::DEFAULT_RATIO,
        }
    }
}
