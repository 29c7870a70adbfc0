use core::alloc::Layout;
use core::fmt;

/// The error type for fallible construction and growth.
///
/// "Key not found" is never an error: lookups report absence through
/// `Option`/`bool`. Every variant here means an operation could not be
/// carried out and the container was left exactly as it was.
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// The load factor is outside of
    /// [`MIN_LOAD_FACTOR`](crate::capacity::MIN_LOAD_FACTOR)..=[`MAX_LOAD_FACTOR`](crate::capacity::MAX_LOAD_FACTOR),
    /// or is not a finite number.
    InvalidLoadFactor {
        /// The rejected load factor.
        load_factor: f64,
    },

    /// The knobs handed to a [`GrowthStrategy`](crate::growth::GrowthStrategy)
    /// are inconsistent.
    InvalidGrowthStrategy {
        /// Minimum number of slots added on growth.
        min_grow: usize,
        /// Maximum number of slots added on growth.
        max_grow: usize,
        /// Proportional growth ratio.
        ratio: f64,
    },

    /// The required buffer length exceeds the maximum representable length.
    CapacityOverflow,

    /// The memory allocator returned an error.
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLoadFactor { load_factor } => write!(
                f,
                "load factor {load_factor} is outside of [{}, {}]",
                crate::capacity::MIN_LOAD_FACTOR,
                crate::capacity::MAX_LOAD_FACTOR
            ),
            Error::InvalidGrowthStrategy {
                min_grow,
                max_grow,
                ratio,
            } => write!(
                f,
                "invalid growth strategy: min_grow={min_grow}, max_grow={max_grow}, ratio={ratio}"
            ),
            Error::CapacityOverflow => f.write_str("maximum buffer length exceeded"),
            Error::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed",
                layout.size()
            ),
        }
    }
}

impl core::error::Error for Error {}

/// Panics for the infallible API surface.
///
/// Kept out of line so the happy path of `insert` stays small.
#[cold]
#[inline(never)]
pub(crate) fn infallible(error: Error) -> ! {
    match error {
        Error::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
        error => panic!("hash container growth failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names_the_problem() {
        let message = Error::InvalidLoadFactor { load_factor: 1.5 }.to_string();
        assert!(message.contains("1.5"), "{message}");

        assert_eq!(
            Error::CapacityOverflow.to_string(),
            "maximum buffer length exceeded"
        );
    }

    #[test]
    #[should_panic(expected = "maximum buffer length exceeded")]
    fn infallible_panics_on_overflow() {
        infallible(Error::CapacityOverflow);
    }
}
