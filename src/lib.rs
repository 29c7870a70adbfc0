#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod capacity;

pub mod cursor;

mod error;

pub mod growth;

/// A hash map over the linear-probing engine.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable key policies.
pub mod hash_map;

/// The open-addressing engine shared by [`HashMap`] and [`HashSet`].
///
/// Exposes the slot-index API and the physical layout for callers that need
/// more control than the map and set facades offer.
pub mod hash_table;

/// A hash set over the linear-probing engine.
///
/// This module provides a `HashSet` that wraps the `HashTable` with unit
/// values and provides a standard set interface.
pub mod hash_set;

pub mod mixing;

pub mod policy;

pub use error::Error;
pub use growth::GrowthStrategy;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use mixing::HashOrderMixing;
pub use policy::CustomEquality;
pub use policy::FloatKey;
pub use policy::IdentityEquality;
pub use policy::KeyPolicy;
pub use policy::ObjectIdentity;
pub use policy::ValueEquality;
