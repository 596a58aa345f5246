#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Construction parameters and the key/value length policy.
pub mod config;

pub mod error;

/// A fixed-capacity hash map over a single byte buffer.
///
/// This module provides [`FixedHashMap`], which hashes keys with a
/// configurable hasher and stores every entry inline in a linearly probed
/// slot array.
pub mod fixed_map;

mod raw_table;
mod slot;

#[cfg(feature = "stats")]
pub mod stats;

pub use config::Config;
pub use config::LengthPolicy;
pub use error::Error;
pub use error::Result;
pub use fixed_map::FixedHashMap;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`FixedHashMap::new`].
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`FixedHashMap::new`].
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}
