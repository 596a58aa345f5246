//! Error types for the `fixed-slot-map` crate

/// Errors returned by [`FixedHashMap`](crate::FixedHashMap) operations.
///
/// Every variant describes a recoverable condition. Programming errors such as
/// an out-of-range slot index panic instead of producing an `Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key is not present in the map.
    #[error("key not found")]
    NotFound,

    /// An insert could not find an empty, reusable or matching slot within
    /// one full probe cycle.
    ///
    /// The map is left unmodified when this is returned.
    #[error("hash table full")]
    TableFull,

    /// A key did not have the configured width under
    /// [`LengthPolicy::Strict`](crate::LengthPolicy::Strict).
    #[error("key is {len} bytes but the map stores {width}-byte keys")]
    KeyLength {
        /// Length of the rejected key.
        len: usize,
        /// Configured key width.
        width: usize,
    },

    /// A value did not have the configured width under
    /// [`LengthPolicy::Strict`](crate::LengthPolicy::Strict).
    #[error("value is {len} bytes but the map stores {width}-byte values")]
    ValueLength {
        /// Length of the rejected value.
        len: usize,
        /// Configured value width.
        width: usize,
    },

    /// A [`Config`](crate::Config) could not be used to build a map.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
