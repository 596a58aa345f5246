use crate::error::Error;
use crate::error::Result;
use crate::slot::TAG_WIDTH;

/// How keys and values whose length differs from the configured width are
/// handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Shorter inputs are zero-padded and longer inputs are truncated to the
    /// configured width.
    ///
    /// Keys are compared and hashed in their padded form, so `b"a"` and
    /// `b"a\0"` name the same entry in a map with a key width of two or more.
    #[default]
    Truncate,

    /// Inputs must be exactly the configured width. Anything else is rejected
    /// with [`Error::KeyLength`] or [`Error::ValueLength`] and nothing is
    /// written.
    Strict,
}

impl LengthPolicy {
    #[inline]
    pub(crate) fn check_key(self, key: &[u8], width: usize) -> Result<()> {
        match self {
            Self::Strict if key.len() != width => Err(Error::KeyLength {
                len: key.len(),
                width,
            }),
            _ => Ok(()),
        }
    }

    #[inline]
    pub(crate) fn check_value(self, value: &[u8], width: usize) -> Result<()> {
        match self {
            Self::Strict if value.len() != width => Err(Error::ValueLength {
                len: value.len(),
                width,
            }),
            _ => Ok(()),
        }
    }
}

/// Construction parameters for a [`FixedHashMap`](crate::FixedHashMap).
///
/// All three sizes are fixed for the lifetime of the map.
///
/// # Examples
///
/// ```rust
/// use fixed_slot_map::Config;
/// use fixed_slot_map::LengthPolicy;
///
/// let config = Config::new(16, 8, 1024).length_policy(LengthPolicy::Strict);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.slot_width(), 8 + 16 + 8);
///
/// assert!(Config::new(0, 8, 1024).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Width in bytes of every stored key.
    pub key_width: usize,
    /// Width in bytes of every stored value.
    pub value_width: usize,
    /// Number of slots, which is also the maximum number of entries.
    pub capacity: usize,
    /// Handling of keys and values that are not exactly the configured width.
    pub length_policy: LengthPolicy,
}

impl Config {
    /// Creates a config using [`LengthPolicy::Truncate`].
    pub fn new(key_width: usize, value_width: usize, capacity: usize) -> Self {
        Self {
            key_width,
            value_width,
            capacity,
            length_policy: LengthPolicy::default(),
        }
    }

    /// Sets the length policy.
    #[must_use]
    pub fn length_policy(mut self, policy: LengthPolicy) -> Self {
        self.length_policy = policy;
        self
    }

    /// Bytes occupied by one slot: the 8-byte tag, the key and the value.
    ///
    /// Saturates on overflow; [`validate`](Self::validate) rejects such
    /// configurations.
    pub fn slot_width(&self) -> usize {
        TAG_WIDTH
            .saturating_add(self.key_width)
            .saturating_add(self.value_width)
    }

    /// Checks that every size is positive and that the backing buffer length
    /// is representable.
    pub fn validate(&self) -> Result<()> {
        if self.key_width == 0 {
            return Err(Error::InvalidConfig("key width must be positive"));
        }
        if self.value_width == 0 {
            return Err(Error::InvalidConfig("value width must be positive"));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be positive"));
        }
        self.buffer_len()
            .filter(|&len| len <= isize::MAX as usize)
            .map(|_| ())
            .ok_or(Error::InvalidConfig("buffer size overflows usize"))
    }

    pub(crate) fn buffer_len(&self) -> Option<usize> {
        TAG_WIDTH
            .checked_add(self.key_width)?
            .checked_add(self.value_width)?
            .checked_mul(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_sizes() {
        assert_eq!(
            Config::new(0, 1, 1).validate(),
            Err(Error::InvalidConfig("key width must be positive"))
        );
        assert_eq!(
            Config::new(1, 0, 1).validate(),
            Err(Error::InvalidConfig("value width must be positive"))
        );
        assert_eq!(
            Config::new(1, 1, 0).validate(),
            Err(Error::InvalidConfig("capacity must be positive"))
        );
        assert_eq!(Config::new(1, 1, 1).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_overflowing_buffer() {
        assert!(Config::new(usize::MAX, 1, 1).validate().is_err());
        assert!(Config::new(8, 8, usize::MAX / 8).validate().is_err());
    }

    #[test]
    fn strict_policy_checks_lengths() {
        let strict = LengthPolicy::Strict;
        assert_eq!(strict.check_key(b"abcd", 4), Ok(()));
        assert_eq!(
            strict.check_key(b"abc", 4),
            Err(Error::KeyLength { len: 3, width: 4 })
        );
        assert_eq!(
            strict.check_value(b"abcde", 4),
            Err(Error::ValueLength { len: 5, width: 4 })
        );

        let truncate = LengthPolicy::Truncate;
        assert_eq!(truncate.check_key(b"abcdefgh", 4), Ok(()));
        assert_eq!(truncate.check_value(b"", 4), Ok(()));
    }

    #[test]
    fn builder_sets_policy() {
        let config = Config::new(4, 2, 8);
        assert_eq!(config.length_policy, LengthPolicy::Truncate);
        assert_eq!(config.slot_width(), 14);
        assert_eq!(config.buffer_len(), Some(112));

        let config = config.length_policy(LengthPolicy::Strict);
        assert_eq!(config.length_policy, LengthPolicy::Strict);
    }
}
