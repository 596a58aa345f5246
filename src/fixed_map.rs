use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;

use crate::config::Config;
use crate::config::LengthPolicy;
use crate::error::Error;
use crate::error::Result;
use crate::raw_table::Insert;
use crate::raw_table::RawIter;
use crate::raw_table::RawTable;
use crate::raw_table::identity;
use crate::slot::SlotLayout;
use crate::slot::canonical;

/// A fixed-capacity hash map of fixed-width byte keys to fixed-width byte
/// values, stored in one contiguous buffer.
///
/// The map never grows. `capacity` slots of `8 + key_width + value_width`
/// bytes are allocated up front and zeroed; every entry lives directly in a
/// slot and collisions are resolved by linear probing. Once every slot holds
/// a live entry, inserting a new key fails with [`Error::TableFull`].
///
/// Keys are hashed with a configurable [`BuildHasher`] `S`. Only determinism
/// matters for correctness; hash quality only affects probe lengths.
///
/// # Examples
///
/// ```rust
/// use fixed_slot_map::Error;
/// use fixed_slot_map::FixedHashMap;
///
/// let mut map = FixedHashMap::new(1, 1, 4);
/// for (k, v) in [(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4")] {
///     map.set(k, v).unwrap();
/// }
/// assert_eq!(map.set(b"e", b"5"), Err(Error::TableFull));
///
/// map.delete(b"b").unwrap();
/// assert_eq!(map.get(b"b"), Err(Error::NotFound));
/// map.set(b"f", b"6").unwrap();
/// assert_eq!(map.len(), 4);
/// ```
#[derive(Clone)]
pub struct FixedHashMap<S> {
    table: RawTable,
    hash_builder: S,
    length_policy: LengthPolicy,
}

impl<S> Debug for FixedHashMap<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl FixedHashMap<crate::DefaultHashBuilder> {
    /// Creates a map of `capacity` slots holding `key_width`-byte keys and
    /// `value_width`-byte values, using the default hasher and
    /// [`LengthPolicy::Truncate`].
    ///
    /// # Panics
    ///
    /// Panics if any argument is zero or the buffer size overflows `usize`.
    /// Use [`with_config`](Self::with_config) to get an error instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let map = FixedHashMap::new(16, 32, 1000);
    /// assert_eq!(map.capacity(), 1000);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(key_width: usize, value_width: usize, capacity: usize) -> Self {
        Self::with_hasher(
            key_width,
            value_width,
            capacity,
            crate::DefaultHashBuilder::default(),
        )
    }

    /// Creates a map from a [`Config`] using the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::Config;
    /// use fixed_slot_map::Error;
    /// use fixed_slot_map::FixedHashMap;
    /// use fixed_slot_map::LengthPolicy;
    ///
    /// let config = Config::new(4, 4, 8).length_policy(LengthPolicy::Strict);
    /// let mut map = FixedHashMap::with_config(config).unwrap();
    /// assert_eq!(
    ///     map.set(b"abc", b"wxyz"),
    ///     Err(Error::KeyLength { len: 3, width: 4 })
    /// );
    ///
    /// assert!(FixedHashMap::with_config(Config::new(4, 4, 0)).is_err());
    /// ```
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_config_and_hasher(config, crate::DefaultHashBuilder::default())
    }
}

impl<S> FixedHashMap<S>
where
    S: BuildHasher,
{
    /// Creates a map using `hash_builder` to hash keys.
    ///
    /// # Panics
    ///
    /// Panics if any size is zero or the buffer size overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use fixed_slot_map::FixedHashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = FixedHashMap::with_hasher(8, 8, 64, SimpleHasher);
    /// map.set(b"key", b"value").unwrap();
    /// assert_eq!(map.get(b"key").unwrap(), b"value\0\0\0");
    /// ```
    pub fn with_hasher(
        key_width: usize,
        value_width: usize,
        capacity: usize,
        hash_builder: S,
    ) -> Self {
        let config = Config::new(key_width, value_width, capacity);
        match Self::with_config_and_hasher(config, hash_builder) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a map from a [`Config`] and a hasher builder, validating the
    /// config first.
    pub fn with_config_and_hasher(config: Config, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: RawTable::new(
                SlotLayout::new(config.key_width, config.value_width),
                config.capacity,
            ),
            hash_builder,
            length_policy: config.length_policy,
        })
    }

    /// Applies the length policy and reduces `key` to its canonical form
    /// together with its tag.
    #[inline]
    fn locate<'k>(&self, key: &'k [u8]) -> Result<(i64, &'k [u8])> {
        let width = self.key_width();
        self.length_policy.check_key(key, width)?;
        let key = canonical(key, width);
        Ok((identity(self.hash_builder.hash_one(key)), key))
    }

    /// Returns the stored value for `key`, padded to the value width.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent, or a length error under
    /// [`LengthPolicy::Strict`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::Error;
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(4, 4, 16);
    /// map.set(b"one", b"1").unwrap();
    ///
    /// assert_eq!(map.get(b"one"), Ok(&b"1\0\0\0"[..]));
    /// assert_eq!(map.get(b"two"), Err(Error::NotFound));
    /// ```
    pub fn get(&self, key: &[u8]) -> Result<&[u8]> {
        let (tag, key) = self.locate(key)?;
        let index = self.table.find(tag, key).ok_or(Error::NotFound)?;
        Ok(self.table.slot(index).value)
    }

    /// Returns the stored value for `key` for in-place modification.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(1, 2, 4);
    /// map.set(b"k", &[1, 2]).unwrap();
    /// map.get_mut(b"k").unwrap()[1] = 9;
    /// assert_eq!(map.get(b"k").unwrap(), &[1u8, 9]);
    /// ```
    pub fn get_mut(&mut self, key: &[u8]) -> Result<&mut [u8]> {
        let (tag, key) = self.locate(key)?;
        let index = self.table.find(tag, key).ok_or(Error::NotFound)?;
        Ok(self.table.value_mut(index))
    }

    /// Returns `true` if the map holds `key`.
    ///
    /// Keys rejected by the length policy are never contained.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_ok()
    }

    /// Inserts `key -> value`, overwriting the value if `key` is already
    /// present.
    ///
    /// Returns `true` if a new entry was created and `false` if an existing
    /// one was updated in place.
    ///
    /// # Errors
    ///
    /// [`Error::TableFull`] if `key` is new and every slot on its probe cycle
    /// holds a live entry; the map is unchanged. Length errors under
    /// [`LengthPolicy::Strict`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(4, 4, 16);
    /// assert_eq!(map.set(b"key", b"old"), Ok(true));
    /// assert_eq!(map.set(b"key", b"new"), Ok(false));
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(b"key").unwrap(), b"new\0");
    /// ```
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<bool> {
        self.length_policy.check_value(value, self.value_width())?;
        let (tag, key) = self.locate(key)?;
        match self.table.insert(tag, key, value)? {
            Insert::Inserted(_) => Ok(true),
            Insert::Updated(_) => Ok(false),
        }
    }

    /// Removes `key` from the map.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent; the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::Error;
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(4, 4, 16);
    /// map.set(b"key", b"val").unwrap();
    ///
    /// assert_eq!(map.delete(b"key"), Ok(()));
    /// assert_eq!(map.delete(b"key"), Err(Error::NotFound));
    /// assert!(map.is_empty());
    /// ```
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        let (tag, key) = self.locate(key)?;
        self.table.remove(tag, key).map(|_| ())
    }

    /// Removes and returns the entry in the lowest occupied slot.
    ///
    /// Which entry that is depends on the hasher, so treat it as arbitrary.
    /// Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(1, 1, 4);
    /// map.set(b"a", b"1").unwrap();
    ///
    /// assert_eq!(map.pop(), Some((b"a".to_vec(), b"1".to_vec())));
    /// assert_eq!(map.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        let index = self.table.first_occupied()?;
        let slot = self.table.slot(index);
        let entry = (slot.key.to_vec(), slot.value.to_vec());
        self.table.remove_at(index);
        Some(entry)
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<S> FixedHashMap<S> {
    /// Returns the number of entries in the map. Runs in constant time.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Returns the number of slots, which is the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Width in bytes of every stored key.
    pub fn key_width(&self) -> usize {
        self.table.layout().key_width()
    }

    /// Width in bytes of every stored value.
    pub fn value_width(&self) -> usize {
        self.table.layout().value_width()
    }

    /// The policy applied to keys and values of the wrong width.
    pub fn length_policy(&self) -> LengthPolicy {
        self.length_policy
    }

    /// Number of slots holding a deletion marker.
    ///
    /// Tombstones keep probe chains intact after deletes. They are reused by
    /// later inserts and cleared by [`compact`](Self::compact).
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Removes every entry and tombstone. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rewrites the table without tombstones, shortening probe chains that
    /// step over deleted slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(2, 1, 8);
    /// for k in 0..8u8 {
    ///     map.set(&[k, 1], b"v").unwrap();
    /// }
    /// for k in 0..4u8 {
    ///     map.delete(&[k, 1]).unwrap();
    /// }
    ///
    /// map.compact();
    /// assert_eq!(map.tombstones(), 0);
    /// assert_eq!(map.len(), 4);
    /// assert!(map.contains_key(&[7, 1]));
    /// ```
    pub fn compact(&mut self) {
        self.table.compact();
    }

    /// Returns an iterator over the keys in ascending slot order.
    ///
    /// Keys are yielded at their stored width, including zero padding. Each
    /// call starts a fresh pass over the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixed_slot_map::FixedHashMap;
    ///
    /// let mut map = FixedHashMap::new(2, 1, 8);
    /// map.set(b"a", b"1").unwrap();
    /// map.set(b"bb", b"2").unwrap();
    ///
    /// let mut keys: Vec<&[u8]> = map.keys().collect();
    /// keys.sort();
    /// assert_eq!(keys, [&b"a\0"[..], &b"bb"[..]]);
    /// ```
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values in ascending slot order.
    pub fn values(&self) -> Values<'_> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over `(key, value)` pairs in ascending slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Cumulative number of slots visited past the home slot by every
    /// lookup, insert and delete on this map.
    #[cfg(feature = "stats")]
    pub fn probe_count(&self) -> u64 {
        self.table.probe_count()
    }

    /// Computes how far each live entry sits from its home slot.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::stats::ProbeHistogram {
        let mut hist = crate::stats::ProbeHistogram::default();
        for (index, tag) in self.occupied_tags() {
            hist.record(self.table.displacement(index, tag));
        }
        hist
    }

    /// Returns occupancy and probing statistics for this map.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        let max_displacement = self
            .occupied_tags()
            .map(|(index, tag)| self.table.displacement(index, tag))
            .max()
            .unwrap_or(0);

        crate::stats::DebugStats {
            populated: self.len(),
            tombstones: self.tombstones(),
            capacity: self.capacity(),
            slot_width: self.table.layout().slot_width(),
            total_bytes: self.table.total_bytes(),
            load_factor: self.len() as f64 / self.capacity() as f64,
            max_displacement,
            probe_count: self.probe_count(),
        }
    }

    #[cfg(feature = "stats")]
    fn occupied_tags(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        (0..self.capacity())
            .map(|index| (index, self.table.slot(index).tag))
            .filter(|&(_, tag)| crate::raw_table::is_live(tag))
    }
}

impl<'a, S> IntoIterator for &'a FixedHashMap<S> {
    type IntoIter = Iter<'a>;
    type Item = (&'a [u8], &'a [u8]);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the `(key, value)` pairs of a [`FixedHashMap`].
///
/// Created by [`FixedHashMap::iter`].
pub struct Iter<'a> {
    inner: RawIter<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| (slot.key, slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// An iterator over the keys of a [`FixedHashMap`].
///
/// Created by [`FixedHashMap::keys`].
pub struct Keys<'a> {
    inner: RawIter<'a>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| slot.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

/// An iterator over the values of a [`FixedHashMap`].
///
/// Created by [`FixedHashMap::values`].
pub struct Values<'a> {
    inner: RawIter<'a>,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}
