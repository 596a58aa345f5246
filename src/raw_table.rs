use alloc::boxed::Box;
use alloc::vec;
#[cfg(feature = "stats")]
use core::cell::Cell;
use core::fmt::Debug;

use crate::error::Error;
use crate::error::Result;
use crate::slot::Slot;
use crate::slot::SlotLayout;
use crate::slot::field_eq;

/// Tag of a slot that has never held an entry, or was reclaimed.
pub(crate) const EMPTY: i64 = 0;

/// Tag of a slot whose entry was deleted while later slots on some probe path
/// were still in use. Lookups probe past it; inserts may reuse it.
pub(crate) const TOMBSTONE: i64 = i64::MIN;

/// Maps a raw 64-bit hash onto a tag that can never be mistaken for
/// [`EMPTY`] or [`TOMBSTONE`].
#[inline(always)]
pub(crate) fn identity(hash: u64) -> i64 {
    match hash as i64 {
        EMPTY => 1,
        TOMBSTONE => TOMBSTONE + 1,
        tag => tag,
    }
}

#[inline(always)]
pub(crate) fn is_live(tag: i64) -> bool {
    tag != EMPTY && tag != TOMBSTONE
}

/// Outcome of walking a probe sequence for one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The key lives at this index.
    Found(usize),
    /// The key is absent; this is the first reusable slot on its path.
    Vacant(usize),
    /// The key is absent and the whole cycle holds live entries.
    Full,
}

/// Whether [`RawTable::insert`] created a new entry or overwrote one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Insert {
    Inserted(usize),
    Updated(usize),
}

/// The linear-probing engine over one fixed byte buffer.
///
/// Callers supply the tag (see [`identity`]) and the canonical key bytes for
/// every operation, mirroring how a raw hash table takes a hash and an
/// equality check instead of owning a hasher.
///
/// # Invariants
/// - `buf.len() == size * layout.slot_width()` and never changes.
/// - `populated` counts live slots and `tombstones` counts [`TOMBSTONE`]
///   slots; `populated + tombstones <= size`.
/// - For every live slot `p` with home `h`, no slot in the cyclic range
///   `[h, p)` is [`EMPTY`]. Lookups may therefore stop at the first empty
///   slot.
#[derive(Clone)]
pub(crate) struct RawTable {
    buf: Box<[u8]>,
    layout: SlotLayout,
    size: usize,

    populated: usize,
    tombstones: usize,

    #[cfg(feature = "stats")]
    probes: Cell<u64>,
}

impl Debug for RawTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Tags<'a>(&'a RawTable);

        impl Debug for Tags<'_> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let table = self.0;
                let mut list = f.debug_list();
                for index in 0..table.size {
                    match table.layout.tag(&table.buf, index) {
                        EMPTY => list.entry(&format_args!("..")),
                        TOMBSTONE => list.entry(&format_args!("xx")),
                        tag => list.entry(&format_args!("{:016x}@{}", tag, table.home(tag))),
                    };
                }
                list.finish()
            }
        }

        f.debug_struct("RawTable")
            .field("slots", &Tags(self))
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.size)
            .finish()
    }
}

impl RawTable {
    /// Allocates a zeroed table of `size` slots.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or the buffer length overflows `usize`.
    pub(crate) fn new(layout: SlotLayout, size: usize) -> Self {
        assert!(size > 0, "table size must be positive");
        let len = layout
            .slot_width()
            .checked_mul(size)
            .expect("allocation size overflow");

        log::debug!(
            "allocating fixed table: {size} slots of {} bytes ({len} bytes)",
            layout.slot_width()
        );

        Self {
            buf: vec![0u8; len].into_boxed_slice(),
            layout,
            size,
            populated: 0,
            tombstones: 0,
            #[cfg(feature = "stats")]
            probes: Cell::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn layout(&self) -> SlotLayout {
        self.layout
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.populated
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[cfg(feature = "stats")]
    #[inline(always)]
    pub(crate) fn total_bytes(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    fn home(&self, tag: i64) -> usize {
        tag.rem_euclid(self.size as i64) as usize
    }

    #[inline(always)]
    fn wrap(&self, index: usize) -> usize {
        if index >= self.size {
            index - self.size
        } else {
            index
        }
    }

    #[inline(always)]
    fn prev(&self, index: usize) -> usize {
        if index == 0 { self.size - 1 } else { index - 1 }
    }

    #[inline(always)]
    fn record_probes(&self, steps: usize) {
        #[cfg(feature = "stats")]
        self.probes
            .set(self.probes.get().saturating_add(steps as u64));
        #[cfg(not(feature = "stats"))]
        let _ = steps;
    }

    /// Walks the probe sequence of `tag` from its home slot.
    ///
    /// Stops at the matching slot, or at the first [`EMPTY`] slot, or after
    /// one full cycle. The first tombstone seen is remembered so inserts can
    /// reuse it.
    fn probe(&self, tag: i64, key: &[u8]) -> Probe {
        debug_assert!(is_live(tag));

        let home = self.home(tag);
        let mut reusable = None;
        for step in 0..self.size {
            let index = self.wrap(home + step);
            let slot = self.layout.decode(&self.buf, index);
            match slot.tag {
                EMPTY => {
                    self.record_probes(step);
                    return Probe::Vacant(reusable.unwrap_or(index));
                }
                TOMBSTONE => {
                    reusable.get_or_insert(index);
                }
                t if t == tag && field_eq(slot.key, key) => {
                    self.record_probes(step);
                    return Probe::Found(index);
                }
                _ => {}
            }
        }

        self.record_probes(self.size - 1);
        reusable.map_or(Probe::Full, Probe::Vacant)
    }

    /// Returns the index of the live slot holding `key`.
    #[inline]
    pub(crate) fn find(&self, tag: i64, key: &[u8]) -> Option<usize> {
        match self.probe(tag, key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Inserts `key -> value`, or overwrites the value if `key` is present.
    ///
    /// Fails with [`Error::TableFull`] when the probe cycle holds only live
    /// entries for other keys. The table is unmodified on failure.
    pub(crate) fn insert(&mut self, tag: i64, key: &[u8], value: &[u8]) -> Result<Insert> {
        match self.probe(tag, key) {
            Probe::Found(index) => {
                self.layout.write_value(&mut self.buf, index, value);
                Ok(Insert::Updated(index))
            }
            Probe::Vacant(index) => {
                if self.layout.tag(&self.buf, index) == TOMBSTONE {
                    self.tombstones -= 1;
                }
                self.layout.encode(&mut self.buf, index, tag, key, value);
                self.populated += 1;
                debug_assert!(self.populated + self.tombstones <= self.size);
                Ok(Insert::Inserted(index))
            }
            Probe::Full => {
                log::trace!(
                    "rejecting insert of tag {tag:#018x}: all {} slots occupied",
                    self.size
                );
                debug_assert_eq!(self.populated, self.size);
                Err(Error::TableFull)
            }
        }
    }

    /// Removes `key`, failing with [`Error::NotFound`] if it is absent.
    pub(crate) fn remove(&mut self, tag: i64, key: &[u8]) -> Result<usize> {
        let index = self.find(tag, key).ok_or(Error::NotFound)?;
        self.remove_at(index);
        Ok(index)
    }

    /// Clears the live slot at `index`.
    ///
    /// The slot becomes [`EMPTY`] when the next slot is already empty, since no
    /// probe path can continue past it; any tombstones directly before it are
    /// reclaimed as well. Otherwise it becomes a [`TOMBSTONE`].
    pub(crate) fn remove_at(&mut self, index: usize) {
        debug_assert!(is_live(self.layout.tag(&self.buf, index)));

        let next = self.wrap(index + 1);
        if self.layout.tag(&self.buf, next) == EMPTY {
            self.layout.encode(&mut self.buf, index, EMPTY, &[], &[]);

            let mut reclaimed = 0;
            let mut cursor = self.prev(index);
            while cursor != index && self.layout.tag(&self.buf, cursor) == TOMBSTONE {
                self.layout.encode(&mut self.buf, cursor, EMPTY, &[], &[]);
                reclaimed += 1;
                cursor = self.prev(cursor);
            }

            if reclaimed > 0 {
                log::trace!("reclaimed {reclaimed} tombstones before slot {index}");
            }
            self.tombstones -= reclaimed;
        } else {
            log::trace!("leaving tombstone at slot {index}");
            self.layout.encode(&mut self.buf, index, TOMBSTONE, &[], &[]);
            self.tombstones += 1;
        }

        self.populated -= 1;
    }

    /// Index of the lowest live slot, if any.
    pub(crate) fn first_occupied(&self) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }
        (0..self.size).find(|&index| is_live(self.layout.tag(&self.buf, index)))
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Slot<'_> {
        self.layout.decode(&self.buf, index)
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut [u8] {
        self.layout.value_mut(&mut self.buf, index)
    }

    /// Resets every slot to [`EMPTY`].
    pub(crate) fn clear(&mut self) {
        self.buf.fill(0);
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Rebuilds the table without tombstones.
    ///
    /// Live entries are re-placed along their probe paths into a fresh buffer
    /// of the same size, so lookups that used to step over tombstones become
    /// shorter. Length and capacity are unchanged.
    pub(crate) fn compact(&mut self) {
        if self.tombstones == 0 {
            return;
        }

        log::debug!(
            "compacting table: {} live entries, {} tombstones",
            self.populated,
            self.tombstones
        );

        let fresh = vec![0u8; self.buf.len()].into_boxed_slice();
        let old = core::mem::replace(&mut self.buf, fresh);
        for index in 0..self.size {
            let slot = self.layout.decode(&old, index);
            if !is_live(slot.tag) {
                continue;
            }

            let home = self.home(slot.tag);
            let target = (0..self.size)
                .map(|step| self.wrap(home + step))
                .find(|&candidate| self.layout.tag(&self.buf, candidate) == EMPTY);
            match target {
                Some(target) => {
                    self.layout
                        .encode(&mut self.buf, target, slot.tag, slot.key, slot.value);
                }
                None => unreachable!("compaction ran out of slots"),
            }
        }

        self.tombstones = 0;
    }

    /// Iterates live slots in ascending index order.
    pub(crate) fn iter(&self) -> RawIter<'_> {
        RawIter {
            table: self,
            index: 0,
            remaining: self.populated,
        }
    }

    /// Cumulative slot visits past the home slot, over every probe.
    #[cfg(feature = "stats")]
    pub(crate) fn probe_count(&self) -> u64 {
        self.probes.get()
    }

    /// Distance of a live slot at `index` with `tag` from its home slot.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn displacement(&self, index: usize, tag: i64) -> usize {
        let home = self.home(tag);
        if index >= home {
            index - home
        } else {
            index + self.size - home
        }
    }
}

/// Iterator over the live slots of a [`RawTable`].
pub(crate) struct RawIter<'a> {
    table: &'a RawTable,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for RawIter<'a> {
    type Item = Slot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        while self.index < self.table.size {
            let slot = self.table.layout.decode(&self.table.buf, self.index);
            self.index += 1;
            if is_live(slot.tag) {
                self.remaining -= 1;
                return Some(slot);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RawIter<'_> {}
