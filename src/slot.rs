//! Fixed binary layout of one table slot.
//!
//! A slot is `TAG_WIDTH + key_width + value_width` bytes:
//!
//! ```text
//! | tag: i64 (little-endian) | key: key_width bytes | value: value_width bytes |
//! ```
//!
//! Slot `i` lives at byte range `[i * slot_width, (i + 1) * slot_width)` of the
//! table buffer. The codec attaches no meaning to particular tag values; that
//! is left to the probe engine in `raw_table`.

/// Width in bytes of the encoded tag.
pub(crate) const TAG_WIDTH: usize = core::mem::size_of::<i64>();

/// A decoded view of one slot, borrowing from the table buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Slot<'a> {
    pub(crate) tag: i64,
    pub(crate) key: &'a [u8],
    pub(crate) value: &'a [u8],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlotLayout {
    key_width: usize,
    value_width: usize,
}

impl SlotLayout {
    pub(crate) const fn new(key_width: usize, value_width: usize) -> Self {
        Self {
            key_width,
            value_width,
        }
    }

    #[inline(always)]
    pub(crate) const fn key_width(self) -> usize {
        self.key_width
    }

    #[inline(always)]
    pub(crate) const fn value_width(self) -> usize {
        self.value_width
    }

    #[inline(always)]
    pub(crate) const fn slot_width(self) -> usize {
        TAG_WIDTH + self.key_width + self.value_width
    }

    /// Number of whole slots held by `buf`.
    #[inline]
    pub(crate) fn slots_in(self, buf: &[u8]) -> usize {
        buf.len() / self.slot_width()
    }

    #[inline(always)]
    fn slot(self, buf: &[u8], index: usize) -> &[u8] {
        let width = self.slot_width();
        assert!(
            index < self.slots_in(buf),
            "slot index {index} out of bounds for {} slots",
            self.slots_in(buf)
        );
        &buf[index * width..(index + 1) * width]
    }

    #[inline(always)]
    fn slot_mut(self, buf: &mut [u8], index: usize) -> &mut [u8] {
        let width = self.slot_width();
        assert!(
            index < self.slots_in(buf),
            "slot index {index} out of bounds for {} slots",
            self.slots_in(buf)
        );
        &mut buf[index * width..(index + 1) * width]
    }

    /// Writes `(tag, key, value)` into slot `index`, padding or truncating the
    /// key and value to their widths. No byte outside the slot is touched.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a slot of `buf`.
    pub(crate) fn encode(self, buf: &mut [u8], index: usize, tag: i64, key: &[u8], value: &[u8]) {
        let key_width = self.key_width;
        let slot = self.slot_mut(buf, index);
        let (tag_bytes, rest) = slot.split_at_mut(TAG_WIDTH);
        let (key_bytes, value_bytes) = rest.split_at_mut(key_width);

        tag_bytes.copy_from_slice(&tag.to_le_bytes());
        write_padded(key_bytes, key);
        write_padded(value_bytes, value);
    }

    /// Reads slot `index` back. Exact inverse of [`encode`](Self::encode).
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a slot of `buf`.
    pub(crate) fn decode(self, buf: &[u8], index: usize) -> Slot<'_> {
        let slot = self.slot(buf, index);
        let (tag_bytes, rest) = slot.split_at(TAG_WIDTH);
        let (key, value) = rest.split_at(self.key_width);

        Slot {
            tag: decode_tag(tag_bytes),
            key,
            value,
        }
    }

    /// Reads only the tag of slot `index`.
    #[inline]
    pub(crate) fn tag(self, buf: &[u8], index: usize) -> i64 {
        decode_tag(&self.slot(buf, index)[..TAG_WIDTH])
    }

    /// Overwrites the value of slot `index`, leaving its tag and key alone.
    #[inline]
    pub(crate) fn write_value(self, buf: &mut [u8], index: usize, value: &[u8]) {
        write_padded(self.value_mut(buf, index), value);
    }

    #[inline]
    pub(crate) fn value_mut(self, buf: &mut [u8], index: usize) -> &mut [u8] {
        let key_width = self.key_width;
        &mut self.slot_mut(buf, index)[TAG_WIDTH + key_width..]
    }
}

#[inline(always)]
fn decode_tag(bytes: &[u8]) -> i64 {
    let mut raw = [0u8; TAG_WIDTH];
    raw.copy_from_slice(bytes);
    i64::from_le_bytes(raw)
}

#[inline]
fn write_padded(dst: &mut [u8], src: &[u8]) {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n..].fill(0);
}

/// Reduces `key` to the bytes that distinguish it once stored in a
/// `width`-byte field: truncated to `width`, trailing zeros removed.
///
/// Two inputs store to the same field exactly when their canonical forms are
/// equal, so the canonical form is what gets hashed.
#[inline]
pub(crate) fn canonical(key: &[u8], width: usize) -> &[u8] {
    let key = &key[..key.len().min(width)];
    let end = key.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &key[..end]
}

/// Whether a stored fixed-width field holds `canonical` followed by zero
/// padding.
#[inline]
pub(crate) fn field_eq(stored: &[u8], canonical: &[u8]) -> bool {
    match stored.split_at_checked(canonical.len()) {
        Some((head, tail)) => head == canonical && tail.iter().all(|&b| b == 0),
        None => false,
    }
}
