//! Variable-width byte store: an append-only array of fixed-width rows keyed
//! by object identifier, frozen into a sorted, binary-searchable array.
//!
//! The row width is picked once, at store construction, from the
//! width-selection pass, and every row in a given store has exactly that
//! width — there is no per-row header to parse.

use crate::ids::Id;
use crate::io::{RowReader, RowWriter};

/// Entries are stored back to back with no per-entry header: `id_width`
/// bytes of big-endian identifier immediately followed by `row_width` bytes
/// of payload.
#[derive(Clone, Debug)]
pub struct ByteStoreBuilder {
    id_width: u8,
    row_width: u8,
    entry_width: usize,
    buf: Vec<u8>,
    len: usize,
}

impl ByteStoreBuilder {
    pub fn new(id_width: u8, row_width: u8) -> Self {
        Self::with_capacity(id_width, row_width, 0)
    }

    pub fn with_capacity(id_width: u8, row_width: u8, capacity: usize) -> Self {
        let entry_width = id_width as usize + row_width as usize;
        Self {
            id_width,
            row_width,
            entry_width,
            buf: Vec::with_capacity(entry_width * capacity),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserves one row for `id` and returns a cursor that must write
    /// exactly `row_width` bytes through `write_id`/`write_int`/`write_byte`/
    /// `write_truncated`.
    pub fn append(&mut self, id: Id) -> RowWriter<'_> {
        let start = self.buf.len();
        self.buf.resize(start + self.entry_width, 0);
        self.len += 1;

        {
            let id_bytes = &mut self.buf[start..start + self.id_width as usize];
            id_bytes.copy_from_slice(&id.0.to_be_bytes()[8 - self.id_width as usize..]);
        }

        let row_start = start + self.id_width as usize;
        RowWriter::new(&mut self.buf[row_start..row_start + self.row_width as usize], self.id_width)
    }

    /// Sorts entries by identifier ascending and discards the write cursor,
    /// producing the read-only, binary-searchable form.
    pub fn freeze(self) -> ByteStore {
        let entry_width = self.entry_width;
        let count = self.len;

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_unstable_by(|&a, &b| {
            let ra = &self.buf[a * entry_width..a * entry_width + self.id_width as usize];
            let rb = &self.buf[b * entry_width..b * entry_width + self.id_width as usize];
            ra.cmp(rb)
        });

        let mut sorted = vec![0u8; self.buf.len()];
        for (dst, &src) in order.into_iter().enumerate() {
            let src_range = src * entry_width..(src + 1) * entry_width;
            let dst_range = dst * entry_width..(dst + 1) * entry_width;
            sorted[dst_range].copy_from_slice(&self.buf[src_range]);
        }

        ByteStore {
            id_width: self.id_width,
            row_width: self.row_width,
            entry_width,
            count,
            buf: sorted,
        }
    }
}

/// The sorted, immutable form of a [`ByteStoreBuilder`]. Supports binary
/// search by identifier, O(1) slot access, and ascending sequential
/// iteration.
#[derive(Clone, Debug)]
pub struct ByteStore {
    id_width: u8,
    row_width: u8,
    entry_width: usize,
    count: usize,
    buf: Vec<u8>,
}

impl ByteStore {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn entry(&self, slot: usize) -> &[u8] {
        &self.buf[slot * self.entry_width..(slot + 1) * self.entry_width]
    }

    pub fn key_at(&self, slot: usize) -> Id {
        let id_bytes = &self.entry(slot)[..self.id_width as usize];
        let mut full = [0u8; 8];
        full[8 - self.id_width as usize..].copy_from_slice(id_bytes);
        Id(u64::from_be_bytes(full))
    }

    pub fn get_at_index(&self, slot: usize) -> RowReader<'_> {
        let row = &self.entry(slot)[self.id_width as usize..];
        RowReader::new(row, self.id_width)
    }

    /// Binary search by identifier. Mirrors `Vec::binary_search`: `Ok(slot)`
    /// on a hit, `Err(insertion_point)` on a miss.
    pub fn index_of(&self, id: Id) -> Result<usize, usize> {
        let target = &id.0.to_be_bytes()[8 - self.id_width as usize..];
        let mut lo = 0usize;
        let mut hi = self.count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let key = &self.entry(mid)[..self.id_width as usize];
            match key.cmp(target) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.index_of(id).is_ok()
    }

    /// Lazy, ascending, single-pass sequence of `(id, row)` pairs.
    pub fn entry_sequence(&self) -> impl Iterator<Item = (Id, RowReader<'_>)> + '_ {
        (0..self.count).map(move |slot| (self.key_at(slot), self.get_at_index(slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_finds_by_id() {
        let mut builder = ByteStoreBuilder::new(8, 4);
        for id in [30u64, 10, 20] {
            let mut row = builder.append(Id(id));
            row.write_int(id as u32 * 10);
        }
        let store = builder.freeze();

        assert_eq!(store.len(), 3);
        let ids: Vec<u64> = (0..store.len()).map(|i| store.key_at(i).0).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        let slot = store.index_of(Id(20)).unwrap();
        let mut row = store.get_at_index(slot);
        assert_eq!(row.read_int(), 200);

        assert!(store.index_of(Id(15)).is_err());
        assert!(!store.contains(Id(999)));
        assert!(store.contains(Id(30)));
    }

    #[test]
    fn entry_sequence_is_ascending() {
        let mut builder = ByteStoreBuilder::new(4, 1);
        for id in [5u64, 1, 3, 2, 4] {
            builder.append(Id(id)).write_byte(id as u8);
        }
        let store = builder.freeze();
        let ids: Vec<u64> = store.entry_sequence().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
