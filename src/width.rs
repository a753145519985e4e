//! The width-selection pass: a first streaming sweep over the dump's
//! skip-content records that tallies counts and maxima, from which every
//! per-field byte width used by the second pass is derived.
//!
//! There is no directory in the source stream to read counts and maxima
//! from up front, so a dedicated pass over observed record sizes stands in
//! for one: the smallest width that fits every value seen is picked once,
//! and the indexing pass then writes every row of a given kind at that
//! fixed width.

use crate::io::bytes_needed;
use crate::records::{Record, RecordKindSet, RecordSource};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct WidthTally {
    class_count: u64,
    instance_count: u64,
    object_array_count: u64,
    primitive_array_count: u64,
    max_class_size: u64,
    max_instance_size: u64,
    max_object_array_size: u64,
    max_primitive_array_size: u64,
}

/// The per-dump byte widths derived from the width-selection pass, plus the
/// identifier width supplied by the dump header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Widths {
    pub id_width: u8,
    pub class_count: u64,
    pub instance_count: u64,
    pub object_array_count: u64,
    pub primitive_array_count: u64,
    pub bytes_for_position: u8,
    pub bytes_for_class_size: u8,
    pub bytes_for_instance_size: u8,
    pub bytes_for_object_array_size: u8,
    pub bytes_for_primitive_array_size: u8,
    pub can_use_class_size_highest_bit: bool,
}

impl Widths {
    /// Runs the width-selection pass over `source` and derives every width
    /// the indexing pass needs.
    pub fn compute<R: RecordSource>(source: &mut R, id_width: u8) -> Result<Self, R::Error> {
        let mut tally = WidthTally::default();

        let total_bytes_read = source.read_records(RecordKindSet::SKIP_CONTENT, &mut |_pos, record| {
            match record {
                Record::ClassSkip(r) => {
                    tally.class_count += 1;
                    tally.max_class_size = tally.max_class_size.max(r.record_size);
                }
                Record::InstanceSkip(r) => {
                    tally.instance_count += 1;
                    tally.max_instance_size = tally.max_instance_size.max(r.record_size);
                }
                Record::ObjectArraySkip(r) => {
                    tally.object_array_count += 1;
                    tally.max_object_array_size = tally.max_object_array_size.max(r.record_size);
                }
                Record::PrimitiveArraySkip(r) => {
                    tally.primitive_array_count += 1;
                    tally.max_primitive_array_size =
                        tally.max_primitive_array_size.max(r.record_size);
                }
                _ => unreachable!("read_records only requested SKIP_CONTENT kinds"),
            }
        })?;

        // A class row packs `hasRefFields` into the size field's top bit
        // when there's room; that requires at least one byte to exist even
        // for an all-zero-size dump, otherwise there is nowhere to put the
        // flag.
        let bytes_for_class_size = bytes_needed(tally.max_class_size).max(1);
        let top_bit = 1u64 << (bytes_for_class_size as u32 * 8 - 1);
        let can_use_class_size_highest_bit = tally.max_class_size & top_bit == 0;

        log::debug!(
            "width-selection pass: classes={} instances={} object_arrays={} primitive_arrays={} \
             total_bytes_read={total_bytes_read} bytes_for_position={} packed_class_flag={}",
            tally.class_count,
            tally.instance_count,
            tally.object_array_count,
            tally.primitive_array_count,
            bytes_needed(total_bytes_read),
            can_use_class_size_highest_bit,
        );

        Ok(Self {
            id_width,
            class_count: tally.class_count,
            instance_count: tally.instance_count,
            object_array_count: tally.object_array_count,
            primitive_array_count: tally.primitive_array_count,
            bytes_for_position: bytes_needed(total_bytes_read),
            bytes_for_class_size,
            bytes_for_instance_size: bytes_needed(tally.max_instance_size),
            bytes_for_object_array_size: bytes_needed(tally.max_object_array_size),
            bytes_for_primitive_array_size: bytes_needed(tally.max_primitive_array_size),
            can_use_class_size_highest_bit,
        })
    }

    /// Width of the packed `(recordSize, hasRefFields)` field in a class row:
    /// `bytes_for_class_size` if the flag fits in the size field's spare top
    /// bit, else one extra byte for an unpacked flag.
    pub fn class_size_field_width(&self) -> u8 {
        if self.can_use_class_size_highest_bit {
            self.bytes_for_class_size
        } else {
            self.bytes_for_class_size + 1
        }
    }

    pub fn class_row_width(&self) -> u8 {
        self.bytes_for_position + self.id_width + 4 + self.class_size_field_width()
    }

    pub fn instance_row_width(&self) -> u8 {
        self.bytes_for_position + self.id_width + self.bytes_for_instance_size
    }

    pub fn object_array_row_width(&self) -> u8 {
        self.bytes_for_position + self.id_width + self.bytes_for_object_array_size
    }

    pub fn primitive_array_row_width(&self) -> u8 {
        self.bytes_for_position + 1 + self.bytes_for_primitive_array_size
    }
}
