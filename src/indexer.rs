//! The indexing pass: the second streaming sweep, which consumes all seven
//! record kinds and appends to the four per-object-kind stores plus the
//! string and class-name maps. `build_index` drives both passes and hands
//! the finished tables to the façade by move — the builder is consumed and
//! must not be reused.

use crate::config::IndexBuilderOptions;
use crate::error::HeapIndexError;
use crate::ids::Id;
use crate::index::HeapIndex;
use crate::maps::{IdIdMap, IdMap, IdSet};
use crate::records::{Record, RecordKindSet, RecordSource};
use crate::store::ByteStoreBuilder;
use crate::width::Widths;

/// The eight well-known boxed-primitive class names, matched against
/// interned string bytes to seed the primitive-wrapper-name-id set.
const PRIMITIVE_WRAPPER_NAMES: [&str; 8] = [
    "java.lang.Boolean",
    "java.lang.Character",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
];

fn is_primitive_wrapper_name(bytes: &[u8]) -> bool {
    // Strings are interned from the dump as-is; JVM dumps use `/` as the
    // package separator, so match both spellings rather than require the
    // caller to normalize before indexing.
    match std::str::from_utf8(bytes) {
        Ok(s) => PRIMITIVE_WRAPPER_NAMES
            .iter()
            .any(|&name| s == name || s == name.replace('.', "/")),
        Err(_) => false,
    }
}

struct IndexBuilder {
    widths: Widths,
    options: IndexBuilderOptions,
    strings: IdMap<Vec<u8>>,
    class_names: IdIdMap,
    primitive_wrapper_name_ids: IdSet,
    primitive_wrapper_types: IdSet,
    gc_roots: Vec<crate::records::GcRootRecord>,
    class_store: ByteStoreBuilder,
    instance_store: ByteStoreBuilder,
    object_array_store: ByteStoreBuilder,
    primitive_array_store: ByteStoreBuilder,
}

impl IndexBuilder {
    fn new(widths: Widths, options: IndexBuilderOptions) -> Self {
        Self {
            strings: IdMap::new(),
            class_names: IdIdMap::with_capacity(widths.class_count as usize),
            primitive_wrapper_name_ids: IdSet::with_capacity(8),
            primitive_wrapper_types: IdSet::new(),
            gc_roots: Vec::new(),
            class_store: ByteStoreBuilder::with_capacity(
                widths.id_width,
                widths.class_row_width(),
                widths.class_count as usize,
            ),
            instance_store: ByteStoreBuilder::with_capacity(
                widths.id_width,
                widths.instance_row_width(),
                widths.instance_count as usize,
            ),
            object_array_store: ByteStoreBuilder::with_capacity(
                widths.id_width,
                widths.object_array_row_width(),
                widths.object_array_count as usize,
            ),
            primitive_array_store: ByteStoreBuilder::with_capacity(
                widths.id_width,
                widths.primitive_array_row_width(),
                widths.primitive_array_count as usize,
            ),
            widths,
            options,
        }
    }

    fn on_record(&mut self, position: u64, record: Record) {
        match record {
            Record::String(r) => {
                if is_primitive_wrapper_name(&r.bytes) {
                    self.primitive_wrapper_name_ids.insert(r.id);
                }
                self.strings.put(r.id, r.bytes);
            }
            Record::LoadClass(r) => {
                self.class_names.put(r.id, r.class_name_string_id);
                if self.primitive_wrapper_name_ids.contains(r.class_name_string_id) {
                    self.primitive_wrapper_types.insert(r.id);
                }
            }
            Record::GcRoot(r) => {
                if !r.id.is_null() && self.options.root_kinds.contains_kind(r.kind) {
                    self.gc_roots.push(r);
                }
            }
            Record::ClassSkip(r) => {
                let mut row = self.class_store.append(r.id);
                row.write_truncated(position, self.widths.bytes_for_position);
                row.write_id(r.superclass_id);
                row.write_int(r.instance_size);

                let width = self.widths.class_size_field_width();
                if self.widths.can_use_class_size_highest_bit {
                    let top_bit = 1u64 << (self.widths.bytes_for_class_size as u32 * 8 - 1);
                    let packed = r.record_size | if r.has_ref_fields { top_bit } else { 0 };
                    row.write_truncated(packed, width);
                } else {
                    row.write_truncated(r.record_size, self.widths.bytes_for_class_size);
                    row.write_byte(r.has_ref_fields as u8);
                }
            }
            Record::InstanceSkip(r) => {
                let mut row = self.instance_store.append(r.id);
                row.write_truncated(position, self.widths.bytes_for_position);
                row.write_id(r.class_id);
                row.write_truncated(r.record_size, self.widths.bytes_for_instance_size);
            }
            Record::ObjectArraySkip(r) => {
                let mut row = self.object_array_store.append(r.id);
                row.write_truncated(position, self.widths.bytes_for_position);
                row.write_id(r.array_class_id);
                row.write_truncated(r.record_size, self.widths.bytes_for_object_array_size);
            }
            Record::PrimitiveArraySkip(r) => {
                let mut row = self.primitive_array_store.append(r.id);
                row.write_truncated(position, self.widths.bytes_for_position);
                row.write_byte(r.primitive_type as u8);
                row.write_truncated(r.record_size, self.widths.bytes_for_primitive_array_size);
            }
        }
    }

    fn freeze(self) -> HeapIndex {
        log::debug!(
            "indexing pass complete: classes={} instances={} object_arrays={} primitive_arrays={} \
             strings={} roots={}",
            self.class_store.len(),
            self.instance_store.len(),
            self.object_array_store.len(),
            self.primitive_array_store.len(),
            self.strings.len(),
            self.gc_roots.len(),
        );

        HeapIndex::new(
            self.widths,
            self.options,
            self.class_store.freeze(),
            self.instance_store.freeze(),
            self.object_array_store.freeze(),
            self.primitive_array_store.freeze(),
            self.strings,
            self.class_names,
            self.primitive_wrapper_types,
            self.gc_roots,
        )
    }
}

/// Runs the width-selection pass then the indexing pass over `source`,
/// re-reading it from the start each time, and returns the finished,
/// read-only façade.
pub fn build_index<R: RecordSource>(
    source: &mut R,
    options: IndexBuilderOptions,
) -> Result<HeapIndex, HeapIndexError> {
    let id_width = options.id_width();

    let widths = Widths::compute(source, id_width)
        .map_err(|e| HeapIndexError::Upstream(Box::new(e)))?;

    let mut builder = IndexBuilder::new(widths, options);
    source
        .read_records(RecordKindSet::ALL, &mut |pos, record| builder.on_record(pos, record))
        .map_err(|e| HeapIndexError::Upstream(Box::new(e)))?;

    Ok(builder.freeze())
}
