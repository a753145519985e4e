//! The index façade: the finished, read-only structure produced by
//! [`crate::indexer::build_index`]. Every operation here is a pure function
//! of immutable state — there is no lifecycle after construction, no
//! further mutation, and no way to feed it more records.

use crate::config::IndexBuilderOptions;
use crate::error::{HeapIndexError, HeapIndexResult, InvariantViolation};
use crate::ids::Id;
use crate::maps::{IdIdMap, IdMap, IdSet};
use crate::records::{GcRootRecord, Platform, PrimitiveType};
use crate::store::ByteStore;
use crate::width::Widths;

/// A decoded row from one of the four per-kind stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectEntry {
    Class {
        position: u64,
        superclass_id: Id,
        instance_size: u32,
        record_size: u64,
        has_ref_fields: bool,
    },
    Instance {
        position: u64,
        class_id: Id,
        record_size: u64,
    },
    ObjectArray {
        position: u64,
        array_class_id: Id,
        record_size: u64,
    },
    PrimitiveArray {
        position: u64,
        primitive_type: PrimitiveType,
        record_size: u64,
    },
}

fn primitive_type_from_ordinal(ordinal: u8) -> PrimitiveType {
    ordinal
        .try_into()
        .unwrap_or_else(|_| panic!("invalid primitive type ordinal {ordinal} in frozen store"))
}

/// The read-only, queryable index built from one heap dump.
pub struct HeapIndex {
    widths: Widths,
    platform: Platform,
    remapper: std::sync::Arc<dyn crate::remap::NameRemapper>,

    class_store: ByteStore,
    instance_store: ByteStore,
    object_array_store: ByteStore,
    primitive_array_store: ByteStore,

    strings: IdMap<Vec<u8>>,
    class_names: IdIdMap,
    primitive_wrapper_types: IdSet,
    gc_roots: Vec<GcRootRecord>,
}

impl HeapIndex {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        widths: Widths,
        options: IndexBuilderOptions,
        class_store: ByteStore,
        instance_store: ByteStore,
        object_array_store: ByteStore,
        primitive_array_store: ByteStore,
        strings: IdMap<Vec<u8>>,
        class_names: IdIdMap,
        primitive_wrapper_types: IdSet,
        gc_roots: Vec<GcRootRecord>,
    ) -> Self {
        Self {
            widths,
            platform: options.platform,
            remapper: options.remapper,
            class_store,
            instance_store,
            object_array_store,
            primitive_array_store,
            strings,
            class_names,
            primitive_wrapper_types,
            gc_roots,
        }
    }

    pub fn class_count(&self) -> usize {
        self.class_store.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instance_store.len()
    }

    pub fn object_array_count(&self) -> usize {
        self.object_array_store.len()
    }

    pub fn primitive_array_count(&self) -> usize {
        self.primitive_array_store.len()
    }

    fn decode_class_row(&self, mut row: crate::io::RowReader<'_>) -> ObjectEntry {
        let position = row.read_truncated(self.widths.bytes_for_position);
        let superclass_id = row.read_id();
        let instance_size = row.read_int();

        let (record_size, has_ref_fields) = if self.widths.can_use_class_size_highest_bit {
            let packed = row.read_truncated(self.widths.bytes_for_class_size);
            let top_bit = 1u64 << (self.widths.bytes_for_class_size as u32 * 8 - 1);
            (packed & !top_bit, packed & top_bit != 0)
        } else {
            let size = row.read_truncated(self.widths.bytes_for_class_size);
            let flag = row.read_byte();
            (size, flag != 0)
        };

        ObjectEntry::Class { position, superclass_id, instance_size, record_size, has_ref_fields }
    }

    fn decode_instance_row(&self, mut row: crate::io::RowReader<'_>) -> ObjectEntry {
        ObjectEntry::Instance {
            position: row.read_truncated(self.widths.bytes_for_position),
            class_id: row.read_id(),
            record_size: row.read_truncated(self.widths.bytes_for_instance_size),
        }
    }

    fn decode_object_array_row(&self, mut row: crate::io::RowReader<'_>) -> ObjectEntry {
        ObjectEntry::ObjectArray {
            position: row.read_truncated(self.widths.bytes_for_position),
            array_class_id: row.read_id(),
            record_size: row.read_truncated(self.widths.bytes_for_object_array_size),
        }
    }

    fn decode_primitive_array_row(&self, mut row: crate::io::RowReader<'_>) -> ObjectEntry {
        let position = row.read_truncated(self.widths.bytes_for_position);
        let primitive_type = primitive_type_from_ordinal(row.read_byte());
        let record_size = row.read_truncated(self.widths.bytes_for_primitive_array_size);
        ObjectEntry::PrimitiveArray { position, primitive_type, record_size }
    }

    /// `classId -> stringId -> string bytes`, with optional remapping and
    /// (for JVM-style dumps) `/`-to-`.` package-separator rewriting applied.
    pub fn class_name(&self, class_id: Id) -> HeapIndexResult<String> {
        let string_id = self
            .class_names
            .get(class_id)
            .ok_or(InvariantViolation::MissingClass { class_id: class_id.0 })?;
        let bytes = self.strings.get(string_id).ok_or(InvariantViolation::MissingClassNameString {
            class_id: class_id.0,
            string_id: string_id.0,
        })?;
        let raw = String::from_utf8_lossy(bytes);
        let normalized = match self.platform {
            Platform::Jvm => raw.replace('/', "."),
            Platform::Android => raw.into_owned(),
        };
        Ok(self.remapper.deobfuscate_class_name(&normalized))
    }

    /// Looks up `fieldNameStringId`, remapped in the context of the
    /// declaring class's name.
    pub fn field_name(&self, class_id: Id, field_name_string_id: Id) -> HeapIndexResult<String> {
        let class_name = self.class_name(class_id)?;
        let bytes = self.strings.get(field_name_string_id).ok_or(
            InvariantViolation::MissingString { string_id: field_name_string_id.0 },
        )?;
        let raw = String::from_utf8_lossy(bytes);
        Ok(self.remapper.deobfuscate_field_name(&class_name, &raw))
    }

    /// Reverse lookup: `className -> classId`. `O(n+m)` by contract — a
    /// linear scan over strings then class names — callers should not use
    /// this on a hot path.
    pub fn class_id(&self, class_name: &str) -> Option<Id> {
        let wanted = match self.platform {
            Platform::Jvm => class_name.replace('.', "/"),
            Platform::Android => class_name.to_string(),
        };

        let string_id = self
            .strings
            .iter()
            .find(|(_, bytes)| bytes.as_slice() == wanted.as_bytes() || bytes.as_slice() == class_name.as_bytes())
            .map(|(id, _)| id)?;

        self.class_names
            .iter()
            .find(|(_, name_string_id)| *name_string_id == string_id)
            .map(|(class_id, _)| class_id)
    }

    pub fn object_id_is_indexed(&self, id: Id) -> bool {
        self.class_store.contains(id)
            || self.instance_store.contains(id)
            || self.object_array_store.contains(id)
            || self.primitive_array_store.contains(id)
    }

    /// Checks the four stores in kind order (class, instance, object array,
    /// primitive array) and returns the dense slot and decoded entry for the
    /// first hit. Dense slots are 0-based and run class-first, then
    /// instances, then object arrays, then primitive arrays.
    pub fn indexed_object_or_null(&self, id: Id) -> Option<(usize, ObjectEntry)> {
        if let Ok(slot) = self.class_store.index_of(id) {
            return Some((slot, self.decode_class_row(self.class_store.get_at_index(slot))));
        }
        if let Ok(slot) = self.instance_store.index_of(id) {
            let base = self.class_store.len();
            return Some((base + slot, self.decode_instance_row(self.instance_store.get_at_index(slot))));
        }
        if let Ok(slot) = self.object_array_store.index_of(id) {
            let base = self.class_store.len() + self.instance_store.len();
            return Some((
                base + slot,
                self.decode_object_array_row(self.object_array_store.get_at_index(slot)),
            ));
        }
        if let Ok(slot) = self.primitive_array_store.index_of(id) {
            let base = self.class_store.len() + self.instance_store.len() + self.object_array_store.len();
            return Some((
                base + slot,
                self.decode_primitive_array_row(self.primitive_array_store.get_at_index(slot)),
            ));
        }
        None
    }

    fn total_indexed(&self) -> usize {
        self.class_store.len()
            + self.instance_store.len()
            + self.object_array_store.len()
            + self.primitive_array_store.len()
    }

    /// The exact inverse of `indexed_object_or_null`'s slot. 0-based;
    /// `dense_slot` must be in `[0, total)`.
    pub fn object_at_index(&self, dense_slot: usize) -> HeapIndexResult<(Id, ObjectEntry)> {
        let total = self.total_indexed();
        if dense_slot >= total {
            return Err(InvariantViolation::DenseSlotOutOfRange { slot: dense_slot, len: total }.into());
        }

        let mut slot = dense_slot;
        if slot < self.class_store.len() {
            return Ok((self.class_store.key_at(slot), self.decode_class_row(self.class_store.get_at_index(slot))));
        }
        slot -= self.class_store.len();
        if slot < self.instance_store.len() {
            return Ok((
                self.instance_store.key_at(slot),
                self.decode_instance_row(self.instance_store.get_at_index(slot)),
            ));
        }
        slot -= self.instance_store.len();
        if slot < self.object_array_store.len() {
            return Ok((
                self.object_array_store.key_at(slot),
                self.decode_object_array_row(self.object_array_store.get_at_index(slot)),
            ));
        }
        slot -= self.object_array_store.len();
        Ok((
            self.primitive_array_store.key_at(slot),
            self.decode_primitive_array_row(self.primitive_array_store.get_at_index(slot)),
        ))
    }

    pub fn indexed_class_sequence(&self) -> impl Iterator<Item = (Id, ObjectEntry)> + '_ {
        self.class_store.entry_sequence().map(move |(id, row)| (id, self.decode_class_row(row)))
    }

    pub fn indexed_instance_sequence(&self) -> impl Iterator<Item = (Id, ObjectEntry)> + '_ {
        self.instance_store.entry_sequence().map(move |(id, row)| (id, self.decode_instance_row(row)))
    }

    pub fn indexed_object_array_sequence(&self) -> impl Iterator<Item = (Id, ObjectEntry)> + '_ {
        self.object_array_store.entry_sequence().map(move |(id, row)| (id, self.decode_object_array_row(row)))
    }

    pub fn indexed_primitive_array_sequence(&self) -> impl Iterator<Item = (Id, ObjectEntry)> + '_ {
        self.primitive_array_store
            .entry_sequence()
            .map(move |(id, row)| (id, self.decode_primitive_array_row(row)))
    }

    /// The concatenation of the four kind sequences in dense-slot order.
    pub fn indexed_object_sequence(&self) -> impl Iterator<Item = (Id, ObjectEntry)> + '_ {
        self.indexed_class_sequence()
            .chain(self.indexed_instance_sequence())
            .chain(self.indexed_object_array_sequence())
            .chain(self.indexed_primitive_array_sequence())
    }

    /// The frozen, stream-ordered root list, already filtered to non-null
    /// identifiers and caller-selected kinds during the indexing pass.
    pub fn gc_roots(&self) -> &[GcRootRecord] {
        &self.gc_roots
    }

    pub fn primitive_wrapper_types(&self) -> &IdSet {
        &self.primitive_wrapper_types
    }
}
