//! In-memory `RecordSource` fixture used by the crate's unit tests.

use crate::records::{Record, RecordKindSet, RecordSource};

#[derive(Debug)]
pub struct VecSourceError;

impl std::fmt::Display for VecSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vec record source error")
    }
}

impl std::error::Error for VecSourceError {}

/// Replays a fixed `Vec<(position, Record)>` every time `read_records` is
/// called, filtering by the requested kind set — standing in for a real
/// streaming parser across the builder's two passes.
pub struct VecRecordSource {
    records: Vec<(u64, Record)>,
    total_bytes_read: u64,
}

impl VecRecordSource {
    pub fn new(records: Vec<(u64, Record)>) -> Self {
        let total_bytes_read = records.last().map(|(pos, _)| *pos + 1).unwrap_or(0);
        Self { records, total_bytes_read }
    }

    pub fn set_total_bytes_read(&mut self, total: u64) {
        self.total_bytes_read = total;
    }
}

fn kind_of(record: &Record) -> RecordKindSet {
    match record {
        Record::String(_) => RecordKindSet::STRING,
        Record::LoadClass(_) => RecordKindSet::LOAD_CLASS,
        Record::GcRoot(_) => RecordKindSet::ROOT,
        Record::ClassSkip(_) => RecordKindSet::CLASS_SKIP,
        Record::InstanceSkip(_) => RecordKindSet::INSTANCE_SKIP,
        Record::ObjectArraySkip(_) => RecordKindSet::OBJECT_ARRAY_SKIP,
        Record::PrimitiveArraySkip(_) => RecordKindSet::PRIMITIVE_ARRAY_SKIP,
    }
}

impl RecordSource for VecRecordSource {
    type Error = VecSourceError;

    fn read_records(
        &mut self,
        requested_kinds: RecordKindSet,
        on_record: &mut dyn FnMut(u64, Record),
    ) -> Result<u64, Self::Error> {
        for (pos, record) in &self.records {
            if requested_kinds.contains(kind_of(record)) {
                on_record(*pos, record.clone());
            }
        }
        Ok(self.total_bytes_read)
    }
}
