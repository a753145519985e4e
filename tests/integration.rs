//! End-to-end test driving the full builder -> façade pipeline over a
//! hand-built multi-kind record stream, the integration-test analogue of
//! exercising `Image::read` over a full PE image.

use heapindex::{
    build_index, ClassSkipContentRecord, DumpHeader, GcRootRecord, Id, IdentifierByteSize,
    IndexBuilderOptions, InstanceSkipContentRecord, LoadClassRecord, ObjectArraySkipContentRecord,
    ObjectEntry, Platform, PrimitiveArraySkipContentRecord, PrimitiveType, Record, RecordKindSet,
    RecordSource, RootKind, RootKindSet, StringRecord,
};

#[derive(Debug)]
struct FixtureError;

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fixture record source error")
    }
}

impl std::error::Error for FixtureError {}

/// Replays a fixed record stream every time it's asked, like a real parser
/// re-reading the dump from the start on each `read_records` call.
struct FixtureSource {
    records: Vec<(u64, Record)>,
    total_bytes_read: u64,
}

fn kind_matches(record: &Record, requested: RecordKindSet) -> bool {
    let kind = match record {
        Record::String(_) => RecordKindSet::STRING,
        Record::LoadClass(_) => RecordKindSet::LOAD_CLASS,
        Record::GcRoot(_) => RecordKindSet::ROOT,
        Record::ClassSkip(_) => RecordKindSet::CLASS_SKIP,
        Record::InstanceSkip(_) => RecordKindSet::INSTANCE_SKIP,
        Record::ObjectArraySkip(_) => RecordKindSet::OBJECT_ARRAY_SKIP,
        Record::PrimitiveArraySkip(_) => RecordKindSet::PRIMITIVE_ARRAY_SKIP,
    };
    requested.contains(kind)
}

impl RecordSource for FixtureSource {
    type Error = FixtureError;

    fn read_records(
        &mut self,
        requested_kinds: RecordKindSet,
        on_record: &mut dyn FnMut(u64, Record),
    ) -> Result<u64, Self::Error> {
        for (pos, record) in &self.records {
            if kind_matches(record, requested_kinds) {
                on_record(*pos, record.clone());
            }
        }
        Ok(self.total_bytes_read)
    }
}

/// Builds a small but representative dump: a class hierarchy, an instance,
/// an object array, a primitive array, a boxed-primitive class, and a mix
/// of selected and unselected GC roots.
fn build_fixture() -> FixtureSource {
    let records = vec![
        (0, Record::String(StringRecord { id: Id(1), bytes: b"java.lang.Object".to_vec() })),
        (20, Record::String(StringRecord { id: Id(2), bytes: b"com.example.Widget".to_vec() })),
        (40, Record::String(StringRecord { id: Id(3), bytes: b"java.lang.Integer".to_vec() })),
        (60, Record::String(StringRecord { id: Id(4), bytes: b"[Lcom.example.Widget;".to_vec() })),
        (80, Record::LoadClass(LoadClassRecord { id: Id(100), class_name_string_id: Id(1) })),
        (90, Record::LoadClass(LoadClassRecord { id: Id(101), class_name_string_id: Id(2) })),
        (100, Record::LoadClass(LoadClassRecord { id: Id(102), class_name_string_id: Id(3) })),
        (110, Record::LoadClass(LoadClassRecord { id: Id(103), class_name_string_id: Id(4) })),
        (120, Record::ClassSkip(ClassSkipContentRecord {
            id: Id(100),
            superclass_id: Id(0),
            instance_size: 0,
            record_size: 8,
            has_ref_fields: false,
        })),
        (140, Record::ClassSkip(ClassSkipContentRecord {
            id: Id(101),
            superclass_id: Id(100),
            instance_size: 16,
            record_size: 24,
            has_ref_fields: true,
        })),
        (160, Record::ClassSkip(ClassSkipContentRecord {
            id: Id(102),
            superclass_id: Id(100),
            instance_size: 4,
            record_size: 12,
            has_ref_fields: false,
        })),
        (180, Record::InstanceSkip(InstanceSkipContentRecord {
            id: Id(200),
            class_id: Id(101),
            record_size: 24,
        })),
        (200, Record::ObjectArraySkip(ObjectArraySkipContentRecord {
            id: Id(300),
            array_class_id: Id(103),
            record_size: 40,
        })),
        (220, Record::PrimitiveArraySkip(PrimitiveArraySkipContentRecord {
            id: Id(400),
            primitive_type: PrimitiveType::Int,
            record_size: 64,
        })),
        (240, Record::GcRoot(GcRootRecord { id: Id(0), kind: RootKind::JniGlobal })),
        (241, Record::GcRoot(GcRootRecord { id: Id(200), kind: RootKind::JniGlobal })),
        (242, Record::GcRoot(GcRootRecord { id: Id(300), kind: RootKind::ThreadBlock })),
        (243, Record::GcRoot(GcRootRecord { id: Id(400), kind: RootKind::StickyClass })),
    ];
    FixtureSource { records, total_bytes_read: 260 }
}

#[test]
fn full_pipeline_builds_a_queryable_index() {
    let _ = env_logger::try_init();
    let mut source = build_fixture();
    let options = IndexBuilderOptions::new(DumpHeader {
        identifier_byte_size: IdentifierByteSize::Eight,
        platform: Platform::Jvm,
    })
    .with_root_kinds(RootKindSet::JNI_GLOBAL | RootKindSet::STICKY_CLASS);

    let index = build_index(&mut source, options).unwrap();

    assert_eq!(index.class_count(), 3);
    assert_eq!(index.instance_count(), 1);
    assert_eq!(index.object_array_count(), 1);
    assert_eq!(index.primitive_array_count(), 1);

    assert_eq!(index.class_name(Id(100)).unwrap(), "java.lang.Object");
    assert_eq!(index.class_name(Id(101)).unwrap(), "com.example.Widget");
    assert_eq!(index.class_id("com.example.Widget"), Some(Id(101)));

    let wrappers: Vec<Id> = index.primitive_wrapper_types().iter().collect();
    assert_eq!(wrappers, vec![Id(102)]);

    // Only JNI_GLOBAL and STICKY_CLASS roots survive, in stream order, and
    // the null-identifier root is always dropped regardless of selection.
    let roots: Vec<(Id, RootKind)> = index.gc_roots().iter().map(|r| (r.id, r.kind)).collect();
    assert_eq!(roots, vec![(Id(200), RootKind::JniGlobal), (Id(400), RootKind::StickyClass)]);

    let (_, instance_entry) = index.indexed_object_or_null(Id(200)).unwrap();
    assert_eq!(
        instance_entry,
        ObjectEntry::Instance { position: 180, class_id: Id(101), record_size: 24 }
    );

    // Bijection between indexed_object_or_null and object_at_index across
    // every indexed id.
    for id in [Id(100), Id(101), Id(102), Id(200), Id(300), Id(400)] {
        let (slot, entry) = index.indexed_object_or_null(id).unwrap();
        assert_eq!(index.object_at_index(slot).unwrap(), (id, entry));
    }

    // indexed_object_sequence is the four per-kind sequences concatenated in
    // kind order, each ascending by identifier.
    let all_ids: Vec<u64> = index.indexed_object_sequence().map(|(id, _)| id.0).collect();
    assert_eq!(all_ids, vec![100, 101, 102, 200, 300, 400]);

    assert!(index.object_id_is_indexed(Id(300)));
    assert!(!index.object_id_is_indexed(Id(0xDEAD)));
    assert!(index.indexed_object_or_null(Id(0xDEAD)).is_none());

    let total = index.class_count() + index.instance_count() + index.object_array_count() + index.primitive_array_count();
    assert!(index.object_at_index(total).is_err());
}

#[test]
fn empty_dump_round_trips_cleanly() {
    let _ = env_logger::try_init();
    let mut source = FixtureSource { records: vec![], total_bytes_read: 0 };
    let options = IndexBuilderOptions::new(DumpHeader {
        identifier_byte_size: IdentifierByteSize::Four,
        platform: Platform::Android,
    });
    let index = build_index(&mut source, options).unwrap();

    assert_eq!(index.class_count(), 0);
    assert_eq!(index.instance_count(), 0);
    assert_eq!(index.object_array_count(), 0);
    assert_eq!(index.primitive_array_count(), 0);
    assert!(index.gc_roots().is_empty());
    assert!(index.class_id("anything").is_none());
}
