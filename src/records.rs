//! The tagged union of records the streaming parser hands to the builder,
//! and the trait the builder uses to pull them. Both passes match the same
//! seven-variant enum; which variants reach `on_record` is controlled by the
//! `RecordKindSet` passed to [`RecordSource::read_records`].

use crate::ids::Id;
use num_enum::TryFromPrimitive;

/// One of the eight JVM boxed-primitive scalar kinds carried by a primitive
/// array. Ordinal values match the conventional HPROF primitive-type tags.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum PrimitiveType {
    Boolean = 4,
    Char = 5,
    Float = 6,
    Double = 7,
    Byte = 8,
    Short = 9,
    Int = 10,
    Long = 11,
}

/// The discriminator carried by a GC root record, used to filter
/// `gcRoots()` down to the kinds a caller asked for.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootKind {
    Unknown = 0,
    JniGlobal = 1,
    JniLocal = 2,
    JavaFrame = 3,
    NativeStack = 4,
    StickyClass = 5,
    ThreadBlock = 6,
    MonitorUsed = 7,
    ThreadObject = 8,
}

bitflags::bitflags! {
    /// The caller-selected set of root kinds to retain in `gcRoots()`.
    pub struct RootKindSet: u16 {
        const UNKNOWN = 1 << RootKind::Unknown as u16;
        const JNI_GLOBAL = 1 << RootKind::JniGlobal as u16;
        const JNI_LOCAL = 1 << RootKind::JniLocal as u16;
        const JAVA_FRAME = 1 << RootKind::JavaFrame as u16;
        const NATIVE_STACK = 1 << RootKind::NativeStack as u16;
        const STICKY_CLASS = 1 << RootKind::StickyClass as u16;
        const THREAD_BLOCK = 1 << RootKind::ThreadBlock as u16;
        const MONITOR_USED = 1 << RootKind::MonitorUsed as u16;
        const THREAD_OBJECT = 1 << RootKind::ThreadObject as u16;
        const ALL = Self::UNKNOWN.bits | Self::JNI_GLOBAL.bits | Self::JNI_LOCAL.bits
            | Self::JAVA_FRAME.bits | Self::NATIVE_STACK.bits | Self::STICKY_CLASS.bits
            | Self::THREAD_BLOCK.bits | Self::MONITOR_USED.bits | Self::THREAD_OBJECT.bits;
    }
}

impl RootKindSet {
    pub fn contains_kind(self, kind: RootKind) -> bool {
        self.bits & (1 << kind as u16) != 0
    }
}

bitflags::bitflags! {
    /// Which record variants a `read_records` call should deliver.
    ///
    /// The width-selection pass only asks for `SKIP_CONTENT`; the indexing
    /// pass asks for everything.
    pub struct RecordKindSet: u8 {
        const STRING = 0x01;
        const LOAD_CLASS = 0x02;
        const ROOT = 0x04;
        const CLASS_SKIP = 0x08;
        const INSTANCE_SKIP = 0x10;
        const OBJECT_ARRAY_SKIP = 0x20;
        const PRIMITIVE_ARRAY_SKIP = 0x40;
        const SKIP_CONTENT = Self::CLASS_SKIP.bits | Self::INSTANCE_SKIP.bits
            | Self::OBJECT_ARRAY_SKIP.bits | Self::PRIMITIVE_ARRAY_SKIP.bits;
        const ALL = Self::STRING.bits | Self::LOAD_CLASS.bits | Self::ROOT.bits
            | Self::SKIP_CONTENT.bits;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringRecord {
    pub id: Id,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadClassRecord {
    pub id: Id,
    pub class_name_string_id: Id,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GcRootRecord {
    pub id: Id,
    pub kind: RootKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassSkipContentRecord {
    pub id: Id,
    pub superclass_id: Id,
    pub instance_size: u32,
    pub record_size: u64,
    pub has_ref_fields: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceSkipContentRecord {
    pub id: Id,
    pub class_id: Id,
    pub record_size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectArraySkipContentRecord {
    pub id: Id,
    pub array_class_id: Id,
    pub record_size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveArraySkipContentRecord {
    pub id: Id,
    pub primitive_type: PrimitiveType,
    pub record_size: u64,
}

/// A single record out of the seven kinds the builder understands. The two
/// passes each match this exhaustively rather than dispatching virtually —
/// there is no open set of record kinds to support.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    String(StringRecord),
    LoadClass(LoadClassRecord),
    GcRoot(GcRootRecord),
    ClassSkip(ClassSkipContentRecord),
    InstanceSkip(InstanceSkipContentRecord),
    ObjectArraySkip(ObjectArraySkipContentRecord),
    PrimitiveArraySkip(PrimitiveArraySkipContentRecord),
}

/// The dump header fields the builder needs from its caller: the on-disk
/// identifier width and the package-separator convention in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DumpHeader {
    pub identifier_byte_size: IdentifierByteSize,
    pub platform: Platform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierByteSize {
    Four,
    Eight,
}

/// Selects the package-separator rewriting `className` applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Standard JVM dumps store class names with `/` as the package
    /// separator; `className` rewrites it to `.`.
    Jvm,
    /// ART/Android dumps already use `.`; no rewriting is applied.
    Android,
}

/// External collaborator: the streaming parser that walks the dump file and
/// hands matching records to the builder. Implementations may be invoked
/// more than once over the same dump — each call starts again from the
/// beginning — which is exactly what the two-pass builder needs.
pub trait RecordSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Streams every record whose kind is in `requested_kinds` to
    /// `on_record` as `(file_position, record)`, in stream order. Returns
    /// the total number of bytes read once the stream is exhausted.
    fn read_records(
        &mut self,
        requested_kinds: RecordKindSet,
        on_record: &mut dyn FnMut(u64, Record),
    ) -> Result<u64, Self::Error>;
}
