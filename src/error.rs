use std::fmt;

pub type HeapIndexResult<T> = std::result::Result<T, HeapIndexError>;

/// Errors the index builder and the finished façade can report.
///
/// `NotFound` is deliberately absent here: per-identifier lookup misses are an
/// expected, recoverable outcome and are always returned as `Option`, never as
/// this enum. Only invariant violations and upstream I/O failures propagate as
/// errors.
#[derive(Debug)]
pub enum HeapIndexError {
    /// A referenced string/slot is missing, or a caller passed an out-of-range
    /// dense slot. These are bugs in the record producer or the caller.
    Invariant(InvariantViolation),
    /// Propagated unchanged from the streaming record source.
    Upstream(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug)]
pub enum InvariantViolation {
    /// `className`/`fieldName` referenced a string id absent from the string table.
    MissingString { string_id: u64 },
    /// The class-name table pointed a class id at a string id with no entry.
    MissingClassNameString { class_id: u64, string_id: u64 },
    /// `objectAtIndex` was called with a slot outside `[0, total)`.
    DenseSlotOutOfRange { slot: usize, len: usize },
    /// A class id was referenced that is not present in the class store.
    MissingClass { class_id: u64 },
}

impl fmt::Display for HeapIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invariant(v) => write!(f, "heap index invariant violated: {v}"),
            Self::Upstream(e) => write!(f, "record source error: {e}"),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingString { string_id } => {
                write!(f, "string id {string_id:#x} has no entry in the string table")
            }
            Self::MissingClassNameString { class_id, string_id } => write!(
                f,
                "class id {class_id:#x} names string id {string_id:#x}, which is missing"
            ),
            Self::DenseSlotOutOfRange { slot, len } => {
                write!(f, "dense slot {slot} is out of range for {len} indexed objects")
            }
            Self::MissingClass { class_id } => {
                write!(f, "class id {class_id:#x} is not present in the class store")
            }
        }
    }
}

impl std::error::Error for HeapIndexError {}

impl From<InvariantViolation> for HeapIndexError {
    fn from(v: InvariantViolation) -> Self {
        Self::Invariant(v)
    }
}
