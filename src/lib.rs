//! In-memory index builder for heap-dump analysis.
//!
//! Consumes a streamed sequence of heap-dump records and produces a
//! compact, queryable, read-only index that supports random lookup of
//! objects by identifier without retaining the full dump in memory. See
//! [`indexer::build_index`] for the entry point and [`index::HeapIndex`] for
//! the finished façade.
//!
//! Out of scope: the streaming parser that emits records, the on-disk dump
//! format itself, and higher-level graph analyses (dominator trees,
//! retained size, leak detection) — this crate only builds and serves the
//! index those analyses would run against.

pub mod config;
pub mod error;
pub mod ids;
pub mod index;
pub mod indexer;
pub mod io;
pub mod maps;
pub mod records;
pub mod remap;
pub mod store;
pub mod width;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::IndexBuilderOptions;
pub use error::{HeapIndexError, HeapIndexResult, InvariantViolation};
pub use ids::Id;
pub use index::{HeapIndex, ObjectEntry};
pub use indexer::build_index;
pub use records::{
    ClassSkipContentRecord, DumpHeader, GcRootRecord, IdentifierByteSize,
    InstanceSkipContentRecord, LoadClassRecord, ObjectArraySkipContentRecord, Platform,
    PrimitiveArraySkipContentRecord, PrimitiveType, Record, RecordKindSet, RecordSource,
    RootKind, RootKindSet, StringRecord,
};
pub use remap::{IdentityRemapper, NameRemapper};
