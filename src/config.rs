//! Builder construction parameters. There is no file- or environment-based
//! configuration in this crate; callers construct an `IndexBuilderOptions`
//! once from the dump header and pass it straight to `build_index`.

use crate::records::{DumpHeader, IdentifierByteSize, Platform, RootKindSet};
use crate::remap::{IdentityRemapper, NameRemapper};
use std::sync::Arc;

/// Everything the builder needs from the dump header and the caller before
/// it can run its two passes.
pub struct IndexBuilderOptions {
    pub identifier_byte_size: IdentifierByteSize,
    pub platform: Platform,
    /// Root kinds to retain in `gcRoots()`; all others are dropped during
    /// the indexing pass.
    pub root_kinds: RootKindSet,
    pub remapper: Arc<dyn NameRemapper>,
}

impl IndexBuilderOptions {
    pub fn new(header: DumpHeader) -> Self {
        Self {
            identifier_byte_size: header.identifier_byte_size,
            platform: header.platform,
            root_kinds: RootKindSet::ALL,
            remapper: Arc::new(IdentityRemapper),
        }
    }

    pub fn with_root_kinds(mut self, root_kinds: RootKindSet) -> Self {
        self.root_kinds = root_kinds;
        self
    }

    pub fn with_remapper(mut self, remapper: Arc<dyn NameRemapper>) -> Self {
        self.remapper = remapper;
        self
    }

    pub(crate) fn id_width(&self) -> u8 {
        match self.identifier_byte_size {
            IdentifierByteSize::Four => 4,
            IdentifierByteSize::Eight => 8,
        }
    }
}
