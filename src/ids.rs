/// A 64-bit object, string, or class identifier from the dump.
///
/// Dumps with a 4-byte identifier size still widen ids to `u64` once in
/// memory; the narrower on-disk width only affects how many bytes a row
/// reader/writer spends on a given field (see [`crate::width::Widths`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u64);

impl Id {
    /// The null/absent reference. Roots and class/superclass references use
    /// this to mean "no object".
    pub const NULL: Id = Id(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl From<u64> for Id {
    fn from(v: u64) -> Self {
        Id(v)
    }
}

impl From<Id> for u64 {
    fn from(id: Id) -> Self {
        id.0
    }
}
