//! Open-addressed containers keyed by a 64-bit object identifier.
//!
//! A generic `HashMap<u64, V>` boxes its keys and pays a hash-and-probe cost
//! tuned for arbitrary key distributions; at tens of millions of entries
//! that overhead dominates. These tables store the key inline, use `0` (the
//! null reference) as the empty-slot sentinel, and resize by doubling at
//! a 0.75 load factor — linear probing keeps the implementation small and
//! cache-friendly for the mostly-random identifiers a dump produces.

use crate::ids::Id;

const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;

fn probe_start(hash: u64, capacity: usize) -> usize {
    (hash as usize) & (capacity - 1)
}

fn mix(key: u64) -> u64 {
    // A cheap avalanching mix (splitmix64 finalizer) so that sequential ids
    // don't all land in the same probe neighborhood.
    let mut z = key.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn next_capacity(min_capacity: usize) -> usize {
    let mut cap = 16usize;
    while cap < min_capacity {
        cap *= 2;
    }
    cap
}

/// An open-addressed `Id -> Id` map: class-name table, id remappings, and
/// any other densely-packed identifier-to-identifier relation.
#[derive(Clone, Debug)]
pub struct IdIdMap {
    keys: Vec<u64>,
    values: Vec<u64>,
    len: usize,
}

impl IdIdMap {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(expected_len: usize) -> Self {
        let cap = next_capacity((expected_len * LOAD_FACTOR_DEN) / LOAD_FACTOR_NUM.max(1) + 1);
        Self {
            keys: vec![0u64; cap],
            values: vec![0u64; cap],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn grow_if_needed(&mut self) {
        if self.len * LOAD_FACTOR_DEN >= self.keys.len() * LOAD_FACTOR_NUM {
            let mut grown = Self::with_capacity((self.keys.len() * 2 * LOAD_FACTOR_NUM) / LOAD_FACTOR_DEN);
            for (k, v) in self.keys.iter().zip(self.values.iter()) {
                if *k != 0 {
                    grown.put(Id(*k), Id(*v));
                }
            }
            *self = grown;
        }
    }

    /// Inserts `key -> value`, replacing any existing value for `key`.
    /// `key` must not be [`Id::NULL`] (reserved as the empty-slot sentinel).
    pub fn put(&mut self, key: Id, value: Id) {
        debug_assert!(!key.is_null(), "Id 0 is reserved as the empty-slot sentinel");
        self.grow_if_needed();
        let cap = self.keys.len();
        let mut slot = probe_start(mix(key.0), cap);
        loop {
            if self.keys[slot] == 0 || self.keys[slot] == key.0 {
                if self.keys[slot] == 0 {
                    self.len += 1;
                }
                self.keys[slot] = key.0;
                self.values[slot] = value.0;
                return;
            }
            slot = (slot + 1) & (cap - 1);
        }
    }

    pub fn get(&self, key: Id) -> Option<Id> {
        if key.is_null() || self.keys.is_empty() {
            return None;
        }
        let cap = self.keys.len();
        let mut slot = probe_start(mix(key.0), cap);
        for _ in 0..cap {
            if self.keys[slot] == 0 {
                return None;
            }
            if self.keys[slot] == key.0 {
                return Some(Id(self.values[slot]));
            }
            slot = (slot + 1) & (cap - 1);
        }
        None
    }

    pub fn contains(&self, key: Id) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Id)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter(|(k, _)| **k != 0)
            .map(|(&k, &v)| (Id(k), Id(v)))
    }
}

impl Default for IdIdMap {
    fn default() -> Self {
        Self::new()
    }
}

/// An open-addressed `Id -> V` map for values too large to inline, namely
/// the string table (`Id -> Vec<u8>`).
#[derive(Clone, Debug)]
pub struct IdMap<V> {
    keys: Vec<u64>,
    values: Vec<Option<V>>,
    len: usize,
}

impl<V> IdMap<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(expected_len: usize) -> Self {
        let cap = next_capacity((expected_len * LOAD_FACTOR_DEN) / LOAD_FACTOR_NUM.max(1) + 1);
        let mut values = Vec::with_capacity(cap);
        values.resize_with(cap, || None);
        Self {
            keys: vec![0u64; cap],
            values,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn grow_if_needed(&mut self) {
        if self.len * LOAD_FACTOR_DEN >= self.keys.len() * LOAD_FACTOR_NUM {
            let new_cap = next_capacity((self.keys.len() * 2 * LOAD_FACTOR_NUM) / LOAD_FACTOR_DEN);
            let old_keys = std::mem::replace(&mut self.keys, vec![0u64; new_cap]);
            let mut old_values = Vec::with_capacity(new_cap);
            old_values.resize_with(new_cap, || None);
            let old_values = std::mem::replace(&mut self.values, old_values);
            self.len = 0;

            for (k, v) in old_keys.into_iter().zip(old_values.into_iter()) {
                if k != 0 {
                    self.put(Id(k), v.unwrap());
                }
            }
        }
    }

    pub fn put(&mut self, key: Id, value: V) {
        debug_assert!(!key.is_null(), "Id 0 is reserved as the empty-slot sentinel");
        self.grow_if_needed();
        let cap = self.keys.len();
        let mut slot = probe_start(mix(key.0), cap);
        loop {
            if self.keys[slot] == 0 || self.keys[slot] == key.0 {
                if self.keys[slot] == 0 {
                    self.len += 1;
                }
                self.keys[slot] = key.0;
                self.values[slot] = Some(value);
                return;
            }
            slot = (slot + 1) & (cap - 1);
        }
    }

    pub fn get(&self, key: Id) -> Option<&V> {
        if key.is_null() || self.keys.is_empty() {
            return None;
        }
        let cap = self.keys.len();
        let mut slot = probe_start(mix(key.0), cap);
        for _ in 0..cap {
            if self.keys[slot] == 0 {
                return None;
            }
            if self.keys[slot] == key.0 {
                return self.values[slot].as_ref();
            }
            slot = (slot + 1) & (cap - 1);
        }
        None
    }

    pub fn contains(&self, key: Id) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &V)> {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter(|(k, _)| **k != 0)
            .map(|(&k, v)| (Id(k), v.as_ref().unwrap()))
    }
}

impl<V> Default for IdMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An open-addressed set of identifiers: the primitive-wrapper class set.
#[derive(Clone, Debug)]
pub struct IdSet {
    inner: IdIdMap,
}

impl IdSet {
    pub fn new() -> Self {
        Self { inner: IdIdMap::new() }
    }

    pub fn with_capacity(expected_len: usize) -> Self {
        Self { inner: IdIdMap::with_capacity(expected_len) }
    }

    pub fn insert(&mut self, id: Id) {
        self.inner.put(id, Id(1));
    }

    pub fn contains(&self, id: Id) -> bool {
        self.inner.contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.inner.iter().map(|(k, _)| k)
    }
}

impl Default for IdSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl Eq for IdSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_id_map_put_get_replace() {
        let mut map = IdIdMap::new();
        map.put(Id(10), Id(100));
        map.put(Id(20), Id(200));
        assert_eq!(map.get(Id(10)), Some(Id(100)));
        assert_eq!(map.get(Id(20)), Some(Id(200)));
        assert_eq!(map.get(Id(30)), None);

        map.put(Id(10), Id(999));
        assert_eq!(map.get(Id(10)), Some(Id(999)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn id_id_map_grows_past_many_entries() {
        let mut map = IdIdMap::new();
        for i in 1..2000u64 {
            map.put(Id(i), Id(i * 2));
        }
        for i in 1..2000u64 {
            assert_eq!(map.get(Id(i)), Some(Id(i * 2)));
        }
        assert_eq!(map.len(), 1999);
    }

    #[test]
    fn id_map_stores_owned_values() {
        let mut map: IdMap<Vec<u8>> = IdMap::new();
        map.put(Id(1), b"java.lang.Object".to_vec());
        assert_eq!(map.get(Id(1)).unwrap().as_slice(), b"java.lang.Object");
        assert!(map.get(Id(2)).is_none());
    }

    #[test]
    fn id_set_membership() {
        let mut set = IdSet::new();
        set.insert(Id(5));
        set.insert(Id(7));
        assert!(set.contains(Id(5)));
        assert!(!set.contains(Id(6)));
        assert_eq!(set.len(), 2);
    }
}
