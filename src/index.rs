use crate::core::{Bytes, KeyRef, Offset};
use contracts::*;
use std::collections::BTreeMap;

/// In-memory map from key to the byte offset of that key's latest
/// record in the log.
///
/// The index is a cache, not a source of truth: the log remains
/// authoritative and the index only accelerates point lookups. It is
/// created empty, populated eagerly on every append and lazily on scan
/// hits, and rebuilt wholesale by reindexing or compaction.
#[derive(Debug, Default)]
pub(crate) struct Index {
    map: BTreeMap<Bytes, Offset>,
}

impl Index {
    pub fn new() -> Index {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn lookup(&self, key: KeyRef) -> Option<Offset> {
        trace!("Index::lookup");
        self.map.get(key).copied()
    }

    /// Records `offset` as the latest location for `key`, overwriting
    /// any prior entry.
    pub fn set(&mut self, key: Bytes, offset: Offset) {
        trace!("Index::set");
        self.map.insert(key, offset);
    }

    #[debug_ensures(self.map.is_empty(), "index not emptied")]
    pub fn clear(&mut self) {
        trace!("Index::clear");
        self.map.clear();
    }

    #[allow(unused)]
    pub fn entries(&self) -> impl Iterator<Item = (&Bytes, &Offset)> {
        self.map.iter()
    }

    #[allow(unused)]
    pub fn contains(&self, key: KeyRef) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}
