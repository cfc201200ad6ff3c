//! Owned, read-only views of engine state.
//!
//! Renderers draw from snapshots instead of borrowing the engine, so a frame
//! can be kept around while the engine moves on.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// LRU state: entries from least to most recently used.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LruSnapshot<K, V> {
    pub capacity: usize,
    pub entries: Vec<(K, V)>,
}

impl<K, V> LruSnapshot<K, V> {
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }
}

/// One LFU frequency bucket, entries from least to most recently touched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencyGroup<K, V> {
    pub frequency: u64,
    pub entries: Vec<(K, V)>,
}

/// LFU state: non-empty buckets in ascending frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LfuSnapshot<K, V> {
    pub capacity: usize,
    pub min_frequency: Option<u64>,
    pub groups: Vec<FrequencyGroup<K, V>>,
}

impl<K, V> LfuSnapshot<K, V> {
    /// Resident entry count.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keys in eviction order: lowest frequency first, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter().map(|(key, _)| key))
    }
}

/// Snapshot of either engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Snapshot<K, V> {
    Lru(LruSnapshot<K, V>),
    Lfu(LfuSnapshot<K, V>),
}

fn write_keys<'a, K: fmt::Display + 'a>(
    f: &mut fmt::Formatter<'_>,
    keys: impl Iterator<Item = &'a K>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, key) in keys.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{key}")?;
    }
    f.write_str("]")
}

impl<K: fmt::Display, V> fmt::Display for LruSnapshot<K, V> {
    /// `LRU [1 2 3] MRU`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LRU ")?;
        write_keys(f, self.keys())?;
        f.write_str(" MRU")
    }
}

impl<K: fmt::Display, V> fmt::Display for LfuSnapshot<K, V> {
    /// `f1 [2 3] | f2 [1]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return f.write_str("(empty)");
        }
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "f{} ", group.frequency)?;
            write_keys(f, group.entries.iter().map(|(key, _)| key))?;
        }
        Ok(())
    }
}

impl<K: fmt::Display, V> fmt::Display for Snapshot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Lru(snapshot) => snapshot.fmt(f),
            Snapshot::Lfu(snapshot) => snapshot.fmt(f),
        }
    }
}
