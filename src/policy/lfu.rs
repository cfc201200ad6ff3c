//! # LFU (Least Frequently Used) engine
//!
//! Evicts the entry with the lowest access count. Among entries sharing the
//! lowest count, the one touched least recently goes first, so recency is the
//! tie-break within a frequency.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                            LfuEngine<K, V>                               │
//!   │                                                                          │
//!   │   index: FxHashMap<K, SlotId>     slots: LinkedSlots<Entry<K, V>>        │
//!   │                                   (key, value, freq per node)            │
//!   │                                                                          │
//!   │   buckets: FxHashMap<u64, Chain>  (frequency → sentinel-bounded chain)   │
//!   │                                                                          │
//!   │   min_freq = Some(1)                                                     │
//!   │       │                                                                  │
//!   │       ▼                                                                  │
//!   │   freq=1: [head] ◄──► [k2] ◄──► [k3] ◄──► [tail]                         │
//!   │                       victim     newest                                  │
//!   │   freq=2: [head] ◄──► [k1] ◄──► [tail]                                   │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Promotion Flow
//!
//! ```text
//!   get(k1) with freq(k1) = f
//!     1. unlink k1 from bucket f
//!     2. bucket f empty → drop it; if f was min_freq, min_freq = f + 1
//!     3. freq(k1) = f + 1
//!     4. link k1 at the tail of bucket f + 1 (created if absent)
//! ```
//!
//! ## Eviction Flow
//!
//! ```text
//!   put(new) at capacity
//!     1. victim = front of bucket min_freq (oldest at the lowest frequency)
//!     2. free the victim node, drop its key from the index
//!     3. bucket empty → drop it
//!     4. insert new at the tail of bucket 1, min_freq = 1
//! ```
//!
//! `min_freq` is only ever changed at step 2 of promotion and step 4 of
//! eviction; it is never recomputed by scanning buckets.
//!
//! ## Example
//!
//! ```
//! use cachetrace::event::{Event, Promotion};
//! use cachetrace::policy::lfu::LfuEngine;
//! use cachetrace::traits::CacheEngine;
//!
//! let mut lfu = LfuEngine::new(2).unwrap();
//! lfu.put(1, 1);
//! lfu.put(2, 2);
//!
//! let (value, trace) = lfu.get(&1);
//! assert_eq!(value, Some(1));
//! assert_eq!(
//!     trace.events()[1],
//!     Event::Promote { key: 1, promotion: Promotion::Frequency { from: 1, to: 2 } }
//! );
//!
//! // Key 2 has the lower frequency, so it goes.
//! assert_eq!(lfu.put(3, 3).evicted(), Some(&2));
//! assert_eq!(lfu.frequency(&1), Some(2));
//! assert_eq!(lfu.min_frequency(), Some(1));
//! ```

use std::collections::hash_map::Entry as MapEntry;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::builder::Policy;
use crate::ds::{Chain, LinkedSlots, SlotId};
use crate::error::{ConfigError, InvariantError, ensure_invariant};
use crate::event::{Event, Position, Promotion, Trace};
use crate::policy::lru::MAX_PREALLOC;
use crate::snapshot::{FrequencyGroup, LfuSnapshot};
use crate::traits::CacheEngine;

/// Default bucket map pre-allocation. Most entries sit at low frequencies.
pub const DEFAULT_BUCKET_HINT: usize = 32;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
}

/// Traced LFU cache with LRU tie-breaking inside a frequency.
#[derive(Debug)]
pub struct LfuEngine<K, V> {
    index: FxHashMap<K, SlotId>,
    slots: LinkedSlots<Entry<K, V>>,
    buckets: FxHashMap<u64, Chain>,
    min_freq: Option<u64>,
    capacity: usize,
}

impl<K, V> LfuEngine<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an engine holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_bucket_hint(capacity, DEFAULT_BUCKET_HINT)
    }

    /// Like [`new`](Self::new), reserving room for `bucket_hint` distinct
    /// frequencies.
    pub fn with_bucket_hint(capacity: usize, bucket_hint: usize) -> Result<Self, ConfigError> {
        let capacity = ConfigError::check_capacity(capacity)?;
        let prealloc = capacity.min(MAX_PREALLOC);
        let bucket_hint = bucket_hint.min(MAX_PREALLOC);
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            slots: LinkedSlots::with_capacity(prealloc + 2 * bucket_hint),
            buckets: FxHashMap::with_capacity_and_hasher(bucket_hint, Default::default()),
            min_freq: None,
            capacity,
        })
    }

    /// Access count of `key` since its most recent insertion.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.slots.get(id).map(|entry| entry.freq)
    }

    /// Lowest frequency with a resident entry; `None` when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        self.min_freq
    }

    /// Number of non-empty frequency buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Keys at `freq`, least to most recently touched.
    pub fn bucket_keys(&self, freq: u64) -> Vec<&K> {
        self.buckets
            .get(&freq)
            .map(|chain| {
                self.slots
                    .iter(chain)
                    .map(|(_, entry)| &entry.key)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Owned copy of the current state, buckets in ascending frequency.
    ///
    /// Sorting the bucket keys makes this O(n + b log b); it is meant for
    /// renderers, not the hot path.
    pub fn snapshot(&self) -> LfuSnapshot<K, V> {
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();
        let groups = freqs
            .into_iter()
            .filter_map(|freq| {
                let chain = self.buckets.get(&freq)?;
                Some(FrequencyGroup {
                    frequency: freq,
                    entries: self
                        .slots
                        .iter(chain)
                        .map(|(_, entry)| (entry.key.clone(), entry.value.clone()))
                        .collect(),
                })
            })
            .collect();
        LfuSnapshot {
            capacity: self.capacity,
            min_frequency: self.min_freq,
            groups,
        }
    }

    /// Verifies index, buckets, node frequencies and `min_freq` agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.index.len();
        ensure_invariant!(
            len <= self.capacity,
            "len {} exceeds capacity {}",
            len,
            self.capacity
        );
        ensure_invariant!(
            len == self.slots.len(),
            "index holds {} keys but {} nodes are live",
            len,
            self.slots.len()
        );

        if len == 0 {
            ensure_invariant!(self.min_freq.is_none(), "empty engine has a min_freq");
            ensure_invariant!(self.buckets.is_empty(), "empty engine has buckets");
            return Ok(());
        }

        let lowest = self.buckets.keys().min().copied();
        ensure_invariant!(
            self.min_freq.is_some() && self.min_freq == lowest,
            "min_freq {:?} but lowest bucket is {:?}",
            self.min_freq,
            lowest
        );

        let mut counted = 0usize;
        for (&freq, chain) in &self.buckets {
            ensure_invariant!(freq >= 1, "bucket for frequency 0");
            ensure_invariant!(!chain.is_empty(), "bucket {} is empty", freq);
            self.slots.check_chain(chain)?;
            for (id, entry) in self.slots.iter(chain) {
                ensure_invariant!(
                    entry.freq == freq,
                    "node {} has freq {} but sits in bucket {}",
                    id.index(),
                    entry.freq,
                    freq
                );
                ensure_invariant!(
                    self.index.get(&entry.key) == Some(&id),
                    "node {} is not indexed under its key",
                    id.index()
                );
            }
            counted += chain.len();
        }
        ensure_invariant!(
            counted == len,
            "buckets hold {} nodes but {} keys are indexed",
            counted,
            len
        );
        Ok(())
    }

    /// Returns the chain for `freq`, opening it if absent.
    fn bucket<'a>(
        buckets: &'a mut FxHashMap<u64, Chain>,
        slots: &mut LinkedSlots<Entry<K, V>>,
        freq: u64,
    ) -> &'a mut Chain {
        match buckets.entry(freq) {
            MapEntry::Occupied(occupied) => occupied.into_mut(),
            MapEntry::Vacant(vacant) => {
                debug!(freq, "opening frequency bucket");
                vacant.insert(slots.open_chain())
            },
        }
    }

    /// Closes the bucket at `freq` if it has no nodes left. Returns `true`
    /// when the bucket was dropped.
    fn drop_bucket_if_empty(&mut self, freq: u64) -> bool {
        let Some(chain) = self.buckets.get(&freq).copied() else {
            return false;
        };
        if !chain.is_empty() {
            return false;
        }
        self.buckets.remove(&freq);
        self.slots.close_chain(chain);
        debug!(freq, "dropped empty frequency bucket");
        true
    }

    fn promote(&mut self, id: SlotId, key: &K, trace: &mut Trace<K, V>) {
        let Some(from) = self.slots.get(id).map(|entry| entry.freq) else {
            return;
        };
        let to = from.saturating_add(1);

        if let Some(chain) = self.buckets.get_mut(&from) {
            self.slots.unlink(chain, id);
        }
        if self.drop_bucket_if_empty(from) && self.min_freq == Some(from) {
            self.min_freq = Some(to);
        }

        if let Some(entry) = self.slots.get_mut(id) {
            entry.freq = to;
        }
        let chain = Self::bucket(&mut self.buckets, &mut self.slots, to);
        self.slots.link_back(chain, id);

        trace!(from, to, min_freq = ?self.min_freq, "promoted");
        trace.push(Event::Promote {
            key: key.clone(),
            promotion: Promotion::Frequency { from, to },
        });
    }

    fn evict_lfu(&mut self, trace: &mut Trace<K, V>) {
        let Some(min) = self.min_freq else {
            return;
        };
        let Some(chain) = self.buckets.get_mut(&min) else {
            return;
        };
        let Some(victim) = self.slots.front(chain) else {
            return;
        };
        let Some(entry) = self.slots.remove(chain, victim) else {
            return;
        };
        self.index.remove(&entry.key);
        if self.drop_bucket_if_empty(min) {
            // The insertion that follows resets min_freq to 1.
            self.min_freq = None;
        }
        debug!(
            capacity = self.capacity,
            freq = entry.freq,
            "evicted least frequently used entry"
        );
        trace.push(Event::Evict {
            key: entry.key,
            value: entry.value,
        });
    }
}

impl<K, V> CacheEngine<K, V> for LfuEngine<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> (Option<V>, Trace<K, V>) {
        let mut trace = Trace::new();
        let Some(&id) = self.index.get(key) else {
            trace!(len = self.index.len(), "get miss");
            trace.push(Event::Miss { key: key.clone() });
            return (None, trace);
        };

        trace.push(Event::Hit { key: key.clone() });
        self.promote(id, key, &mut trace);

        let value = self.slots.get(id).map(|entry| entry.value.clone());
        (value, trace)
    }

    fn put(&mut self, key: K, value: V) -> Trace<K, V> {
        let mut trace = Trace::new();

        if let Some(&id) = self.index.get(&key)
            && let Some(entry) = self.slots.get_mut(id)
        {
            let old = std::mem::replace(&mut entry.value, value.clone());
            trace.push(Event::Update {
                key: key.clone(),
                old,
                new: value,
            });
            self.promote(id, &key, &mut trace);
            return trace;
        }

        if self.index.len() >= self.capacity {
            self.evict_lfu(&mut trace);
        }

        let chain = Self::bucket(&mut self.buckets, &mut self.slots, 1);
        let id = self.slots.push_back(
            chain,
            Entry {
                key: key.clone(),
                value,
                freq: 1,
            },
        );
        self.index.insert(key.clone(), id);
        self.min_freq = Some(1);
        trace!(len = self.index.len(), slot = id.index(), "put insert");
        trace.push(Event::Insert {
            key,
            at: Position::Frequency(1),
        });
        trace
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.slots.get(id).map(|entry| &entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn victim(&self) -> Option<&K> {
        let chain = self.buckets.get(&self.min_freq?)?;
        let id = self.slots.front(chain)?;
        self.slots.get(id).map(|entry| &entry.key)
    }

    fn clear(&mut self) {
        debug!(len = self.index.len(), buckets = self.buckets.len(), "clearing lfu engine");
        self.index.clear();
        self.slots.clear();
        self.buckets.clear();
        self.min_freq = None;
    }

    fn policy(&self) -> Policy {
        Policy::Lfu
    }
}
