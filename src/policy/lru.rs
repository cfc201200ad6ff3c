//! # LRU (Least Recently Used) engine
//!
//! Evicts the entry whose last `get`/`put` is oldest. Every access updates a
//! single global recency order, so there is always exactly one candidate and
//! no tie-break rule is needed.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruEngine<K, V>                             │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>        slots: LinkedSlots<Entry<K, V>> │
//!   │   ┌─────────┬────────┐                                               │
//!   │   │  key 1  │  id_2  │──┐                                            │
//!   │   │  key 2  │  id_3  │──┼──┐                                         │
//!   │   └─────────┴────────┘  │  │                                         │
//!   │                         ▼  ▼                                         │
//!   │   order:  [head] ◄──► [id_2] ◄──► [id_3] ◄──► [tail]                 │
//!   │            LRU end     victim      newest      MRU end               │
//!   │                                                                      │
//!   │   capacity: usize (>= 1)                                             │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Call                  | Events             | Effect                          |
//! |-----------------------|--------------------|---------------------------------|
//! | `get` absent          | `Miss`             | none                            |
//! | `get` present         | `Hit`, `Promote`   | relink before tail sentinel     |
//! | `put` present         | `Update`, `Promote`| replace value, relink           |
//! | `put` absent, room    | `Insert`           | link before tail sentinel       |
//! | `put` absent, full    | `Evict`, `Insert`  | free node after head, then link |
//!
//! All of these are O(1): the index hands out the node's slot and the
//! sentinels make every splice a fixed number of link updates.
//!
//! ## Example
//!
//! ```
//! use cachetrace::event::{Event, EventKind, Position};
//! use cachetrace::policy::lru::LruEngine;
//! use cachetrace::traits::CacheEngine;
//!
//! let mut lru = LruEngine::new(2).unwrap();
//! lru.put(1, "one");
//! lru.put(2, "two");
//! assert_eq!(lru.get(&1).0, Some("one"));
//!
//! let trace = lru.put(3, "three");
//! assert_eq!(trace.kinds(), vec![EventKind::Evict, EventKind::Insert]);
//! assert_eq!(trace.evicted(), Some(&2));
//! assert_eq!(trace.events()[1], Event::Insert { key: 3, at: Position::Mru });
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::builder::Policy;
use crate::ds::{Chain, LinkedSlots, SlotId};
use crate::error::{ConfigError, InvariantError, ensure_invariant};
use crate::event::{Event, Position, Promotion, Trace};
use crate::snapshot::LruSnapshot;
use crate::traits::CacheEngine;

/// Upper bound on up-front allocation; larger engines grow on demand.
pub(crate) const MAX_PREALLOC: usize = 4096;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Traced LRU cache.
///
/// See the module documentation for the event sequence of each call.
#[derive(Debug)]
pub struct LruEngine<K, V> {
    index: FxHashMap<K, SlotId>,
    slots: LinkedSlots<Entry<K, V>>,
    order: Chain,
    capacity: usize,
}

impl<K, V> LruEngine<K, V>
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
        let capacity = ConfigError::check_capacity(capacity)?;
        let prealloc = capacity.min(MAX_PREALLOC);
        let mut slots = LinkedSlots::with_capacity(prealloc + 2);
        let order = slots.open_chain();
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            slots,
            order,
            capacity,
        })
    }

    /// Resident keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<&K> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Iterates `(key, value)` from the LRU end to the MRU end.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots
            .iter(&self.order)
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Most recently touched key.
    pub fn most_recent(&self) -> Option<&K> {
        let id = self.slots.back(&self.order)?;
        self.slots.get(id).map(|entry| &entry.key)
    }

    /// Owned copy of the current state for renderers.
    pub fn snapshot(&self) -> LruSnapshot<K, V> {
        LruSnapshot {
            capacity: self.capacity,
            entries: self
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Verifies the index, the recency chain and the capacity bound agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.index.len() <= self.capacity,
            "len {} exceeds capacity {}",
            self.index.len(),
            self.capacity
        );
        ensure_invariant!(
            self.index.len() == self.slots.len(),
            "index holds {} keys but {} nodes are live",
            self.index.len(),
            self.slots.len()
        );
        ensure_invariant!(
            self.order.len() == self.slots.len(),
            "recency chain holds {} of {} nodes",
            self.order.len(),
            self.slots.len()
        );
        self.slots.check_chain(&self.order)?;
        for (id, entry) in self.slots.iter(&self.order) {
            ensure_invariant!(
                self.index.get(&entry.key) == Some(&id),
                "node {} is not indexed under its key",
                id.index()
            );
        }
        Ok(())
    }

    fn promote(&mut self, id: SlotId, key: &K, trace: &mut Trace<K, V>) {
        if self.slots.unlink(&mut self.order, id) {
            self.slots.link_back(&mut self.order, id);
        }
        trace.push(Event::Promote {
            key: key.clone(),
            promotion: Promotion::ToMru,
        });
    }

    fn evict_lru(&mut self, trace: &mut Trace<K, V>) {
        let Some(victim) = self.slots.front(&self.order) else {
            return;
        };
        if let Some(entry) = self.slots.remove(&mut self.order, victim) {
            self.index.remove(&entry.key);
            debug!(
                capacity = self.capacity,
                slot = victim.index(),
                "evicted least recently used entry"
            );
            trace.push(Event::Evict {
                key: entry.key,
                value: entry.value,
            });
        }
    }
}

impl<K, V> CacheEngine<K, V> for LruEngine<K, V>
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
        trace!(len = self.index.len(), slot = id.index(), "get hit");

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
            trace!(len = self.index.len(), slot = id.index(), "put update");
            return trace;
        }

        if self.index.len() >= self.capacity {
            self.evict_lru(&mut trace);
        }

        let id = self.slots.push_back(
            &mut self.order,
            Entry {
                key: key.clone(),
                value,
            },
        );
        self.index.insert(key.clone(), id);
        trace!(len = self.index.len(), slot = id.index(), "put insert");
        trace.push(Event::Insert {
            key,
            at: Position::Mru,
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
        let id = self.slots.front(&self.order)?;
        self.slots.get(id).map(|entry| &entry.key)
    }

    fn clear(&mut self) {
        debug!(len = self.index.len(), "clearing lru engine");
        self.index.clear();
        self.slots.clear();
        self.order = self.slots.open_chain();
    }

    fn policy(&self) -> Policy {
        Policy::Lru
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn engine(capacity: usize) -> LruEngine<u32, u32> {
        LruEngine::new(capacity).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn zero_capacity_is_rejected() {
            let err = LruEngine::<u32, u32>::new(0).unwrap_err();
            assert_eq!(err, ConfigError::InvalidCapacity { capacity: 0 });
        }

        #[test]
        fn huge_capacity_does_not_preallocate() {
            let mut lru = engine(usize::MAX);
            assert_eq!(lru.capacity(), usize::MAX);
            lru.put(1, 1);
            assert_eq!(lru.len(), 1);
        }

        #[test]
        fn new_engine_is_empty() {
            let lru = engine(3);
            assert!(lru.is_empty());
            assert_eq!(lru.victim(), None);
            assert_eq!(lru.most_recent(), None);
            lru.check_invariants().unwrap();
        }
    }

    mod traces {
        use super::*;

        #[test]
        fn miss_emits_single_event_and_changes_nothing() {
            let mut lru = engine(2);
            lru.put(1, 10);
            lru.put(2, 20);
            let before = lru.snapshot();

            let (value, trace) = lru.get(&9);
            assert_eq!(value, None);
            assert_eq!(trace.events(), &[Event::Miss { key: 9 }]);
            assert_eq!(lru.snapshot(), before);
        }

        #[test]
        fn hit_emits_hit_then_promote() {
            let mut lru = engine(2);
            lru.put(1, 10);
            let (value, trace) = lru.get(&1);
            assert_eq!(value, Some(10));
            assert_eq!(
                trace.events(),
                &[
                    Event::Hit { key: 1 },
                    Event::Promote {
                        key: 1,
                        promotion: Promotion::ToMru
                    },
                ]
            );
        }

        #[test]
        fn update_emits_update_then_promote() {
            let mut lru = engine(2);
            lru.put(1, 10);
            let trace = lru.put(1, 11);
            assert_eq!(
                trace.events(),
                &[
                    Event::Update {
                        key: 1,
                        old: 10,
                        new: 11
                    },
                    Event::Promote {
                        key: 1,
                        promotion: Promotion::ToMru
                    },
                ]
            );
            assert_eq!(lru.peek(&1), Some(&11));
            assert_eq!(lru.len(), 1);
        }

        #[test]
        fn full_insert_evicts_before_inserting() {
            let mut lru = engine(1);
            lru.put(1, 10);
            let trace = lru.put(2, 20);
            assert_eq!(
                trace.events(),
                &[
                    Event::Evict { key: 1, value: 10 },
                    Event::Insert {
                        key: 2,
                        at: Position::Mru
                    },
                ]
            );
        }

        #[test]
        fn update_at_capacity_never_evicts() {
            let mut lru = engine(2);
            lru.put(1, 10);
            lru.put(2, 20);
            let trace = lru.put(1, 12);
            assert!(!trace.contains_kind(EventKind::Evict));
            assert_eq!(lru.len(), 2);
        }
    }

    mod recency {
        use super::*;

        #[test]
        fn order_runs_from_lru_to_mru() {
            let mut lru = engine(3);
            lru.put(1, 1);
            lru.put(2, 2);
            lru.put(3, 3);
            assert_eq!(lru.keys_by_recency(), vec![&1, &2, &3]);

            lru.get(&1);
            assert_eq!(lru.keys_by_recency(), vec![&2, &3, &1]);
            assert_eq!(lru.victim(), Some(&2));
            assert_eq!(lru.most_recent(), Some(&1));

            lru.put(2, 22);
            assert_eq!(lru.keys_by_recency(), vec![&3, &1, &2]);
            lru.check_invariants().unwrap();
        }

        #[test]
        fn peek_does_not_touch() {
            let mut lru = engine(2);
            lru.put(1, 1);
            lru.put(2, 2);
            assert_eq!(lru.peek(&1), Some(&1));
            assert!(lru.contains(&1));

            let trace = lru.put(3, 3);
            assert_eq!(trace.evicted(), Some(&1));
        }

        #[test]
        fn promoting_mru_keeps_order() {
            let mut lru = engine(3);
            lru.put(1, 1);
            lru.put(2, 2);
            lru.get(&2);
            lru.get(&2);
            assert_eq!(lru.keys_by_recency(), vec![&1, &2]);
            lru.check_invariants().unwrap();
        }

        #[test]
        fn capacity_two_scenario() {
            let mut lru = engine(2);
            lru.put(1, 1);
            lru.put(2, 2);
            assert_eq!(lru.get(&1).0, Some(1));
            let trace = lru.put(3, 3);
            assert_eq!(trace.evicted(), Some(&2));
            assert_eq!(lru.get(&2).0, None);
            assert_eq!(lru.get(&3).0, Some(3));
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn clear_resets_state_and_engine_stays_usable() {
            let mut lru = engine(2);
            lru.put(1, 1);
            lru.put(2, 2);
            lru.clear();
            assert!(lru.is_empty());
            assert_eq!(lru.victim(), None);
            lru.check_invariants().unwrap();

            lru.put(3, 3);
            lru.put(4, 4);
            let trace = lru.put(5, 5);
            assert_eq!(trace.evicted(), Some(&3));
            lru.check_invariants().unwrap();
        }

        #[test]
        fn slots_are_recycled_after_eviction() {
            let mut lru = engine(2);
            for i in 0..100 {
                lru.put(i, i);
            }
            assert_eq!(lru.len(), 2);
            assert_eq!(lru.keys_by_recency(), vec![&98, &99]);
            lru.check_invariants().unwrap();
        }

        #[test]
        fn snapshot_clones_in_order() {
            let mut lru: LruEngine<&str, String> = LruEngine::new(3).unwrap();
            lru.put("a", "alpha".to_string());
            lru.put("b", "beta".to_string());
            lru.get(&"a");
            let snap = lru.snapshot();
            assert_eq!(snap.capacity, 3);
            assert_eq!(
                snap.entries,
                vec![("b", "beta".to_string()), ("a", "alpha".to_string())]
            );
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        #[derive(Debug, Clone)]
        enum Op {
            Get(u8),
            Put(u8, u16),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..12).prop_map(Op::Get),
                (0u8..12, any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
            ]
        }

        // Naive O(n) reference: front = LRU, back = MRU.
        fn touch(model: &mut VecDeque<(u8, u16)>, key: u8) -> Option<u16> {
            let pos = model.iter().position(|(k, _)| *k == key)?;
            let entry = model.remove(pos)?;
            model.push_back(entry);
            Some(entry.1)
        }

        proptest! {
            #[test]
            fn matches_reference_model(
                capacity in 1usize..6,
                ops in prop::collection::vec(op(), 0..200),
            ) {
                let mut lru: LruEngine<u8, u16> = LruEngine::new(capacity).unwrap();
                let mut model: VecDeque<(u8, u16)> = VecDeque::new();

                for op in ops {
                    match op {
                        Op::Get(key) => {
                            let expected = touch(&mut model, key);
                            let (value, trace) = lru.get(&key);
                            prop_assert_eq!(value, expected);
                            let kinds = if expected.is_some() {
                                vec![EventKind::Hit, EventKind::Promote]
                            } else {
                                vec![EventKind::Miss]
                            };
                            prop_assert_eq!(trace.kinds(), kinds);
                        }
                        Op::Put(key, value) => {
                            let expected_victim = if touch(&mut model, key).is_some() {
                                if let Some(last) = model.back_mut() {
                                    last.1 = value;
                                }
                                None
                            } else {
                                let victim = if model.len() == capacity {
                                    model.pop_front().map(|(k, _)| k)
                                } else {
                                    None
                                };
                                model.push_back((key, value));
                                victim
                            };
                            let trace = lru.put(key, value);
                            prop_assert_eq!(trace.evicted().copied(), expected_victim);
                        }
                    }

                    prop_assert!(lru.len() <= capacity);
                    let keys: Vec<u8> = lru.keys_by_recency().into_iter().copied().collect();
                    let expected: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
                    prop_assert_eq!(keys, expected);
                    prop_assert!(lru.check_invariants().is_ok());
                }
            }

            #[test]
            fn read_after_write(
                capacity in 1usize..8,
                key in any::<u8>(),
                value in any::<u16>(),
                prefill in prop::collection::vec(any::<u8>(), 0..16),
            ) {
                let mut lru: LruEngine<u8, u16> = LruEngine::new(capacity).unwrap();
                for k in prefill {
                    lru.put(k, u16::from(k));
                }
                lru.put(key, value);
                prop_assert_eq!(lru.get(&key).0, Some(value));
            }
        }
    }
}
