//! # Engine contract
//!
//! Both eviction engines share one external contract: a fixed positive
//! capacity, a `get` that reports hit or miss, and a `put` that updates,
//! inserts or evicts. Every mutating call returns the [`Trace`] of what
//! happened so a caller can render or assert on it without inspecting engine
//! internals.
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!                 │            CacheEngine<K, V>             │
//!                 │                                          │
//!                 │  get(&mut, &K) → (Option<V>, Trace)      │
//!                 │  put(&mut, K, V) → Trace                 │
//!                 │  peek / contains / victim  (no trace)    │
//!                 │  len / capacity / clear                  │
//!                 └────────────────────┬─────────────────────┘
//!                                      │
//!            ┌─────────────────────────┼─────────────────────────┐
//!            ▼                         ▼                         ▼
//!   ┌─────────────────┐      ┌─────────────────┐      ┌─────────────────┐
//!   │ LruEngine<K, V> │      │ LfuEngine<K, V> │      │  Engine<K, V>   │
//!   │ recency chain   │      │ freq buckets    │      │ policy dispatch │
//!   └─────────────────┘      └─────────────────┘      └─────────────────┘
//! ```
//!
//! ## Calling discipline
//!
//! Engines are synchronous and hold no locks. Calls must not overlap on one
//! instance; a host that needs shared access wraps the engine in its own
//! mutex.

use crate::builder::Policy;
use crate::event::Trace;

/// Traced cache with O(1) `get` and `put`.
///
/// # Example
///
/// ```
/// use cachetrace::event::EventKind;
/// use cachetrace::policy::lru::LruEngine;
/// use cachetrace::traits::CacheEngine;
///
/// fn touch_all<E: CacheEngine<u32, u32>>(engine: &mut E, keys: &[u32]) -> usize {
///     keys.iter()
///         .filter(|key| engine.get(key).0.is_some())
///         .count()
/// }
///
/// let mut engine = LruEngine::new(2).unwrap();
/// engine.put(1, 10);
/// assert_eq!(touch_all(&mut engine, &[1, 2]), 1);
///
/// let trace = engine.put(2, 20);
/// assert_eq!(trace.kinds(), vec![EventKind::Insert]);
/// ```
pub trait CacheEngine<K, V> {
    /// Looks up `key`, touching it on a hit.
    ///
    /// A miss emits a single `Miss` event and changes nothing.
    fn get(&mut self, key: &K) -> (Option<V>, Trace<K, V>);

    /// Stores `value` under `key`, evicting first if a new key finds the
    /// engine full.
    fn put(&mut self, key: K, value: V) -> Trace<K, V>;

    /// Reads the value for `key` without touching it or producing a trace.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is resident. Does not touch it.
    fn contains(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries. Always at least 1.
    fn capacity(&self) -> usize;

    /// Key the next at-capacity insertion would evict.
    fn victim(&self) -> Option<&K>;

    /// Drops every entry. Produces no trace.
    fn clear(&mut self);

    /// Eviction policy implemented by this engine.
    fn policy(&self) -> Policy;
}
