//! Unified engine builder.
//!
//! Picks an eviction policy at runtime and hides which engine sits behind it,
//! the way a visualizer switches between its LRU and LFU panels.
//!
//! ## Example
//!
//! ```rust
//! use cachetrace::builder::{EngineBuilder, Policy};
//! use cachetrace::traits::CacheEngine;
//!
//! let mut engine = EngineBuilder::new(2).build::<u32, String>(Policy::Lfu).unwrap();
//! engine.put(1, "one".to_string());
//! assert_eq!(engine.get(&1).0, Some("one".to_string()));
//! assert_eq!(engine.policy(), Policy::Lfu);
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use tracing::debug;

use crate::error::ConfigError;
use crate::event::Trace;
use crate::policy::lfu::{DEFAULT_BUCKET_HINT, LfuEngine};
use crate::policy::lru::LruEngine;
use crate::snapshot::Snapshot;
use crate::traits::CacheEngine;

/// Capacity used by [`EngineBuilder::default`].
pub const DEFAULT_CAPACITY: usize = 3;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction, least recently used among ties.
    Lfu,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru => f.write_str("lru"),
            Policy::Lfu => f.write_str("lfu"),
        }
    }
}

/// Error for policy names other than `lru`/`lfu`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown eviction policy `{}` (expected lru or lfu)", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lru") {
            Ok(Policy::Lru)
        } else if s.eq_ignore_ascii_case("lfu") {
            Ok(Policy::Lfu)
        } else {
            Err(UnknownPolicy(s.to_string()))
        }
    }
}

/// Builder for [`Engine`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineBuilder {
    capacity: usize,
    bucket_hint: usize,
}

impl EngineBuilder {
    /// Starts a builder; capacity is validated at build time.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bucket_hint: DEFAULT_BUCKET_HINT,
        }
    }

    /// Expected number of distinct frequencies (LFU only).
    pub fn bucket_hint(mut self, hint: usize) -> Self {
        self.bucket_hint = hint;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds an engine for `policy`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidCapacity`] when the capacity is 0.
    pub fn build<K, V>(&self, policy: Policy) -> Result<Engine<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match policy {
            Policy::Lru => EngineInner::Lru(LruEngine::new(self.capacity)?),
            Policy::Lfu => {
                EngineInner::Lfu(LfuEngine::with_bucket_hint(self.capacity, self.bucket_hint)?)
            },
        };
        debug!(%policy, capacity = self.capacity, "built engine");
        Ok(Engine { inner })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Engine wrapper with a consistent API regardless of policy.
#[derive(Debug)]
pub struct Engine<K, V> {
    inner: EngineInner<K, V>,
}

#[derive(Debug)]
enum EngineInner<K, V> {
    Lru(LruEngine<K, V>),
    Lfu(LfuEngine<K, V>),
}

impl<K, V> Engine<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        match &self.inner {
            EngineInner::Lru(lru) => Snapshot::Lru(lru.snapshot()),
            EngineInner::Lfu(lfu) => Snapshot::Lfu(lfu.snapshot()),
        }
    }

    pub fn as_lru(&self) -> Option<&LruEngine<K, V>> {
        match &self.inner {
            EngineInner::Lru(lru) => Some(lru),
            EngineInner::Lfu(_) => None,
        }
    }

    pub fn as_lfu(&self) -> Option<&LfuEngine<K, V>> {
        match &self.inner {
            EngineInner::Lfu(lfu) => Some(lfu),
            EngineInner::Lru(_) => None,
        }
    }

    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        match &self.inner {
            EngineInner::Lru(lru) => lru.check_invariants(),
            EngineInner::Lfu(lfu) => lfu.check_invariants(),
        }
    }
}

impl<K, V> From<LruEngine<K, V>> for Engine<K, V> {
    fn from(engine: LruEngine<K, V>) -> Self {
        Engine {
            inner: EngineInner::Lru(engine),
        }
    }
}

impl<K, V> From<LfuEngine<K, V>> for Engine<K, V> {
    fn from(engine: LfuEngine<K, V>) -> Self {
        Engine {
            inner: EngineInner::Lfu(engine),
        }
    }
}

impl<K, V> CacheEngine<K, V> for Engine<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> (Option<V>, Trace<K, V>) {
        match &mut self.inner {
            EngineInner::Lru(lru) => lru.get(key),
            EngineInner::Lfu(lfu) => lfu.get(key),
        }
    }

    fn put(&mut self, key: K, value: V) -> Trace<K, V> {
        match &mut self.inner {
            EngineInner::Lru(lru) => lru.put(key, value),
            EngineInner::Lfu(lfu) => lfu.put(key, value),
        }
    }

    fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            EngineInner::Lru(lru) => lru.peek(key),
            EngineInner::Lfu(lfu) => lfu.peek(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            EngineInner::Lru(lru) => lru.contains(key),
            EngineInner::Lfu(lfu) => lfu.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            EngineInner::Lru(lru) => lru.len(),
            EngineInner::Lfu(lfu) => lfu.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            EngineInner::Lru(lru) => lru.capacity(),
            EngineInner::Lfu(lfu) => lfu.capacity(),
        }
    }

    fn victim(&self) -> Option<&K> {
        match &self.inner {
            EngineInner::Lru(lru) => lru.victim(),
            EngineInner::Lfu(lfu) => lfu.victim(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            EngineInner::Lru(lru) => lru.clear(),
            EngineInner::Lfu(lfu) => lfu.clear(),
        }
    }

    fn policy(&self) -> Policy {
        match &self.inner {
            EngineInner::Lru(_) => Policy::Lru,
            EngineInner::Lfu(_) => Policy::Lfu,
        }
    }
}
