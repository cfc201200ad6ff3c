//! cachetrace: LRU and LFU eviction engines that report every step they take.
//!
//! Each `get`/`put` returns a [`Trace`](event::Trace), an ordered list of
//! hit, miss, insert, update, promote and evict events, so a caller can
//! replay or render exactly what the engine did.
//!
//! ```
//! use cachetrace::prelude::*;
//!
//! let mut lru = LruEngine::new(2).unwrap();
//! lru.put("a", 1);
//! lru.put("b", 2);
//! lru.get(&"a");
//!
//! let trace = lru.put("c", 3);
//! assert_eq!(trace.to_string(), "evict b (2); insert c at mru");
//! assert_eq!(lru.snapshot().to_string(), "LRU [a c] MRU");
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod event;
pub mod policy;
pub mod prelude;
pub mod sim;
pub mod snapshot;
pub mod stats;
pub mod traits;
