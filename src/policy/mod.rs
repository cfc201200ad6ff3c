//! Eviction engines.
//!
//! | Engine | Evicts | Tie-break |
//! |--------|--------|-----------|
//! | [`lru::LruEngine`] | least recently used | none needed |
//! | [`lfu::LfuEngine`] | lowest access count | least recently touched |

pub mod lfu;
pub mod lru;
