//! Walks an LRU engine through the classic capacity-2 sequence and prints
//! each trace next to the resulting recency order.
//!
//! Run with: RUST_LOG=cachetrace=debug cargo run --example basic_lru

use cachetrace::policy::lru::LruEngine;
use cachetrace::traits::CacheEngine;
use tracing_subscriber::EnvFilter;

fn show(call: String, trace: String, lru: &LruEngine<u32, u32>) {
    println!("{call:<12} {trace:<40} {}", lru.snapshot());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut lru: LruEngine<u32, u32> = LruEngine::new(2).expect("capacity is non-zero");

    println!("{:<12} {:<40} state", "call", "trace");

    let trace = lru.put(1, 1);
    show("put(1, 1)".into(), trace.to_string(), &lru);
    let trace = lru.put(2, 2);
    show("put(2, 2)".into(), trace.to_string(), &lru);
    let (value, trace) = lru.get(&1);
    show(format!("get(1)={value:?}"), trace.to_string(), &lru);
    let trace = lru.put(3, 3);
    show("put(3, 3)".into(), trace.to_string(), &lru);
    let (value, trace) = lru.get(&2);
    show(format!("get(2)={value:?}"), trace.to_string(), &lru);
}

// Expected output:
// call         trace                                    state
// put(1, 1)    insert 1 at mru                          LRU [1] MRU
// put(2, 2)    insert 2 at mru                          LRU [1 2] MRU
// get(1)=Some(1) hit 1; promote 1 to mru                LRU [2 1] MRU
// put(3, 3)    evict 2 (2); insert 3 at mru             LRU [1 3] MRU
// get(2)=None  miss 2                                   LRU [1 3] MRU
