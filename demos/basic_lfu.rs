//! Shows LFU frequency buckets filling up and the lowest bucket giving up
//! its oldest entry.
//!
//! Run with: RUST_LOG=cachetrace=debug cargo run --example basic_lfu

use cachetrace::policy::lfu::LfuEngine;
use cachetrace::traits::CacheEngine;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut lfu: LfuEngine<&str, String> = LfuEngine::new(2).expect("capacity is non-zero");

    for trace in [lfu.put("a", "alpha".to_string()), lfu.put("b", "beta".to_string())] {
        println!("{trace}");
    }

    let (value, trace) = lfu.get(&"a");
    println!("{trace} -> {value:?}");
    println!("buckets: {}", lfu.snapshot());

    let trace = lfu.put("c", "gamma".to_string());
    println!("{trace}");
    println!("buckets: {}", lfu.snapshot());
    println!("min frequency: {:?}", lfu.min_frequency());
}

// Expected output:
// insert a at freq 1
// insert b at freq 1
// hit a; promote a freq 1 -> 2 -> Some("alpha")
// buckets: f1 [b] | f2 [a]
// evict b (beta); insert c at freq 1
// buckets: f1 [c] | f2 [a]
// min frequency: Some(1)
//
// "a" was read before "c" arrived, so "b" had the lowest count.
