#![no_main]

use cachetrace::builder::{EngineBuilder, Policy};
use cachetrace::event::EventKind;
use cachetrace::traits::CacheEngine;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary get/put/clear sequences on both engines
//
// Byte 0 picks the policy and capacity, then each pair of bytes is one op.
// After every op the engine must pass its own invariant check and the trace
// must have the shape its call implies.
fuzz_target!(|data: &[u8]| {
    let Some((&header, rest)) = data.split_first() else {
        return;
    };
    let policy = if header & 1 == 0 { Policy::Lru } else { Policy::Lfu };
    let capacity = usize::from(header >> 1) % 8 + 1;
    let mut engine = match EngineBuilder::new(capacity).build::<u8, u8>(policy) {
        Ok(engine) => engine,
        Err(_) => return,
    };

    for pair in rest.chunks_exact(2) {
        let (op, key) = (pair[0] % 8, pair[1] % 16);
        match op {
            0..=3 => {
                // get
                let present = engine.contains(&key);
                let (value, trace) = engine.get(&key);
                assert_eq!(value.is_some(), present);
                assert_eq!(trace.len(), if present { 2 } else { 1 });
            }
            4..=6 => {
                // put
                let present = engine.contains(&key);
                let full = engine.len() == capacity;
                let trace = engine.put(key, pair[0]);
                assert_eq!(trace.contains_kind(EventKind::Evict), !present && full);
                assert_eq!(engine.peek(&key), Some(&pair[0]));
            }
            7 => {
                engine.clear();
                assert!(engine.is_empty());
            }
            _ => unreachable!(),
        }

        assert!(engine.len() <= capacity);
        if let Err(err) = engine.check_invariants() {
            panic!("{policy} invariant broken: {err}");
        }
    }
});
