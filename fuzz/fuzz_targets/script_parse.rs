#![no_main]

use cachetrace::sim::{Op, parse_script};
use libfuzzer_sys::fuzz_target;

// Fuzz the GET/PUT script parser with arbitrary text
//
// Parsing must never panic, and every parsed op must print back to a line
// that parses to the same op.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(ops) = parse_script::<u16, i32>(text) else {
        return;
    };
    for op in ops {
        let line = op.to_string();
        assert_eq!(line.parse::<Op<u16, i32>>().ok(), Some(op));
    }
});
