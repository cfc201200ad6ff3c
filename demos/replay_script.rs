//! Replays a GET/PUT script against both engines side by side.
//!
//! Run with: cargo run --example replay_script [path/to/script]
//!
//! Without a path a built-in script is used. Set `RUST_LOG=cachetrace=debug`
//! to see per-step logging.

use std::error::Error;

use cachetrace::builder::{EngineBuilder, Policy};
use cachetrace::sim::{Simulator, parse_script};
use tracing_subscriber::EnvFilter;

const BUILTIN: &str = "\
# capacity 2 walkthrough
PUT 1 1
PUT 2 2
GET 1
PUT 3 3
GET 2
PUT 4 4
GET 1
GET 3
GET 4
";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let script = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => BUILTIN.to_string(),
    };
    let ops = parse_script::<u32, u32>(&script)?;

    for policy in [Policy::Lru, Policy::Lfu] {
        println!("== {policy} ==");
        let mut sim = Simulator::new(EngineBuilder::new(2).build::<u32, u32>(policy)?);
        for step in sim.run(ops.clone()) {
            let result = step.result.map(|v| format!("=> {v}")).unwrap_or_default();
            println!("{:<10} {:<36} {result}", step.op.to_string(), step.trace.to_string());
        }
        let stats = sim.stats();
        println!(
            "hits {} misses {} evictions {} hit ratio {:.2}",
            stats.hits,
            stats.misses,
            stats.evictions,
            stats.hit_ratio()
        );
        println!("final: {}\n", sim.engine().snapshot());
    }
    Ok(())
}

