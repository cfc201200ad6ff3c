//! Key streams for engine benchmarks.

use cachetrace::stats::TraceStats;
use cachetrace::traits::CacheEngine;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// `hot_prob` of accesses land in the first `hot_fraction` of the universe.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan that wraps at `universe`.
    Scan,
    /// YCSB-style skew; `theta` near 1.0 is heavily skewed.
    Zipfian { theta: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
    zipfian: Option<Zipfian>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(2);
        let zipfian = match workload {
            Workload::Zipfian { theta } => Some(Zipfian::new(universe, theta)),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
            zipfian,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.gen_range(0..self.universe),
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot = ((self.universe as f64) * hot_fraction.clamp(0.0, 1.0)).round() as u64;
                let hot = hot.clamp(1, self.universe - 1);
                if self.rng.gen_bool(hot_prob.clamp(0.0, 1.0)) {
                    self.rng.gen_range(0..hot)
                } else {
                    self.rng.gen_range(hot..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            Workload::Zipfian { .. } => match &self.zipfian {
                Some(zipf) => zipf.sample(self.rng.r#gen::<f64>()),
                None => 0,
            },
        }
    }
}

/// Replays `operations` keys as get-then-put-on-miss and folds every trace.
pub fn run_read_through<E>(
    engine: &mut E,
    generator: &mut WorkloadGenerator,
    operations: usize,
) -> TraceStats
where
    E: CacheEngine<u64, u64>,
{
    let mut stats = TraceStats::new();
    for _ in 0..operations {
        let key = generator.next_key();
        let (value, trace) = engine.get(&key);
        stats.record(&trace);
        if value.is_none() {
            stats.record(&engine.put(key, key));
        }
    }
    stats
}

/// Inverse-CDF Zipfian sampler (Gray et al., as used by YCSB).
#[derive(Debug, Clone)]
struct Zipfian {
    n: u64,
    theta: f64,
    zeta_n: f64,
    alpha: f64,
    eta: f64,
}

impl Zipfian {
    fn new(n: u64, theta: f64) -> Self {
        let theta = theta.clamp(0.0, 0.9999);
        let zeta_2 = Self::zeta(2, theta);
        let zeta_n = Self::zeta(n, theta);
        Self {
            n,
            theta,
            zeta_n,
            alpha: 1.0 / (1.0 - theta),
            eta: (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta_2 / zeta_n),
        }
    }

    fn zeta(n: u64, theta: f64) -> f64 {
        (1..=n).map(|i| 1.0 / (i as f64).powf(theta)).sum()
    }

    fn sample(&self, u: f64) -> u64 {
        let uz = u * self.zeta_n;
        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5_f64.powf(self.theta) {
            return 1;
        }
        let spread = (self.n as f64) * (self.eta * u - self.eta + 1.0).powf(self.alpha);
        (spread as u64).min(self.n - 1)
    }
}
